//! Error types for the entry crate.

use thiserror::Error;

/// Result type for entry operations.
pub type EntryResult<T> = Result<T, EntryError>;

/// Errors that can occur while building, encoding or decoding entries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// The string is not a usable entry id.
    #[error("invalid entry id {id:?}: {reason}")]
    InvalidId {
        /// The rejected id.
        id: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A timestamp could not be parsed.
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),

    /// Failed to encode a record.
    #[error("encoding failed: {message}")]
    Encode {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a record.
    #[error("decoding failed: {message}")]
    Decode {
        /// Description of the decoding error.
        message: String,
    },
}

impl EntryError {
    /// Create an encoding error.
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Create a decoding error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}
