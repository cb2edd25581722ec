//! Error types for the sync engine.

use daylog_entry::{EntryError, EntryId};
use daylog_storage::StorageError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can be reported to callers of the sync engine.
///
/// Remote failures never appear here: they are recovered locally and
/// retried on the next reconciliation cycle. See
/// [`Unavailable`](crate::Unavailable).
#[derive(Error, Debug)]
pub enum SyncError {
    /// The local mirror could not be read or written.
    ///
    /// The in-memory entry set may already reflect the change.
    #[error("local storage failure: {0}")]
    Storage(#[from] StorageError),

    /// No entry with this id exists.
    #[error("entry not found: {0}")]
    NotFound(EntryId),

    /// Invalid entry data.
    #[error(transparent)]
    Entry(#[from] EntryError),

    /// The HTTP client could not be constructed.
    #[error("http client setup failed: {0}")]
    Client(String),

    /// The background worker thread could not be started.
    #[error("failed to start sync worker: {0}")]
    Worker(#[source] std::io::Error),
}

impl SyncError {
    /// Returns true if this error came from the local store.
    pub fn is_local_storage(&self) -> bool {
        matches!(self, SyncError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_are_classified() {
        let err: SyncError = StorageError::Unavailable("disk full".into()).into();
        assert!(err.is_local_storage());
        assert!(err.to_string().contains("disk full"));

        let err = SyncError::NotFound(EntryId::parse("2024-01-01").unwrap());
        assert!(!err.is_local_storage());
        assert_eq!(err.to_string(), "entry not found: 2024-01-01");
    }
}
