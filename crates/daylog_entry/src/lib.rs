//! # Daylog Entry
//!
//! Journal entry model and JSON record codec for Daylog.
//!
//! This crate provides:
//! - [`EntryId`] - date-derived, path-safe entry keys
//! - [`Entry`] - a dated text note with creation and update timestamps
//! - [`EntrySet`] - the ordered id → entry mapping every store holds
//! - [`codec`] - the JSON record encoding shared by disk and wire
//!
//! This is a pure data crate with no I/O operations.
//!
//! ## Example
//!
//! ```rust
//! use daylog_entry::{codec, Entry, EntryId, Timestamp};
//!
//! let now: Timestamp = "2024-01-01T10:00:00".parse().unwrap();
//! let id = EntryId::for_date(now.date());
//! let entry = Entry::new_at(now);
//!
//! let bytes = codec::encode_entry(&entry).unwrap();
//! assert_eq!(codec::decode_entry(&bytes).unwrap(), entry);
//! assert_eq!(id.as_str(), "2024-01-01");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
mod entry;
mod error;
mod id;
mod timestamp;

pub use codec::{DecodedSet, SkippedRecord};
pub use entry::{Entry, EntrySet};
pub use error::{EntryError, EntryResult};
pub use id::{EntryId, MAX_ID_LEN};
pub use timestamp::Timestamp;

/// Calendar date type used to derive entry ids.
pub use chrono::NaiveDate;
