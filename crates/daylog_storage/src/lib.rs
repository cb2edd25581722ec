//! # Daylog Storage
//!
//! Entry store trait and implementations for Daylog.
//!
//! This crate provides the local mirror of a journal: durable, per-entry
//! persistence keyed by [`EntryId`](daylog_entry::EntryId). Stores are pure
//! read/write; they contain no merge logic.
//!
//! ## Design Principles
//!
//! - One record per entry, addressed by its id
//! - Whole-record overwrite: a record is either fully replaced or untouched
//! - A malformed record is skipped during a bulk read, never fatal
//! - Must be `Send + Sync` so the sync engine can share it with its worker
//!
//! ## Available Stores
//!
//! - [`InMemoryEntryStore`] - For testing, with failure injection
//! - [`FileEntryStore`] - One indented JSON file per entry
//!
//! ## Example
//!
//! ```rust
//! use daylog_entry::{Entry, EntryId};
//! use daylog_storage::{EntryStore, InMemoryEntryStore};
//!
//! let store = InMemoryEntryStore::new();
//! let id = EntryId::parse("2024-01-01").unwrap();
//! store.write(&id, &Entry::default()).unwrap();
//! assert_eq!(store.read_all().unwrap().entries.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod store;

pub use error::{StorageError, StorageResult};
pub use file::{FileEntryStore, RECORD_EXTENSION};
pub use memory::InMemoryEntryStore;
pub use store::{EntryStore, StoreLoad};
