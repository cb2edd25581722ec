//! # Daylog Sync Engine
//!
//! Sync engine and journal lifecycle API for Daylog.
//!
//! This crate provides:
//! - Remote client abstraction with an explicit `Unavailable` outcome
//! - Blocking HTTP remote client with per-request timeouts
//! - Last-write-wins merge of local and remote entries
//! - Sync engine owning the in-memory entry set and its lock
//! - Cancellable background reconciliation worker
//! - Journal lifecycle API (create, view, edit, delete)
//!
//! ## Architecture
//!
//! Every mutation goes through the [`SyncEngine`]:
//! 1. Take the sync lock and mutate the in-memory entry set
//! 2. Write the affected record to the local [`EntryStore`](daylog_storage::EntryStore)
//! 3. Release the lock, then propagate to the remote (best-effort)
//!
//! Independently, the background worker periodically pulls the full remote
//! entry set, merges it under the same lock, and rewrites the local mirror.
//!
//! ## Key Invariants
//!
//! - The entry set is only mutated while holding the sync lock
//! - Local durability never depends on the remote
//! - Remote failures are never surfaced to the caller as errors
//! - Reconciliation only inserts or replaces entries, it never removes them
//! - On equal timestamps the local copy wins

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod http;
mod journal;
mod merge;
mod remote;
mod worker;

pub use config::{SyncConfig, DEFAULT_SERVER_URL, DEFAULT_SYNC_INTERVAL, DEFAULT_TIMEOUT};
pub use engine::{LoadSource, ReconcileOutcome, SyncEngine, SyncStats};
pub use error::{SyncError, SyncResult};
pub use http::HttpRemote;
pub use journal::Journal;
pub use merge::{merge_entry, merge_into, MergeDecision, ReconcileReport};
pub use remote::{MockRemote, RemoteClient, RemoteResult, RemoteSnapshot, Unavailable};
pub use worker::SyncWorker;
