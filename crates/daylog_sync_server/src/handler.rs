//! Request handlers for the entries endpoints.
//!
//! These are plain synchronous functions over an [`EntryStore`] so they can
//! be exercised without an HTTP stack. The routes in [`crate::router`] are
//! thin adapters on top.

use crate::error::{ServerError, ServerResult};
use daylog_entry::{codec, Entry, EntryId, EntrySet};
use daylog_storage::EntryStore;
use std::fmt;
use std::sync::Arc;

/// The remote entries service.
///
/// Holds no state besides the store. Every request goes straight to disk,
/// so several servers may share one data directory read-only.
pub struct SyncServer {
    store: Arc<dyn EntryStore>,
}

impl SyncServer {
    /// Creates a server over the given store.
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn EntryStore> {
        &self.store
    }

    /// Returns every readable entry.
    pub fn handle_list(&self) -> ServerResult<EntrySet> {
        let load = self.store.read_all()?;
        if load.skipped > 0 {
            tracing::warn!(skipped = load.skipped, "listing skipped malformed records");
        }
        Ok(load.entries)
    }

    /// Returns a single entry.
    pub fn handle_get(&self, id: &str) -> ServerResult<Entry> {
        let id = parse_id(id)?;
        self.store
            .read(&id)?
            .ok_or_else(|| ServerError::NotFound(id.to_string()))
    }

    /// Replaces the record for `id` with the entry in `body`.
    ///
    /// No merge happens here: the last writer wins.
    pub fn handle_put(&self, id: &str, body: &[u8]) -> ServerResult<()> {
        let id = parse_id(id)?;
        let entry = codec::decode_entry(body)
            .map_err(|e| ServerError::InvalidRequest(e.to_string()))?;
        self.store.write(&id, &entry)?;
        tracing::debug!(%id, "stored entry");
        Ok(())
    }

    /// Removes the record for `id`, readable or not.
    pub fn handle_delete(&self, id: &str) -> ServerResult<()> {
        let id = parse_id(id)?;
        if !self.store.delete(&id)? {
            return Err(ServerError::NotFound(id.to_string()));
        }
        tracing::debug!(%id, "deleted entry");
        Ok(())
    }
}

impl fmt::Debug for SyncServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncServer").finish_non_exhaustive()
    }
}

fn parse_id(raw: &str) -> ServerResult<EntryId> {
    EntryId::parse(raw).map_err(|e| ServerError::InvalidRequest(e.to_string()))
}
