//! Journal lifecycle API.

use crate::engine::{LoadSource, SyncEngine};
use crate::error::{SyncError, SyncResult};
use crate::remote::RemoteClient;
use daylog_entry::{Entry, EntryId, Timestamp};
use daylog_storage::EntryStore;
use std::sync::Arc;

/// Caller-facing operations on a journal.
///
/// A thin layer over [`SyncEngine`]: it generates ids and timestamps and
/// routes every mutation through the engine. It holds no state of its own.
///
/// # Example
///
/// ```
/// use daylog_entry::Timestamp;
/// use daylog_storage::InMemoryEntryStore;
/// use daylog_sync_engine::{Journal, MockRemote, SyncConfig, SyncEngine};
/// use std::sync::Arc;
///
/// let engine = SyncEngine::new(SyncConfig::default(), MockRemote::new(), InMemoryEntryStore::new());
/// let journal = Journal::new(Arc::new(engine));
///
/// let now: Timestamp = "2024-01-01T08:00:00".parse().unwrap();
/// let id = journal.create_at(now).unwrap();
/// journal.edit(&id, "Slept well.").unwrap();
/// assert_eq!(journal.view(&id).unwrap(), "Slept well.");
/// ```
pub struct Journal<R: RemoteClient, S: EntryStore> {
    engine: Arc<SyncEngine<R, S>>,
}

impl<R: RemoteClient, S: EntryStore> Journal<R, S> {
    /// Creates a journal over a shared engine.
    pub fn new(engine: Arc<SyncEngine<R, S>>) -> Self {
        Self { engine }
    }

    /// Returns the underlying engine.
    pub fn engine(&self) -> &Arc<SyncEngine<R, S>> {
        &self.engine
    }

    /// Reloads entries, preferring the remote (see [`SyncEngine::load`]).
    pub fn refresh(&self) -> SyncResult<LoadSource> {
        self.engine.load()
    }

    /// Returns every entry id, newest first.
    pub fn list(&self) -> Vec<EntryId> {
        self.engine.ids_newest_first()
    }

    /// Creates an empty entry dated now and returns its id.
    pub fn create(&self) -> SyncResult<EntryId> {
        self.create_at(Timestamp::now())
    }

    /// Creates an empty entry dated `now` and returns its id.
    ///
    /// The id is the date of `now`, suffixed `_1`, `_2`, ... if taken.
    pub fn create_at(&self, now: Timestamp) -> SyncResult<EntryId> {
        self.engine.insert_new(now.date(), Entry::new_at(now))
    }

    /// Returns the content of an entry.
    pub fn view(&self, id: &EntryId) -> SyncResult<String> {
        self.entry(id).map(|entry| entry.content)
    }

    /// Returns a copy of an entry.
    pub fn entry(&self, id: &EntryId) -> SyncResult<Entry> {
        self.engine
            .get(id)
            .ok_or_else(|| SyncError::NotFound(id.clone()))
    }

    /// Replaces the content of an entry, stamping it as updated now.
    pub fn edit(&self, id: &EntryId, content: impl Into<String>) -> SyncResult<()> {
        self.edit_at(id, content, Timestamp::now())
    }

    /// Replaces the content of an entry, stamping it as updated at `now`.
    pub fn edit_at(
        &self,
        id: &EntryId,
        content: impl Into<String>,
        now: Timestamp,
    ) -> SyncResult<()> {
        let content = content.into();
        self.engine
            .update(id, |entry| entry.touch(content, now))
            .map(|_| ())
    }

    /// Deletes an entry.
    pub fn delete(&self, id: &EntryId) -> SyncResult<()> {
        if !self.engine.contains(id) {
            return Err(SyncError::NotFound(id.clone()));
        }
        self.engine.remove(id).map(|_| ())
    }
}

impl<R: RemoteClient, S: EntryStore> Clone for Journal<R, S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}
