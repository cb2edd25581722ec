//! Sync engine.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::merge::{merge_into, ReconcileReport};
use crate::remote::{RemoteClient, Unavailable};
use daylog_entry::{Entry, EntryId, EntrySet, NaiveDate};
use daylog_storage::{EntryStore, StorageError};
use parking_lot::{Mutex, RwLock};
use std::time::Instant;
use tracing::{debug, error, info};

/// Where [`SyncEngine::load`] found its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The remote was reachable; its entry set replaced local state.
    Remote {
        /// Number of entries loaded.
        count: usize,
    },
    /// The remote was unavailable; entries came from the local mirror.
    LocalCache {
        /// Number of entries loaded.
        count: usize,
        /// Number of malformed local records skipped.
        skipped: usize,
    },
}

/// Result of one reconciliation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The remote was unavailable; nothing changed.
    Skipped(Unavailable),
    /// The remote set was merged into local state.
    Merged(ReconcileReport),
}

/// Statistics about sync activity.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Reconciliation cycles that merged a remote set.
    pub cycles_completed: u64,
    /// Reconciliation cycles skipped because the remote was unavailable.
    pub cycles_skipped: u64,
    /// Total entries inserted or replaced from the remote.
    pub entries_pulled: u64,
    /// Last time a remote set was merged or loaded.
    pub last_sync_time: Option<Instant>,
    /// Last remote failure, cleared when the remote answers again.
    pub last_error: Option<String>,
    /// Whether the last remote call succeeded. `None` before the first call.
    pub remote_available: Option<bool>,
}

/// State guarded by the sync lock.
#[derive(Debug, Default)]
struct JournalState {
    entries: EntrySet,
}

/// The sync engine owns the in-memory entry set and keeps it converged
/// with a local [`EntryStore`] and a [`RemoteClient`].
///
/// All access to the entry set goes through a single mutex. Remote calls
/// are made outside that lock so an unreachable remote only costs its own
/// timeout, never a stalled edit.
pub struct SyncEngine<R: RemoteClient, S: EntryStore> {
    config: SyncConfig,
    remote: R,
    store: S,
    state: Mutex<JournalState>,
    stats: RwLock<SyncStats>,
}

impl<R: RemoteClient, S: EntryStore> SyncEngine<R, S> {
    /// Creates a new sync engine with an empty entry set.
    ///
    /// Call [`SyncEngine::load`] to bootstrap it.
    pub fn new(config: SyncConfig, remote: R, store: S) -> Self {
        Self {
            config,
            remote,
            store,
            state: Mutex::new(JournalState::default()),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the remote client.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Returns the local store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Returns a copy of the entry set.
    pub fn entries(&self) -> EntrySet {
        self.state.lock().entries.clone()
    }

    /// Returns a copy of one entry.
    pub fn get(&self, id: &EntryId) -> Option<Entry> {
        self.state.lock().entries.get(id).cloned()
    }

    /// Returns true if an entry with this id exists.
    pub fn contains(&self, id: &EntryId) -> bool {
        self.state.lock().entries.contains_key(id)
    }

    /// Returns every id, newest first.
    pub fn ids_newest_first(&self) -> Vec<EntryId> {
        self.state.lock().entries.keys().rev().cloned().collect()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Bootstraps the entry set.
    ///
    /// The remote is preferred: if it answers, its entry set replaces local
    /// state wholesale and is written to the local mirror. Otherwise the
    /// entry set is read from the local mirror.
    ///
    /// # Errors
    ///
    /// Returns an error only if the local mirror cannot be read or written.
    pub fn load(&self) -> SyncResult<LoadSource> {
        match self.remote.fetch_all() {
            Ok(snapshot) => {
                self.note_remote_ok();
                let mut state = self.state.lock();
                state.entries = snapshot.entries;
                let count = state.entries.len();
                self.store
                    .write_all(&state.entries)
                    .map_err(|e| self.local_failure("load", e))?;
                drop(state);

                self.stats.write().last_sync_time = Some(Instant::now());
                info!(count, "loaded entries from remote");
                Ok(LoadSource::Remote { count })
            }
            Err(unavailable) => {
                self.note_remote_err(&unavailable);
                let mut state = self.state.lock();
                let load = self
                    .store
                    .read_all()
                    .map_err(|e| self.local_failure("load", e))?;
                let count = load.entries.len();
                state.entries = load.entries;
                drop(state);

                info!(count, skipped = load.skipped, reason = %unavailable, "loaded entries from local cache");
                Ok(LoadSource::LocalCache {
                    count,
                    skipped: load.skipped,
                })
            }
        }
    }

    /// Stores an entry under `id`.
    ///
    /// The entry is written to memory and to the local mirror under the
    /// sync lock, then pushed to the remote (best-effort).
    ///
    /// # Errors
    ///
    /// Returns an error if the local write fails. The in-memory change is
    /// kept and the remote push is still attempted.
    pub fn save(&self, id: &EntryId, entry: Entry) -> SyncResult<()> {
        let stored = {
            let mut state = self.state.lock();
            let stored = self.store.write(id, &entry);
            state.entries.insert(id.clone(), entry.clone());
            stored
        };

        self.push(id, &entry);
        stored.map_err(|e| self.local_failure("save", e))
    }

    /// Applies `edit` to the entry under `id` and stores the result.
    ///
    /// The read-modify-write happens under one acquisition of the sync lock,
    /// so a concurrent reconciliation cannot slip in between.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if there is no such entry, or a
    /// storage error if the local write fails.
    pub fn update(&self, id: &EntryId, edit: impl FnOnce(&mut Entry)) -> SyncResult<Entry> {
        let (entry, stored) = {
            let mut state = self.state.lock();
            let current = state
                .entries
                .get_mut(id)
                .ok_or_else(|| SyncError::NotFound(id.clone()))?;
            edit(current);
            let entry = current.clone();
            let stored = self.store.write(id, &entry);
            (entry, stored)
        };

        self.push(id, &entry);
        stored.map_err(|e| self.local_failure("update", e))?;
        Ok(entry)
    }

    /// Stores `entry` under the first free id for `date`.
    ///
    /// Allocation and insertion happen under the sync lock, so concurrent
    /// creators (or a reconciliation) can never claim the same id. An id
    /// whose record is still in the local store counts as taken even when
    /// it is not in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the local write fails. The id is still taken.
    pub fn insert_new(&self, date: NaiveDate, entry: Entry) -> SyncResult<EntryId> {
        let (id, stored) = {
            let mut state = self.state.lock();
            let id = EntryId::next_available(date, |candidate| {
                state.entries.contains_key(candidate)
                    || matches!(self.store.read(candidate), Ok(Some(_)))
            });
            let stored = self.store.write(&id, &entry);
            state.entries.insert(id.clone(), entry.clone());
            (id, stored)
        };

        self.push(&id, &entry);
        stored.map_err(|e| self.local_failure("create", e))?;
        Ok(id)
    }

    /// Removes the entry under `id`.
    ///
    /// Returns whether the entry existed in memory. The local record and
    /// the remote copy are deleted either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the local record cannot be deleted.
    pub fn remove(&self, id: &EntryId) -> SyncResult<bool> {
        let (existed, deleted) = {
            let mut state = self.state.lock();
            let existed = state.entries.remove(id).is_some();
            (existed, self.store.delete(id))
        };

        self.push_delete(id);
        deleted.map_err(|e| self.local_failure("remove", e))?;
        Ok(existed)
    }

    /// Runs one reconciliation cycle.
    ///
    /// Fetches the full remote set outside the lock, then merges it under
    /// the lock with the last-write-wins policy and rewrites the local
    /// mirror. Entries only present locally are never removed. An
    /// unavailable remote is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error only if the local mirror cannot be written.
    pub fn reconcile(&self) -> SyncResult<ReconcileOutcome> {
        let snapshot = match self.remote.fetch_all() {
            Ok(snapshot) => snapshot,
            Err(unavailable) => {
                self.note_remote_err(&unavailable);
                self.stats.write().cycles_skipped += 1;
                return Ok(ReconcileOutcome::Skipped(unavailable));
            }
        };
        self.note_remote_ok();

        let report = {
            let mut state = self.state.lock();
            let report = merge_into(&mut state.entries, snapshot.entries);
            self.store
                .write_all(&state.entries)
                .map_err(|e| self.local_failure("reconcile", e))?;
            report
        };

        {
            let mut stats = self.stats.write();
            stats.cycles_completed += 1;
            stats.entries_pulled += report.pulled() as u64;
            stats.last_sync_time = Some(Instant::now());
        }
        debug!(
            inserted = report.inserted,
            replaced = report.replaced,
            kept = report.kept,
            "reconciled with remote"
        );
        Ok(ReconcileOutcome::Merged(report))
    }

    /// Best-effort remote put.
    fn push(&self, id: &EntryId, entry: &Entry) {
        match self.remote.put(id, entry) {
            Ok(()) => self.note_remote_ok(),
            Err(unavailable) => {
                debug!(%id, reason = %unavailable, "remote put failed");
                self.note_remote_err(&unavailable);
            }
        }
    }

    /// Best-effort remote delete.
    fn push_delete(&self, id: &EntryId) {
        match self.remote.delete(id) {
            Ok(()) => self.note_remote_ok(),
            Err(unavailable) => {
                debug!(%id, reason = %unavailable, "remote delete failed");
                self.note_remote_err(&unavailable);
            }
        }
    }

    fn note_remote_ok(&self) {
        let mut stats = self.stats.write();
        if stats.remote_available != Some(true) {
            info!(server = %self.config.server_url, "remote available");
        }
        stats.remote_available = Some(true);
        stats.last_error = None;
    }

    fn note_remote_err(&self, unavailable: &Unavailable) {
        let mut stats = self.stats.write();
        if stats.remote_available != Some(false) {
            info!(server = %self.config.server_url, reason = %unavailable, "remote unavailable, working offline");
        }
        stats.remote_available = Some(false);
        stats.last_error = Some(unavailable.to_string());
    }

    fn local_failure(&self, operation: &'static str, err: StorageError) -> SyncError {
        error!(operation, error = %err, "local storage failure");
        SyncError::Storage(err)
    }
}

impl<R: RemoteClient, S: EntryStore> std::fmt::Debug for SyncEngine<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.config)
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}
