//! In-memory entry store for testing.

use crate::error::{StorageError, StorageResult};
use crate::store::{EntryStore, StoreLoad};
use daylog_entry::{Entry, EntryId, EntrySet};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// An in-memory entry store.
///
/// This store keeps all records in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Simulating a failing disk via [`InMemoryEntryStore::set_fail_writes`]
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use daylog_entry::{Entry, EntryId};
/// use daylog_storage::{EntryStore, InMemoryEntryStore};
///
/// let store = InMemoryEntryStore::new();
/// store.set_fail_writes(true);
/// let id = EntryId::parse("2024-01-01").unwrap();
/// assert!(store.write(&id, &Entry::default()).is_err());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryEntryStore {
    records: RwLock<EntrySet>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryEntryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with pre-existing records.
    ///
    /// Useful for testing offline bootstrap.
    #[must_use]
    pub fn with_entries(entries: EntrySet) -> Self {
        Self {
            records: RwLock::new(entries),
            ..Self::default()
        }
    }

    /// Returns a copy of all records.
    #[must_use]
    pub fn snapshot(&self) -> EntrySet {
        self.records.read().clone()
    }

    /// Makes every subsequent write and delete fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of successful single-record writes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("writes disabled".into()))
        } else {
            Ok(())
        }
    }
}

impl EntryStore for InMemoryEntryStore {
    fn read_all(&self) -> StorageResult<StoreLoad> {
        Ok(StoreLoad {
            entries: self.records.read().clone(),
            skipped: 0,
        })
    }

    fn read(&self, id: &EntryId) -> StorageResult<Option<Entry>> {
        Ok(self.records.read().get(id).cloned())
    }

    fn write(&self, id: &EntryId, entry: &Entry) -> StorageResult<()> {
        self.check_writable()?;
        self.records.write().insert(id.clone(), entry.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn delete(&self, id: &EntryId) -> StorageResult<bool> {
        self.check_writable()?;
        Ok(self.records.write().remove(id).is_some())
    }
}
