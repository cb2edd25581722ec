//! Entry store trait definition.

use crate::error::StorageResult;
use daylog_entry::{Entry, EntryId, EntrySet};
use tracing::warn;

/// Outcome of reading every record in a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreLoad {
    /// Every record that parsed.
    pub entries: EntrySet,
    /// Number of records that were skipped as malformed.
    pub skipped: usize,
}

/// Durable per-entry persistence keyed by [`EntryId`].
///
/// # Invariants
///
/// - `write` fully replaces the prior record or fails, never leaving a
///   torn record readable
/// - `read_all` skips (and logs) records that fail to parse instead of
///   aborting
/// - `delete` of an absent record succeeds
/// - Stores must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryEntryStore`] - For testing
/// - [`super::FileEntryStore`] - For persistent storage
pub trait EntryStore: Send + Sync {
    /// Reads every persisted entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the store itself cannot be listed. Individual
    /// unreadable records are counted in [`StoreLoad::skipped`].
    fn read_all(&self) -> StorageResult<StoreLoad>;

    /// Reads a single entry.
    ///
    /// Returns `Ok(None)` if there is no record for `id`. A record that
    /// exists but fails to parse is also reported as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but cannot be read.
    fn read(&self, id: &EntryId) -> StorageResult<Option<Entry>>;

    /// Overwrites the record of every entry in `entries`.
    ///
    /// Records for ids not in `entries` are left alone. A failing record
    /// does not stop the others from being written.
    ///
    /// # Errors
    ///
    /// Returns the first failure after every record has been attempted.
    fn write_all(&self, entries: &EntrySet) -> StorageResult<()> {
        let mut first_error = None;
        for (id, entry) in entries {
            if let Err(e) = self.write(id, entry) {
                warn!(%id, error = %e, "failed to write record");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Overwrites a single record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn write(&self, id: &EntryId, entry: &Entry) -> StorageResult<()>;

    /// Removes a single record.
    ///
    /// Returns whether a record was present, readable or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but cannot be removed.
    fn delete(&self, id: &EntryId) -> StorageResult<bool>;
}

impl<S: EntryStore + ?Sized> EntryStore for std::sync::Arc<S> {
    fn read_all(&self) -> StorageResult<StoreLoad> {
        (**self).read_all()
    }

    fn read(&self, id: &EntryId) -> StorageResult<Option<Entry>> {
        (**self).read(id)
    }

    fn write_all(&self, entries: &EntrySet) -> StorageResult<()> {
        (**self).write_all(entries)
    }

    fn write(&self, id: &EntryId, entry: &Entry) -> StorageResult<()> {
        (**self).write(id, entry)
    }

    fn delete(&self, id: &EntryId) -> StorageResult<bool> {
        (**self).delete(id)
    }
}
