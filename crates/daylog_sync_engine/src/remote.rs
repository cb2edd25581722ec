//! Remote client abstraction.

use daylog_entry::{Entry, EntryId, EntrySet, SkippedRecord};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Result type for remote calls.
pub type RemoteResult<T> = Result<T, Unavailable>;

/// Why the remote could not be used.
///
/// Every variant is a normal, non-fatal condition: callers fall back to
/// local state and try again on the next cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// The call did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// No connection could be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other transport failure.
    #[error("request failed: {0}")]
    Request(String),

    /// The remote answered with a non-success status.
    #[error("remote returned status {0}")]
    Status(u16),

    /// The response body could not be decoded.
    #[error("invalid response body: {0}")]
    Body(String),
}

/// The full remote entry set as fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteSnapshot {
    /// Entries that decoded cleanly.
    pub entries: EntrySet,
    /// Remote records that were dropped as malformed.
    pub skipped: Vec<SkippedRecord>,
}

impl From<EntrySet> for RemoteSnapshot {
    fn from(entries: EntrySet) -> Self {
        Self {
            entries,
            skipped: Vec::new(),
        }
    }
}

/// Best-effort transport to a remote entries service.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP, in-memory mock for testing, etc.). Every call
/// must be bounded by a short timeout.
pub trait RemoteClient: Send + Sync {
    /// Fetches every remote entry.
    fn fetch_all(&self) -> RemoteResult<RemoteSnapshot>;

    /// Fetches a single entry, `Ok(None)` if the remote does not have it.
    fn fetch(&self, id: &EntryId) -> RemoteResult<Option<Entry>>;

    /// Creates or replaces a remote entry.
    fn put(&self, id: &EntryId, entry: &Entry) -> RemoteResult<()>;

    /// Deletes a remote entry. Deleting an absent entry succeeds.
    fn delete(&self, id: &EntryId) -> RemoteResult<()>;
}

impl<R: RemoteClient + ?Sized> RemoteClient for Arc<R> {
    fn fetch_all(&self) -> RemoteResult<RemoteSnapshot> {
        (**self).fetch_all()
    }

    fn fetch(&self, id: &EntryId) -> RemoteResult<Option<Entry>> {
        (**self).fetch(id)
    }

    fn put(&self, id: &EntryId, entry: &Entry) -> RemoteResult<()> {
        (**self).put(id, entry)
    }

    fn delete(&self, id: &EntryId) -> RemoteResult<()> {
        (**self).delete(id)
    }
}

/// An in-memory remote for testing.
///
/// Behaves like a reachable entries service until switched offline with
/// [`MockRemote::set_online`], after which every call returns
/// [`Unavailable::Connect`].
#[derive(Debug)]
pub struct MockRemote {
    entries: RwLock<EntrySet>,
    online: AtomicBool,
    fetches: AtomicUsize,
    puts: AtomicUsize,
    deletes: AtomicUsize,
}

impl MockRemote {
    /// Creates an empty, online mock remote.
    pub fn new() -> Self {
        Self::with_entries(EntrySet::new())
    }

    /// Creates an online mock remote holding `entries`.
    pub fn with_entries(entries: EntrySet) -> Self {
        Self {
            entries: RwLock::new(entries),
            online: AtomicBool::new(true),
            fetches: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    /// Switches the remote on or offline.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Places an entry on the remote as another device would.
    pub fn insert(&self, id: EntryId, entry: Entry) {
        self.entries.write().insert(id, entry);
    }

    /// Returns a copy of the remote entries.
    pub fn snapshot(&self) -> EntrySet {
        self.entries.read().clone()
    }

    /// Number of `fetch_all` calls seen, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `put` calls seen, including failed ones.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of `delete` calls seen, including failed ones.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> RemoteResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Unavailable::Connect("mock remote is offline".into()))
        }
    }
}

impl Default for MockRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteClient for MockRemote {
    fn fetch_all(&self) -> RemoteResult<RemoteSnapshot> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self.snapshot().into())
    }

    fn fetch(&self, id: &EntryId) -> RemoteResult<Option<Entry>> {
        self.check_online()?;
        Ok(self.entries.read().get(id).cloned())
    }

    fn put(&self, id: &EntryId, entry: &Entry) -> RemoteResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.entries.write().insert(id.clone(), entry.clone());
        Ok(())
    }

    fn delete(&self, id: &EntryId) -> RemoteResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.entries.write().remove(id);
        Ok(())
    }
}
