//! File-based entry store.

use crate::error::{StorageError, StorageResult};
use crate::store::{EntryStore, StoreLoad};
use daylog_entry::{codec, Entry, EntryId};
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// File extension of entry records.
pub const RECORD_EXTENSION: &str = "json";

const TEMP_SUFFIX: &str = ".tmp";

/// A directory of entry records, one indented JSON file per entry.
///
/// The record for `2024-01-01` lives at `<dir>/2024-01-01.json`. Files
/// with any other extension are ignored.
///
/// # Durability
///
/// Each write goes to a `<id>.json.tmp` sibling which is synced and then
/// renamed over the record, so a reader sees either the old or the new
/// record, never a partial one.
///
/// # Thread Safety
///
/// Writes and deletes are serialized by an internal lock, so a store can
/// be shared across threads (e.g. by concurrent request handlers).
///
/// # Example
///
/// ```no_run
/// use daylog_entry::{Entry, EntryId};
/// use daylog_storage::{EntryStore, FileEntryStore};
/// use std::path::Path;
///
/// let store = FileEntryStore::open(Path::new("data")).unwrap();
/// let id = EntryId::parse("2024-01-01").unwrap();
/// store.write(&id, &Entry::default()).unwrap();
/// ```
#[derive(Debug)]
pub struct FileEntryStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileEntryStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    /// Returns the directory holding the records.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the record path for an id.
    #[must_use]
    pub fn record_path(&self, id: &EntryId) -> PathBuf {
        self.dir.join(format!("{}.{}", id, RECORD_EXTENSION))
    }

    fn temp_path(&self, id: &EntryId) -> PathBuf {
        self.dir
            .join(format!("{}.{}{}", id, RECORD_EXTENSION, TEMP_SUFFIX))
    }

    fn read_record(path: &Path) -> Result<Entry, String> {
        let bytes = fs::read(path).map_err(|e| e.to_string())?;
        codec::decode_entry(&bytes).map_err(|e| e.to_string())
    }
}

impl EntryStore for FileEntryStore {
    fn read_all(&self) -> StorageResult<StoreLoad> {
        let mut load = StoreLoad::default();

        let listing = match fs::read_dir(&self.dir) {
            Ok(listing) => listing,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(load),
            Err(e) => return Err(StorageError::io(&self.dir, e)),
        };

        for dirent in listing {
            let path = dirent.map_err(|e| StorageError::io(&self.dir, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                warn!(path = %path.display(), "skipping record with non-UTF-8 name");
                load.skipped += 1;
                continue;
            };
            let id = match EntryId::parse(stem) {
                Ok(id) => id,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping record with invalid id");
                    load.skipped += 1;
                    continue;
                }
            };

            match Self::read_record(&path) {
                Ok(entry) => {
                    load.entries.insert(id, entry);
                }
                Err(reason) => {
                    warn!(path = %path.display(), error = %reason, "skipping malformed record");
                    load.skipped += 1;
                }
            }
        }

        Ok(load)
    }

    fn read(&self, id: &EntryId) -> StorageResult<Option<Entry>> {
        let path = self.record_path(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(path, e)),
        };

        match codec::decode_entry(&bytes) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed record");
                Ok(None)
            }
        }
    }

    fn write(&self, id: &EntryId, entry: &Entry) -> StorageResult<()> {
        let bytes = codec::encode_entry_pretty(entry)?;
        let path = self.record_path(id);
        let temp = self.temp_path(id);

        let _guard = self.write_lock.lock();

        let mut file = File::create(&temp).map_err(|e| StorageError::io(&temp, e))?;
        file.write_all(&bytes)
            .and_then(|()| file.sync_all())
            .map_err(|e| StorageError::io(&temp, e))?;
        drop(file);

        fs::rename(&temp, &path).map_err(|e| {
            let _ = fs::remove_file(&temp);
            StorageError::io(&path, e)
        })
    }

    fn delete(&self, id: &EntryId) -> StorageResult<bool> {
        let path = self.record_path(id);
        let _guard = self.write_lock.lock();

        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daylog_entry::EntrySet;
    use tempfile::tempdir;

    fn id(s: &str) -> EntryId {
        EntryId::parse(s).unwrap()
    }

    fn entry(content: &str, updated: &str) -> Entry {
        Entry::with_content(content, None, Some(updated.parse().unwrap()))
    }

    #[test]
    fn open_creates_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("data");

        let store = FileEntryStore::open(&path).unwrap();
        assert!(path.is_dir());
        assert_eq!(store.dir(), path);
    }

    #[test]
    fn write_and_read_back() {
        let dir = tempdir().unwrap();
        let store = FileEntryStore::open(dir.path()).unwrap();

        let e = entry("hello", "2024-01-01T10:00:00");
        store.write(&id("2024-01-01"), &e).unwrap();

        assert_eq!(store.read(&id("2024-01-01")).unwrap(), Some(e.clone()));
        let load = store.read_all().unwrap();
        assert_eq!(load.entries.get("2024-01-01"), Some(&e));
        assert_eq!(load.skipped, 0);
    }

    #[test]
    fn record_is_indented_json_named_by_id() {
        let dir = tempdir().unwrap();
        let store = FileEntryStore::open(dir.path()).unwrap();
        store
            .write(&id("2024-01-01_1"), &entry("x", "2024-01-01T10:00:00"))
            .unwrap();

        let text = fs::read_to_string(dir.path().join("2024-01-01_1.json")).unwrap();
        assert!(text.starts_with("{\n  \"content\": \"x\""));
        assert!(!dir.path().join("2024-01-01_1.json.tmp").exists());
    }

    #[test]
    fn overwrite_replaces_whole_record() {
        let dir = tempdir().unwrap();
        let store = FileEntryStore::open(dir.path()).unwrap();

        store
            .write(&id("2024-01-01"), &entry("a much longer first version", "2024-01-01T10:00:00"))
            .unwrap();
        store
            .write(&id("2024-01-01"), &entry("b", "2024-01-01T11:00:00"))
            .unwrap();

        let read = store.read(&id("2024-01-01")).unwrap().unwrap();
        assert_eq!(read.content, "b");
    }

    #[test]
    fn read_all_skips_malformed_records() {
        let dir = tempdir().unwrap();
        let store = FileEntryStore::open(dir.path()).unwrap();
        store
            .write(&id("2024-01-01"), &entry("good", "2024-01-01T10:00:00"))
            .unwrap();
        fs::write(dir.path().join("2024-01-02.json"), "{ not json").unwrap();
        fs::write(dir.path().join("bad name.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::write(dir.path().join("2024-01-03.json.tmp"), "{}").unwrap();

        let load = store.read_all().unwrap();
        assert_eq!(load.entries.len(), 1);
        assert!(load.entries.contains_key("2024-01-01"));
        assert_eq!(load.skipped, 2);
    }

    #[test]
    fn read_missing_is_none() {
        let dir = tempdir().unwrap();
        let store = FileEntryStore::open(dir.path()).unwrap();
        assert_eq!(store.read(&id("2024-01-01")).unwrap(), None);
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FileEntryStore::open(dir.path()).unwrap();
        store
            .write(&id("2024-01-01"), &entry("x", "2024-01-01T10:00:00"))
            .unwrap();

        assert!(store.delete(&id("2024-01-01")).unwrap());
        assert!(!dir.path().join("2024-01-01.json").exists());
        assert!(!store.delete(&id("2024-01-01")).unwrap());
    }

    #[test]
    fn delete_removes_malformed_record() {
        let dir = tempdir().unwrap();
        let store = FileEntryStore::open(dir.path()).unwrap();
        fs::write(dir.path().join("2024-01-01.json"), b"{ torn").unwrap();

        assert_eq!(store.read(&id("2024-01-01")).unwrap(), None);
        assert!(store.delete(&id("2024-01-01")).unwrap());
        assert!(!dir.path().join("2024-01-01.json").exists());
    }

    #[test]
    fn write_all_continues_past_failing_record() {
        let dir = tempdir().unwrap();
        let store = FileEntryStore::open(dir.path()).unwrap();
        // A directory squatting on the record path makes the rename fail.
        fs::create_dir(dir.path().join("2024-01-01.json")).unwrap();

        let entries = EntrySet::from([
            (id("2024-01-01"), entry("blocked", "2024-01-01T10:00:00")),
            (id("2024-01-02"), entry("healthy", "2024-01-02T10:00:00")),
        ]);
        let result = store.write_all(&entries);

        assert!(matches!(result, Err(StorageError::Io { .. })));
        assert_eq!(store.read(&id("2024-01-02")).unwrap().unwrap().content, "healthy");
        assert!(!dir.path().join("2024-01-01.json.tmp").exists());
    }

    #[test]
    fn write_all_leaves_other_records() {
        let dir = tempdir().unwrap();
        let store = FileEntryStore::open(dir.path()).unwrap();
        store
            .write(&id("2023-12-31"), &entry("old", "2023-12-31T10:00:00"))
            .unwrap();

        let mut set = EntrySet::new();
        set.insert(id("2024-01-01"), entry("a", "2024-01-01T10:00:00"));
        set.insert(id("2024-01-02"), entry("b", "2024-01-02T10:00:00"));
        store.write_all(&set).unwrap();

        assert_eq!(store.read_all().unwrap().entries.len(), 3);
    }

    #[test]
    fn persistence_across_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = FileEntryStore::open(dir.path()).unwrap();
            store
                .write(&id("2024-01-01"), &entry("kept", "2024-01-01T10:00:00"))
                .unwrap();
        }

        let store = FileEntryStore::open(dir.path()).unwrap();
        let read = store.read(&id("2024-01-01")).unwrap().unwrap();
        assert_eq!(read.content, "kept");
    }
}
