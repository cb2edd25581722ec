//! JSON record encoding.
//!
//! Entries are stored and transmitted as JSON objects with the fields
//! `content`, `created_at` and `updated_at`. The on-disk form is indented
//! with two spaces for human inspection; the wire form is compact. Both
//! keep non-ASCII text unescaped.
//!
//! Bulk payloads (`{id: entry, ...}`) are decoded leniently: a record that
//! fails to parse is reported in [`DecodedSet::skipped`] instead of failing
//! the whole payload.

use crate::entry::{Entry, EntrySet};
use crate::error::{EntryError, EntryResult};
use crate::id::EntryId;
use serde_json::{Map, Value};

/// A record that was dropped during a lenient decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// The raw key of the record.
    pub key: String,
    /// Why the record was dropped.
    pub reason: String,
}

/// Result of decoding a bulk entry payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedSet {
    /// Entries that decoded cleanly.
    pub entries: EntrySet,
    /// Records that were dropped.
    pub skipped: Vec<SkippedRecord>,
}

/// Encodes an entry in its indented on-disk form.
pub fn encode_entry_pretty(entry: &Entry) -> EntryResult<Vec<u8>> {
    serde_json::to_vec_pretty(entry).map_err(|e| EntryError::encode(e.to_string()))
}

/// Encodes an entry in its compact wire form.
pub fn encode_entry(entry: &Entry) -> EntryResult<Vec<u8>> {
    serde_json::to_vec(entry).map_err(|e| EntryError::encode(e.to_string()))
}

/// Decodes a single entry.
pub fn decode_entry(bytes: &[u8]) -> EntryResult<Entry> {
    serde_json::from_slice(bytes).map_err(|e| EntryError::decode(e.to_string()))
}

/// Encodes a full entry set as a single JSON object.
pub fn encode_entry_set(entries: &EntrySet) -> EntryResult<Vec<u8>> {
    serde_json::to_vec(entries).map_err(|e| EntryError::encode(e.to_string()))
}

/// Decodes an `{id: entry}` object record by record.
///
/// # Errors
///
/// Fails only if the payload is not a JSON object. Individual records with
/// an invalid id or a malformed body are collected in `skipped`.
pub fn decode_entry_set_lenient(bytes: &[u8]) -> EntryResult<DecodedSet> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| EntryError::decode(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(EntryError::decode("expected a JSON object of entries"));
    };
    Ok(decode_records(map))
}

fn decode_records(map: Map<String, Value>) -> DecodedSet {
    let mut decoded = DecodedSet::default();

    for (key, raw) in map {
        let id = match EntryId::parse(key.clone()) {
            Ok(id) => id,
            Err(e) => {
                decoded.skipped.push(SkippedRecord {
                    key,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        match serde_json::from_value::<Entry>(raw) {
            Ok(entry) => {
                decoded.entries.insert(id, entry);
            }
            Err(e) => decoded.skipped.push(SkippedRecord {
                key,
                reason: e.to_string(),
            }),
        }
    }

    decoded
}
