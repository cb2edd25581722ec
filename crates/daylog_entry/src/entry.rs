//! Journal entries.

use crate::id::EntryId;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from entry id to entry.
///
/// Ordered by id so that listings and bulk writes are deterministic.
pub type EntrySet = BTreeMap<EntryId, Entry>;

/// A dated text note.
///
/// An entry is merged as a whole unit: two copies of the same id are
/// ordered only by `updated_at`. Either timestamp may be absent on records
/// written by other clients; such records are "undated".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    /// The note text.
    #[serde(default)]
    pub content: String,
    /// When the entry was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    /// When the entry content last changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Entry {
    /// Creates an empty entry with both timestamps set to `now`.
    #[must_use]
    pub fn new_at(now: Timestamp) -> Self {
        Self {
            content: String::new(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Creates an entry with the given content and timestamps.
    #[must_use]
    pub fn with_content(
        content: impl Into<String>,
        created_at: Option<Timestamp>,
        updated_at: Option<Timestamp>,
    ) -> Self {
        Self {
            content: content.into(),
            created_at,
            updated_at,
        }
    }

    /// Replaces the content and refreshes `updated_at`.
    pub fn touch(&mut self, content: impl Into<String>, now: Timestamp) {
        self.content = content.into();
        self.updated_at = Some(now);
    }

    /// Returns true if the entry carries an `updated_at` timestamp.
    #[must_use]
    pub fn is_dated(&self) -> bool {
        self.updated_at.is_some()
    }
}
