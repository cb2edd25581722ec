//! Entry identifier.

use crate::error::{EntryError, EntryResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Maximum length of an entry id in bytes.
pub const MAX_ID_LEN: usize = 128;

/// Unique identifier for a journal entry.
///
/// Entry IDs are derived from a calendar date (`YYYY-MM-DD`) and
/// disambiguated with a numeric suffix (`YYYY-MM-DD_1`, `_2`, ...) when
/// the date is already taken. They are:
/// - Immutable once assigned
/// - Safe to use as a file stem and as a URL path segment
///
/// Ids received from other stores are not required to follow the date
/// pattern, only the character rules checked by [`EntryId::parse`].
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryId(String);

impl EntryId {
    /// Validates and wraps an id string.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::InvalidId`] if the id is empty, too long,
    /// starts with a dot, or contains anything other than ASCII
    /// alphanumerics, `-` and `_`.
    pub fn parse(id: impl Into<String>) -> EntryResult<Self> {
        let id = id.into();
        let reason = if id.is_empty() {
            Some("empty")
        } else if id.len() > MAX_ID_LEN {
            Some("too long")
        } else if id.starts_with('.') {
            Some("starts with a dot")
        } else if !id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            Some("contains a disallowed character")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(EntryError::InvalidId { id, reason }),
            None => Ok(Self(id)),
        }
    }

    /// Returns the base id for a date (`YYYY-MM-DD`).
    #[must_use]
    pub fn for_date(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }

    /// Returns the suffixed id for a date (`YYYY-MM-DD_n`).
    #[must_use]
    pub fn with_suffix(date: NaiveDate, n: u32) -> Self {
        Self(format!("{}_{}", date.format("%Y-%m-%d"), n))
    }

    /// Returns the first id for `date` that `is_taken` rejects.
    ///
    /// Candidates are tried in order `D`, `D_1`, `D_2`, ...
    pub fn next_available(date: NaiveDate, mut is_taken: impl FnMut(&EntryId) -> bool) -> Self {
        let base = Self::for_date(date);
        if !is_taken(&base) {
            return base;
        }
        let mut n = 1u32;
        loop {
            let candidate = Self::with_suffix(date, n);
            if !is_taken(&candidate) {
                return candidate;
            }
            n = n.saturating_add(1);
        }
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the calendar date encoded in the id, if it has one.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        let head = self.0.get(..10)?;
        let rest = &self.0[10..];
        if !(rest.is_empty() || rest.starts_with('_')) {
            return None;
        }
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({})", self.0)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntryId {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EntryId {
    type Error = EntryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
