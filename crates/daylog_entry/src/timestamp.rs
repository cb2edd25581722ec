//! Entry timestamps.

use crate::error::EntryError;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SubsecRound, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const WHOLE_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";
const MICROS: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// A naive local date-time with microsecond precision.
///
/// Written as ISO-8601 without an offset (`2024-01-01T10:00:00.250000`,
/// fraction omitted when zero). Parsing also accepts RFC 3339 strings with
/// an offset, which are normalized to UTC.
///
/// `updated_at` timestamps are the only ordering field used when merging
/// two copies of an entry.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Returns the current local time, truncated to microseconds.
    #[must_use]
    pub fn now() -> Self {
        Self(Local::now().naive_local().trunc_subsecs(6))
    }

    /// Wraps a naive date-time.
    #[must_use]
    pub const fn from_naive(datetime: NaiveDateTime) -> Self {
        Self(datetime)
    }

    /// Returns the wrapped date-time.
    #[must_use]
    pub const fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Returns the calendar date.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = if self.0.nanosecond() == 0 {
            WHOLE_SECONDS
        } else {
            MICROS
        };
        write!(f, "{}", self.0.format(format))
    }
}

impl FromStr for Timestamp {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, FORMAT) {
            return Ok(Self(naive));
        }
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.naive_utc()))
            .map_err(|_| EntryError::InvalidTimestamp(s.to_string()))
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(datetime: NaiveDateTime) -> Self {
        Self(datetime)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
