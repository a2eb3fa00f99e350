//! Naive or timezone-aware timestamps.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AnnotationError;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A calendar instant, naive until localized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// Wall-clock time without zone information (filepath-derived values).
    Naive(NaiveDateTime),
    /// Instant with a fixed UTC offset (intrinsic creation times).
    Aware(DateTime<FixedOffset>),
}

impl Timestamp {
    pub fn is_aware(&self) -> bool {
        matches!(self, Timestamp::Aware(_))
    }

    /// Wall-clock reading, in the attached offset when aware.
    pub fn naive_local(&self) -> NaiveDateTime {
        match self {
            Timestamp::Naive(dt) => *dt,
            Timestamp::Aware(dt) => dt.naive_local(),
        }
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Timestamp::Naive(dt)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Timestamp::Aware(dt)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::Aware(dt.fixed_offset())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Naive(dt) => write!(f, "{}", dt.format(NAIVE_FORMATS[0])),
            Timestamp::Aware(dt) => f.write_str(&dt.to_rfc3339()),
        }
    }
}

impl FromStr for Timestamp {
    type Err = AnnotationError;

    /// Parses RFC 3339 as aware, or `YYYY-MM-DD[T ]hh:mm:ss[.fff]` as naive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut last_error = match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => return Ok(Timestamp::Aware(dt)),
            Err(e) => e,
        };

        for format in NAIVE_FORMATS {
            match NaiveDateTime::parse_from_str(s, format) {
                Ok(dt) => return Ok(Timestamp::Naive(dt)),
                Err(e) => last_error = e,
            }
        }

        Err(AnnotationError::InvalidTimestamp {
            value: s.to_string(),
            source: last_error,
        })
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
