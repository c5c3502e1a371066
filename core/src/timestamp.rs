//! Date-time values as Codecov sends them.
//!
//! The API is inconsistent about timestamp layouts: some fields carry RFC 3339
//! strings, others drop the `T` separator or the offset entirely. `Timestamp`
//! tries every layout seen in the wild, in a fixed order, and always stores
//! the result in UTC. A missing offset means UTC.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TimestampError;

/// How one layout turns text into an instant.
#[derive(Debug, Clone, Copy)]
enum Layout {
    /// RFC 3339 with an explicit offset, e.g. `2020-05-10T17:55:29.623184+00:00`.
    Rfc3339,
    /// No offset in the text; the value is taken as UTC.
    AssumeUtc(&'static str),
    /// Explicit numeric offset; a trailing `Z` is read as `+00:00`.
    WithOffset(&'static str),
}

/// Tried first to last; the first layout that parses wins.
const LAYOUTS: [Layout; 4] = [
    Layout::Rfc3339,
    Layout::AssumeUtc("%Y-%m-%dT%H:%M:%S%.f"),
    Layout::AssumeUtc("%Y-%m-%d %H:%M:%S%.f"),
    Layout::WithOffset("%Y-%m-%d %H:%M:%S%.f%:z"),
];

impl Layout {
    fn parse(self, input: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        match self {
            Layout::Rfc3339 => DateTime::parse_from_rfc3339(input).map(|t| t.with_timezone(&Utc)),
            Layout::AssumeUtc(format) => {
                NaiveDateTime::parse_from_str(input, format).map(|naive| naive.and_utc())
            }
            Layout::WithOffset(format) => {
                let input = match input.strip_suffix('Z') {
                    Some(head) => Cow::Owned(format!("{head}+00:00")),
                    None => Cow::Borrowed(input),
                };
                DateTime::parse_from_str(&input, format).map(|t| t.with_timezone(&Utc))
            }
        }
    }
}

/// An instant normalized to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Parse `input` against each known layout in order.
    ///
    /// On failure the error carries the last layout's complaint.
    pub fn parse(input: &str) -> Result<Self, TimestampError> {
        let mut outcome = LAYOUTS[0].parse(input);
        for layout in &LAYOUTS[1..] {
            if outcome.is_ok() {
                break;
            }
            outcome = layout.parse(input);
        }
        outcome.map(Self).map_err(|source| TimestampError {
            input: input.to_string(),
            source,
        })
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct TimestampVisitor;

impl Visitor<'_> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a date-time string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Timestamp::parse(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(TimestampVisitor)
    }
}
