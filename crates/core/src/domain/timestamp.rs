// Timestamp Codec
//
// Lenient on input (ordered fallback chain), strict on output (RFC 3339, UTC,
// nanosecond fractional seconds).

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::domain::error::{DomainError, Result};

/// Token emitted for an absent timestamp (and accepted on input)
pub const NULL_TOKEN: &str = "null";

/// RFC 3339 shape with a colon-less numeric offset (`+0000`)
const COMPACT_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Space-delimited `date time offset` shape; the trailing zone abbreviation
/// is stripped before parsing
const LEGACY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %z";

/// A point in time decoded from the remote service.
///
/// Stored in UTC. Whatever layout it was decoded from, it is always encoded
/// back out in canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Canonical encoding: `2024-05-01T12:34:56.789000000Z`
    pub fn to_canonical(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical())
    }
}

/// Input layouts accepted by [`decode`], in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// RFC 3339 with or without fractional seconds (`Z` or `+hh:mm` offset)
    Rfc3339,
    /// RFC 3339 body with a `+hhmm` offset
    CompactOffset,
    /// `2006-01-02 15:04:05.000 -0700 MST`
    Legacy,
}

const FALLBACK_CHAIN: [Layout; 3] = [Layout::Rfc3339, Layout::CompactOffset, Layout::Legacy];

impl Layout {
    fn parse(self, raw: &str) -> Option<DateTime<FixedOffset>> {
        match self {
            Layout::Rfc3339 => DateTime::parse_from_rfc3339(raw).ok(),
            Layout::CompactOffset => DateTime::parse_from_str(raw, COMPACT_OFFSET_FORMAT).ok(),
            Layout::Legacy => parse_legacy(raw),
        }
    }
}

fn parse_legacy(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(parsed) = DateTime::parse_from_str(raw, LEGACY_FORMAT) {
        return Some(parsed);
    }

    // Drop the zone abbreviation (MST, UTC, ...); the numeric offset is authoritative
    let (head, zone) = raw.rsplit_once(' ')?;
    let is_zone_token = |c: char| c.is_ascii_alphanumeric() || c == '+' || c == '-';
    if zone.is_empty() || !zone.chars().all(is_zone_token) {
        return None;
    }
    DateTime::parse_from_str(head, LEGACY_FORMAT).ok()
}

/// Decode a raw timestamp string.
///
/// Empty input and the `null` token decode to `None`. Anything else must match
/// one of the fallback layouts, otherwise `MalformedTimestamp` is returned with
/// the offending string.
pub fn decode(raw: &str) -> Result<Option<Timestamp>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NULL_TOKEN {
        return Ok(None);
    }

    FALLBACK_CHAIN
        .iter()
        .find_map(|layout| layout.parse(trimmed))
        .map(|parsed| Some(Timestamp(parsed.with_timezone(&Utc))))
        .ok_or_else(|| DomainError::MalformedTimestamp {
            raw: raw.to_string(),
        })
}

/// Encode an optional timestamp: canonical form, or the `null` token.
pub fn encode(value: Option<&Timestamp>) -> String {
    value.map_or_else(|| NULL_TOKEN.to_string(), Timestamp::to_canonical)
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        decode(&raw)
            .map_err(serde::de::Error::custom)?
            .ok_or_else(|| serde::de::Error::custom("timestamp is absent"))
    }
}

/// Serde adapter for `Option<Timestamp>` fields.
///
/// Missing, `null`, `""` and `"null"` all decode to `None`; `None` encodes as JSON null.
pub mod optional {
    use super::{decode, Timestamp};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_canonical()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => decode(&raw).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
