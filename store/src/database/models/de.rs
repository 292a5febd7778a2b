//! Field decoders shared by the models
//!
//! Documents written by older clients carry ISO timestamps without an offset
//! (`2024-01-01T10:00:00.123456`). Those are read as UTC. Offset-bearing
//! RFC 3339 values are converted to UTC.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer};

/// Parse an RFC 3339 timestamp, or a naive ISO one taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(at) = raw.parse::<DateTime<FixedOffset>>() {
        return Some(at.with_timezone(&Utc));
    }

    raw.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw)))
}

pub(crate) fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw))),
    }
}

/// Distinguish an explicit `null` from an absent field in partial updates.
///
/// Pair with `#[serde(default)]`: absent stays `None`, `null` becomes
/// `Some(None)` (clear the field), a value becomes `Some(Some(v))`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
