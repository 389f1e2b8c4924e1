//! Serde helpers for record timestamps.
//!
//! Timestamps are written as RFC 3339 UTC with exactly six fractional digits,
//! so comparing the strings orders them chronologically. Filters such as
//! `createdAt[gte]=2026-01-01` rely on that.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Current time truncated to the stored precision.
#[must_use]
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::parse_from_rfc3339(&format(&now))
        .map_or(now, |parsed| parsed.with_timezone(&Utc))
}

/// Render `value` in the stored format.
#[must_use]
pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// `serialize_with` adapter.
pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(value))
}

/// `deserialize_with` adapter accepting any RFC 3339 timestamp.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}
