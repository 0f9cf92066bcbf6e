//! Log-style timestamp serialization.
//!
//! Session logs write `2026-01-15T10:01:00.000Z`; output keeps that shape
//! instead of chrono's default, which drops zero fractions.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;

pub fn format(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn serialize<S>(timestamp: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match timestamp {
        Some(ts) => serializer.serialize_str(&format(ts)),
        None => serializer.serialize_none(),
    }
}
