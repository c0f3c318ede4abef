//! Timestamps as stored on disk.
//!
//! Files written by older trackers hold local wall-clock time without a UTC
//! offset (`2025-03-10T18:00:00.123456`). Those are read as local time; RFC
//! 3339 timestamps with an offset are converted to local time.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{de, Deserialize, Deserializer};

/// Parses an RFC 3339 timestamp, an offset-less local date-time, or a bare
/// date (taken as local midnight).
pub fn parse_local(text: &str) -> Option<DateTime<Local>> {
    let text = text.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.with_timezone(&Local));
    }
    let naive = text
        .parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            text.parse::<NaiveDate>()
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    Local.from_local_datetime(&naive).earliest()
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_local(&text).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", text)))
}

pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Local>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(text) => parse_local(&text)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", text))),
        None => Ok(None),
    }
}
