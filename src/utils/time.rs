//! Millisecond timestamps.
//!
//! Records carry timestamps as milliseconds since the Unix epoch. CSV export
//! renders them as ISO-8601 with millisecond precision (`2024-01-01T00:00:00.000Z`).

use chrono::{DateTime, SecondsFormat, Utc};

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Renders a millisecond timestamp as ISO-8601 UTC.
///
/// Out-of-range values render as the empty string.
pub fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

/// Parses an RFC 3339 / ISO-8601 timestamp into milliseconds.
pub fn parse_timestamp(text: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|dt| dt.timestamp_millis())
}
