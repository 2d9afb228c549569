//! Time utility functions

use chrono::{DateTime, SecondsFormat, Utc};

/// Nanoseconds per millisecond
pub const NANOS_PER_MILLI: u64 = 1_000_000;

/// Convert nanoseconds since Unix epoch to whole milliseconds (truncating)
pub fn nanos_to_millis(nanos: u64) -> i64 {
    (nanos / NANOS_PER_MILLI) as i64
}

/// Convert milliseconds since Unix epoch to DateTime<Utc>, `None` when out of range
pub fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Convert milliseconds since Unix epoch to ISO 8601 string (millisecond precision, `Z` suffix)
pub fn millis_to_iso(millis: i64) -> Option<String> {
    millis_to_datetime(millis).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Parse ISO 8601 / RFC 3339 timestamp string to milliseconds since Unix epoch
pub fn iso_to_millis(ts: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.with_timezone(&Utc).timestamp_millis())
        .ok()
}
