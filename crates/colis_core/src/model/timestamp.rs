//! Timestamp helpers shared by records and the modification log.
//!
//! Timestamps are stored as RFC 3339 text with millisecond precision, so
//! string order in SQL matches chronological order.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};

pub type Timestamp = DateTime<Utc>;

/// Naive layout written by earlier builds and by SQLite `CURRENT_TIMESTAMP`.
const LEGACY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Returns the current time truncated to the stored precision.
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(3)
}

/// Formats a timestamp the way it is persisted.
pub fn format_timestamp(value: &Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a persisted timestamp, accepting the legacy naive layout as UTC.
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(trimmed, LEGACY_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, now, parse_timestamp};

    #[test]
    fn formatted_timestamp_parses_back_unchanged() {
        let stamp = now();
        let text = format_timestamp(&stamp);
        assert!(text.ends_with('Z'));
        assert_eq!(parse_timestamp(&text), Some(stamp));
    }

    #[test]
    fn legacy_layout_is_read_as_utc() {
        let parsed = parse_timestamp("2024-03-01 08:15:42").expect("legacy layout");
        assert_eq!(format_timestamp(&parsed), "2024-03-01T08:15:42.000Z");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
