//! Coarse relative-age formatting for post timestamps.

use chrono::{DateTime, Utc};

/// Format the age of an event as a coarse human-readable string.
///
/// Whole minutes are floored; under an hour the label is in minutes
/// (including "0 minutes ago"), under a day in hours, otherwise in days.
/// Always the plural form. An event in the future yields a negative-minute
/// label; callers wanting a "Just now" fallback must check for a missing
/// timestamp upstream.
#[must_use]
pub fn format_age(event: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - event).num_minutes();
    if minutes < 60 {
        return format!("{minutes} minutes ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} hours ago");
    }
    let days = hours / 24;
    format!("{days} days ago")
}

/// Parse a server `created_datetime` string (RFC 3339) into a UTC timestamp.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_zero_elapsed() {
        assert_eq!(format_age(at(0), at(0)), "0 minutes ago");
        // Sub-minute elapsed still floors to zero
        assert_eq!(format_age(at(0), at(59)), "0 minutes ago");
    }

    #[test]
    fn test_minute_boundaries() {
        assert_eq!(format_age(at(0), at(59 * 60)), "59 minutes ago");
        assert_eq!(format_age(at(0), at(60 * 60)), "1 hours ago");
    }

    #[test]
    fn test_hour_boundaries() {
        assert_eq!(format_age(at(0), at(23 * 3600 + 59 * 60)), "23 hours ago");
        assert_eq!(format_age(at(0), at(24 * 3600)), "1 days ago");
    }

    #[test]
    fn test_plural_form_for_one() {
        assert_eq!(format_age(at(0), at(60)), "1 minutes ago");
    }

    #[test]
    fn test_large_elapsed() {
        assert_eq!(format_age(at(0), at(40 * 24 * 3600)), "40 days ago");
    }

    #[test]
    fn test_future_event_not_guarded() {
        assert_eq!(format_age(at(120), at(0)), "-2 minutes ago");
    }

    #[test]
    fn test_parse_timestamp() {
        let parsed = parse_timestamp("2024-01-01T12:00:00Z").unwrap();
        assert_eq!(parsed.timestamp(), 1_704_110_400);
        // Offset timestamps normalize to UTC
        let offset = parse_timestamp("2024-01-01T13:00:00+01:00").unwrap();
        assert_eq!(offset, parsed);
        assert!(parse_timestamp("yesterday").is_none());
    }
}
