//! Timestamps for task records.
//!
//! Timestamps are RFC 3339 strings in UTC with millisecond precision, e.g.
//! `2025-01-01T09:30:00.000Z`.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};

/// Format an instant the way tasks store it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp, accepting any RFC 3339 offset.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Timestamp for a new record.
pub fn now() -> String {
    format_timestamp(Utc::now())
}

/// Timestamp for a mutation of a record last touched at `previous`.
///
/// Always strictly later than `previous` when it parses: if the wall clock
/// has not moved past it (same millisecond, or clock skew) the result is
/// `previous + 1ms`.
pub fn refreshed(previous: &str) -> String {
    // compare at stored precision
    let now = Utc::now().trunc_subsecs(3);
    match parse_timestamp(previous) {
        Some(prev) if now <= prev => format_timestamp(prev + Duration::milliseconds(1)),
        _ => format_timestamp(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_has_millis_and_z() {
        let at = DateTime::parse_from_rfc3339("2025-01-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(at), "2025-01-01T09:30:00.000Z");
    }

    #[test]
    fn test_refreshed_advances_past_future_timestamp() {
        let future = format_timestamp(Utc::now() + Duration::days(1));
        let next = refreshed(&future);
        assert!(parse_timestamp(&next).unwrap() > parse_timestamp(&future).unwrap());
    }

    #[test]
    fn test_refreshed_advances_in_same_millisecond() {
        let stamp = now();
        let next = refreshed(&stamp);
        assert!(parse_timestamp(&next).unwrap() > parse_timestamp(&stamp).unwrap());
    }

    #[test]
    fn test_refreshed_advances_repeatedly() {
        let mut last = now();
        for _ in 0..50 {
            let next = refreshed(&last);
            assert!(next > last, "{} did not advance past {}", next, last);
            last = next;
        }
    }

    #[test]
    fn test_refreshed_with_unparseable_previous() {
        let next = refreshed("yesterday");
        assert!(parse_timestamp(&next).is_some());
    }
}
