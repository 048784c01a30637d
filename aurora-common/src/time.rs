//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a timestamp as RFC 3339 with millisecond precision and `Z` suffix
///
/// Used for every timestamp that leaves the process (JSON payloads, database rows)
/// so that lexical ordering matches chronological ordering.
pub fn to_rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp, normalizing to UTC
///
/// Returns `None` for malformed input rather than an error; callers treat
/// unparseable client timestamps as absent.
pub fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_to_rfc3339_uses_z_suffix() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 8, 9, 10).unwrap();
        assert_eq!(to_rfc3339(ts), "2024-03-05T08:09:10.000Z");
    }

    #[test]
    fn test_parse_rfc3339_normalizes_offset() {
        let parsed = parse_rfc3339("2024-03-05T10:09:10+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 5, 8, 9, 10).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_rejects_garbage() {
        assert!(parse_rfc3339("yesterday").is_none());
        assert!(parse_rfc3339("").is_none());
    }
}
