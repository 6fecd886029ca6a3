//! UTC timestamp formatting for persisted records.

use chrono::{DateTime, Utc};

/// `YYYY-MM-DDTHH:MM:SSZ`, lexicographically sortable.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// `YYYY-MM-DD`, the partition key of time-series collections.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_date(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_second_precision_utc() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
        assert_eq!(format_timestamp(at), "2025-01-15T10:00:00Z");
        assert_eq!(format_date(at), "2025-01-15");
    }

    #[test]
    fn string_order_matches_time_order() {
        let earlier = Utc.with_ymd_and_hms(2025, 3, 5, 9, 45, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 3, 5, 10, 5, 0).unwrap();
        assert!(format_timestamp(earlier) < format_timestamp(later));
    }
}
