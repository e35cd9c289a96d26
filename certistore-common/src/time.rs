//! Timestamp utilities
//!
//! Timestamps are persisted as Unix epoch milliseconds (UTC).

use chrono::{DateTime, TimeZone, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert a timestamp to Unix epoch milliseconds
pub fn to_millis(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp_millis()
}

/// Convert Unix epoch milliseconds back to a timestamp
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_millis_preserves_millisecond_precision() {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 0).unwrap()
            + chrono::Duration::milliseconds(250);
        let millis = to_millis(timestamp);
        assert_eq!(millis % 1000, 250);
        assert_eq!(from_millis(millis), Some(timestamp));
    }

    #[test]
    fn test_from_millis_epoch() {
        let epoch = from_millis(0).unwrap();
        assert_eq!(epoch.timestamp(), 0);
    }

    #[test]
    fn test_from_millis_out_of_range() {
        assert!(from_millis(i64::MAX).is_none());
    }
}
