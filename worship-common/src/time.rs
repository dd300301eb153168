//! Timestamp utilities

use chrono::{DateTime, Duration, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current time as whole seconds since the Unix epoch
pub fn now_secs() -> i64 {
    now().timestamp()
}

/// Upper bound for configured lifetimes (100 years)
const MAX_HOURS: u64 = 24 * 365 * 100;

/// Convert hours to a chrono duration, capped at 100 years
pub fn hours(hours: u64) -> Duration {
    Duration::hours(hours.min(MAX_HOURS) as i64)
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
    fn test_now_secs_matches_now() {
        let secs = now_secs();
        let diff = (now().timestamp() - secs).abs();
        assert!(diff <= 1);
    }

    #[test]
    fn test_hours_one_day() {
        assert_eq!(hours(24), Duration::seconds(86_400));
    }

    #[test]
    fn test_hours_zero() {
        assert_eq!(hours(0), Duration::zero());
    }

    #[test]
    fn test_hours_saturates_on_huge_input() {
        // Should not panic on overflow-sized input
        let d = hours(u64::MAX);
        assert_eq!(d, Duration::hours(MAX_HOURS as i64));
    }
}
