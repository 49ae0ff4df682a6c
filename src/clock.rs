//! Clock abstraction for message timestamps
//!
//! `sentAt` is always stamped by the relay, never taken from the client.

use chrono::{DateTime, SecondsFormat, Utc};

/// Source of the current wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that always returns the same instant (for tests)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(fixed: DateTime<Utc>) -> Self {
        Self { fixed }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.fixed
    }
}

/// Format an instant as RFC 3339 UTC with millisecond precision
///
/// e.g. `2024-01-01T12:00:00.123Z`. Strings in this form sort chronologically.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_returns_fixed_time() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::new(at);
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_format_timestamp_millis_utc() {
        let at = Utc.timestamp_millis_opt(1_704_110_400_123).unwrap();
        assert_eq!(format_timestamp(at), "2024-01-01T12:00:00.123Z");
    }

    #[test]
    fn test_format_timestamp_pads_zero_millis() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(format_timestamp(at), "2024-01-01T12:00:00.000Z");
    }

    #[test]
    fn test_system_clock_parses_back() {
        let formatted = format_timestamp(SystemClock.now());
        assert!(DateTime::parse_from_rfc3339(&formatted).is_ok());
    }
}
