//! Wall-clock abstraction and timestamp parsing.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Seconds in one day.
pub const SEC_PER_DAY: u64 = 86_400;

/// Source of the current wall-clock time, in whole seconds since the Unix
/// epoch.
///
/// The metrics code reads time only through this trait so that skew
/// detection and progress extrapolation can be tested deterministically.
/// Implementations may be backed by a non-monotonic clock; callers are
/// expected to tolerate backward steps.
pub trait Clock: Send + Sync {
    /// Current time in seconds since the Unix epoch.
    fn now(&self) -> u64;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        let secs = Utc::now().timestamp();
        if secs < 0 { 0 } else { secs as u64 }
    }
}

/// Parse a coordinator timestamp string into seconds since the Unix epoch.
///
/// Accepts RFC 3339 (`2024-05-01T12:00:00Z`) and the bare
/// `YYYY-MM-DDTHH:MM:SS` form, which is read as UTC. Returns `None` for
/// anything else; callers fall back to their documented defaults.
pub fn parse_timestamp(s: &str) -> Option<u64> {
    let epoch = if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        t.timestamp()
    } else if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        t.and_utc().timestamp()
    } else {
        return None;
    };

    if epoch < 0 { None } else { Some(epoch as u64) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_current() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now() > 1_577_836_800);
    }

    #[test]
    fn test_parse_rfc3339() {
        assert_eq!(parse_timestamp("1970-01-01T00:00:10Z"), Some(10));
        assert_eq!(
            parse_timestamp("2024-05-01T12:00:00+00:00"),
            Some(1_714_564_800)
        );
    }

    #[test]
    fn test_parse_bare_datetime_as_utc() {
        assert_eq!(parse_timestamp("1970-01-01T00:01:00"), Some(60));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not a time"), None);
        assert_eq!(parse_timestamp("1969-12-31T23:59:59Z"), None);
    }
}
