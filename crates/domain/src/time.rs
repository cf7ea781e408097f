//! Time and timestamp helpers.

use chrono::{DateTime, TimeDelta, Utc};

/// UTC timestamp used for event times, debounce deadlines, `last_changed`, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Build a [`TimeDelta`] from milliseconds, saturating on overflow.
#[must_use]
pub fn millis(ms: u64) -> TimeDelta {
    i64::try_from(ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .unwrap_or(TimeDelta::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_convert_millis() {
        assert_eq!(millis(3_000), TimeDelta::seconds(3));
    }
}
