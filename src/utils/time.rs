//! Time utilities

use chrono::{DateTime, Duration, Utc};

/// Get current UTC time
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// The instant `age` before `now`, saturating on overflow
pub fn cutoff(now: DateTime<Utc>, age: std::time::Duration) -> DateTime<Utc> {
    Duration::from_std(age)
        .ok()
        .and_then(|age| now.checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Milliseconds elapsed from `start` to `end`, never negative
pub fn elapsed_ms(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_milliseconds().max(0)
}

/// Format milliseconds as a human-readable string
pub fn format_milliseconds(ms: i64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let seconds = ms / 1000;
        let minutes = seconds / 60;
        let remaining_seconds = seconds % 60;
        format!("{}m {}s", minutes, remaining_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_milliseconds() {
        assert_eq!(format_milliseconds(500), "500ms");
        assert_eq!(format_milliseconds(1500), "1.50s");
        assert_eq!(format_milliseconds(65000), "1m 5s");
    }

    #[test]
    fn test_cutoff() {
        let now = now_utc();
        let before = cutoff(now, std::time::Duration::from_secs(60));
        assert_eq!(now - before, Duration::seconds(60));

        let far = cutoff(now, std::time::Duration::MAX);
        assert_eq!(far, DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_elapsed_ms_clamps() {
        let now = now_utc();
        assert_eq!(elapsed_ms(now, now + Duration::milliseconds(250)), 250);
        assert_eq!(elapsed_ms(now + Duration::seconds(1), now), 0);
    }
}
