//! Time utilities: the user's local "today" and wall-clock time.
//!
//! Day buckets and progress are computed in the user's timezone, not UTC, so
//! a task scheduled for today stays "today" until local midnight.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;

pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Local wall-clock time for a UTC instant.
pub fn local_now(now: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    now.with_timezone(&tz).naive_local()
}

pub fn local_today(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    local_now(now, tz).date()
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("invalid date '{s}': {e}"))
}

/// Fractional hours since midnight (10:30 → 10.5).
pub fn hours_of_day(t: NaiveTime) -> f64 {
    t.hour() as f64 + t.minute() as f64 / 60.0 + t.second() as f64 / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn chicago_evening_is_still_yesterday_in_utc_terms() {
        let tz = parse_timezone("America/Chicago").unwrap();
        // 2024-01-02 03:30 UTC is 2024-01-01 21:30 CST.
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 30, 0).unwrap();
        assert_eq!(local_today(now, tz), parse_date("2024-01-01").unwrap());
        assert_eq!(hours_of_day(local_now(now, tz).time()), 21.5);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(parse_timezone("Mars/Olympus").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }
}
