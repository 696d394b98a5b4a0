//! Local calendar-date helpers.
//!
//! Timestamps are stored as UTC epoch seconds, but the date dimension of the
//! daily rollups is the *user-local* calendar date. These helpers convert a
//! `YYYY-MM-DD` string into the `[00:00:00, 23:59:59]` epoch-second range of
//! that date in the local timezone.

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{Error, Result};

/// Resolve a local date string to its `[start_of_day, end_of_day]` epoch
/// range, inclusive on both ends.
pub fn day_bounds(date: &str) -> Result<(i64, i64)> {
    let day = parse_date(date)?;
    let start = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::Config(format!("invalid date: {}", date)))?;
    let end = day
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| Error::Config(format!("invalid date: {}", date)))?;
    Ok((local_timestamp(start), local_timestamp(end)))
}

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| Error::Config(format!("invalid date {:?}: {}", date, e)))
}

/// Today's local calendar date as `YYYY-MM-DD`.
pub fn local_today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// A local timestamp's calendar date as `YYYY-MM-DD`.
pub fn local_date_of(ts: DateTime<Local>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// The local calendar date containing an epoch timestamp, as `YYYY-MM-DD`.
pub fn local_date_of_epoch(ts: i64) -> String {
    let utc = DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default();
    local_date_of(utc.with_timezone(&Local))
}

/// Current UTC epoch seconds.
pub fn now_epoch() -> i64 {
    Utc::now().timestamp()
}

fn local_timestamp(naive: NaiveDateTime) -> i64 {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.timestamp(),
        // DST fold: take the earlier instant
        LocalResult::Ambiguous(first, _) => first.timestamp(),
        // DST gap: the wall-clock time does not exist locally; interpret as UTC
        LocalResult::None => naive.and_utc().timestamp(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_bounds_span_one_day() {
        let (start, end) = day_bounds("2026-01-15").unwrap();
        assert_eq!(end - start, 86_399);
    }

    #[test]
    fn test_day_bounds_consecutive_days_are_adjacent() {
        let (_, end) = day_bounds("2026-01-15").unwrap();
        let (next_start, _) = day_bounds("2026-01-16").unwrap();
        assert_eq!(next_start - end, 1);
    }

    #[test]
    fn test_invalid_date_rejected() {
        assert!(day_bounds("2026-13-40").is_err());
        assert!(day_bounds("yesterday").is_err());
    }

    #[test]
    fn test_local_date_of_epoch_roundtrips_day_bounds() {
        let (start, end) = day_bounds("2026-03-09").unwrap();
        assert_eq!(local_date_of_epoch(start), "2026-03-09");
        assert_eq!(local_date_of_epoch(end), "2026-03-09");
        assert_eq!(local_date_of_epoch(end + 1), "2026-03-10");
    }

    #[test]
    fn test_local_today_format() {
        let today = local_today();
        assert_eq!(today.len(), 10);
        assert!(parse_date(&today).is_ok());
    }
}
