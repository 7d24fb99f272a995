//! Month-granularity date helpers
//!
//! All projection dates live on the first day of a month; these helpers keep
//! them there.

use chrono::{Datelike, NaiveDate};
use crate::error::{FinplanError, FinplanResult};

/// Year of the far-future sentinel used when no end date is given
pub const SENTINEL_YEAR: i32 = 2050;

/// Far-future end date used when a cash flow or container has none (2050-01-01)
pub fn far_future() -> NaiveDate {
    NaiveDate::from_ymd_opt(SENTINEL_YEAR, 1, 1).unwrap_or(NaiveDate::MAX)
}

/// Truncate a date to the first day of its month
pub fn month_start(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month chrono can represent
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after `date`
pub fn next_month(date: NaiveDate) -> FinplanResult<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(FinplanError::DateOutOfRange { date })
}

/// Whole months from `start` to `end`, ignoring the day of month
///
/// Negative when `end` precedes `start`.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end.year() as i64 - start.year() as i64) * 12 + (end.month() as i64 - start.month() as i64)
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(text: &str) -> FinplanResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|e| FinplanError::invalid(format!("malformed date '{}': {}", text, e)))
}
