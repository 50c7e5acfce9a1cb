//! Calendar date helpers
//!
//! Tasks, projects and goals carry plain calendar dates (no time zone); these
//! helpers parse them from user input and do the week/month arithmetic the
//! calendar and timeline projections need.

use crate::error::{Result, SprintError};
use chrono::{Datelike, Days, Duration, NaiveDate, Utc};

/// Parse an ISO calendar date (`YYYY-MM-DD`)
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        SprintError::Validation(format!(
            "Invalid date '{}'. Expected format YYYY-MM-DD",
            input
        ))
    })
}

/// Parse an optional date argument where `none` clears the value
pub fn parse_optional_date(input: &str) -> Result<Option<NaiveDate>> {
    match input.trim().to_lowercase().as_str() {
        "" | "none" => Ok(None),
        _ => parse_date(input).map(Some),
    }
}

/// Parse a month (`YYYY-MM`) into its first day
pub fn parse_month(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", input.trim()), "%Y-%m-%d").map_err(|_| {
        SprintError::Validation(format!("Invalid month '{}'. Expected format YYYY-MM", input))
    })
}

/// Whole days from `from` to `to` (negative when `to` is earlier)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let first = start_of_month(date);
    let next_month = first
        .checked_add_months(chrono::Months::new(1))
        .unwrap_or(first);
    next_month.pred_opt().unwrap_or(first)
}

/// The Sunday on or before `date`
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_sunday() as u64;
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// The Saturday on or after `date`
pub fn end_of_week(date: NaiveDate) -> NaiveDate {
    let forward = 6 - date.weekday().num_days_from_sunday() as u64;
    date.checked_add_days(Days::new(forward)).unwrap_or(date)
}

/// Today's date in UTC
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// A point `days` days before now, used for "recent" windows
pub fn days_ago(days: i64) -> chrono::DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-03-09").unwrap(), d(2025, 3, 9));
        assert_eq!(parse_date(" 2025-03-09 ").unwrap(), d(2025, 3, 9));
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("03/09/2025").is_err());
    }

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(parse_optional_date("none").unwrap(), None);
        assert_eq!(
            parse_optional_date("2025-01-02").unwrap(),
            Some(d(2025, 1, 2))
        );
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-02").unwrap(), d(2025, 2, 1));
        assert!(parse_month("2025-13").is_err());
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(end_of_month(d(2024, 2, 10)), d(2024, 2, 29));
        assert_eq!(end_of_month(d(2025, 12, 31)), d(2025, 12, 31));
        assert_eq!(start_of_month(d(2025, 12, 31)), d(2025, 12, 1));
    }

    #[test]
    fn test_week_bounds_start_on_sunday() {
        // 2025-01-01 is a Wednesday
        assert_eq!(start_of_week(d(2025, 1, 1)), d(2024, 12, 29));
        assert_eq!(end_of_week(d(2025, 1, 1)), d(2025, 1, 4));
        // Sunday maps to itself
        assert_eq!(start_of_week(d(2024, 12, 29)), d(2024, 12, 29));
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between(d(2025, 1, 1), d(2025, 1, 11)), 10);
        assert_eq!(days_between(d(2025, 1, 11), d(2025, 1, 1)), -10);
    }
}
