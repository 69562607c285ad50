//! ROC (Minguo) calendar dates as used in day headers: `115.02.13` is 2026-02-13.

use crate::error::WorkLogError;
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Offset between Gregorian and ROC years.
pub const ROC_OFFSET: i32 = 1911;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RocDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Month selector of the day view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthFilter {
    #[default]
    All,
    Month(u32),
}

impl RocDate {
    pub fn from_naive(date: NaiveDate) -> Self {
        Self {
            year: date.year() - ROC_OFFSET,
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year + ROC_OFFSET, self.month, self.day)
    }

    pub fn gregorian_year(&self) -> i32 {
        self.year + ROC_OFFSET
    }

    /// Converts a date picker value such as `2026-02-13`.
    pub fn from_iso(s: &str) -> Result<Self, WorkLogError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self::from_naive)
            .map_err(|_| WorkLogError::InvalidDate(s.to_string()))
    }

    /// Accepts either the ROC form or the ISO form.
    pub fn from_user_input(s: &str) -> Result<Self, WorkLogError> {
        if s.contains('-') {
            Self::from_iso(s)
        } else {
            s.parse()
        }
    }
}

impl fmt::Display for RocDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}.{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for RocDate {
    type Err = WorkLogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WorkLogError::InvalidDate(s.to_string());
        let mut parts = s.trim().split('.');
        let mut next = || -> Result<u32, WorkLogError> {
            parts
                .next()
                .and_then(|p| p.parse::<u32>().ok())
                .ok_or_else(invalid)
        };
        let (year, month, day) = (next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        let date = RocDate {
            year: i32::try_from(year).map_err(|_| invalid())?,
            month,
            day,
        };
        date.to_naive().map(|_| date).ok_or_else(invalid)
    }
}

/// ROC year of a stored date string, read from its first component only.
pub fn roc_year_of(date: &str) -> Option<i32> {
    date.split('.').next()?.trim().parse().ok()
}

/// Month component of a stored date string (`"115.02.13"` -> `"02"`).
pub fn month_part_of(date: &str) -> Option<&str> {
    date.split('.').nth(1)
}

impl MonthFilter {
    pub fn matches(&self, month_part: &str) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Month(m) => month_part == format!("{m:02}"),
        }
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => f.write_str("all"),
            MonthFilter::Month(m) => write!(f, "{m:02}"),
        }
    }
}

impl FromStr for MonthFilter {
    type Err = WorkLogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(MonthFilter::All);
        }
        match s.parse::<u32>() {
            Ok(m @ 1..=12) => Ok(MonthFilter::Month(m)),
            _ => Err(WorkLogError::InvalidDate(s.to_string())),
        }
    }
}

/// Date for a freshly added day.
///
/// Uses the viewed year and month when set. When the viewed month is not the
/// current month the day defaults to the 1st, otherwise to today's day.
pub fn default_new_day_date(today: NaiveDate, view_year: Option<i32>, month: MonthFilter) -> RocDate {
    let year = view_year.unwrap_or(today.year());
    let (month, mut day) = match month {
        MonthFilter::All => (today.month(), today.day()),
        MonthFilter::Month(m) if year == today.year() && m == today.month() => (m, today.day()),
        MonthFilter::Month(m) => (m, 1),
    };
    // Today's day may not exist in the viewed month (29th of February).
    while day > 1 && NaiveDate::from_ymd_opt(year, month, day).is_none() {
        day -= 1;
    }
    RocDate {
        year: year - ROC_OFFSET,
        month,
        day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_and_displays_roc_dates() {
        let date: RocDate = "115.02.13".parse().unwrap();
        assert_eq!(date, RocDate { year: 115, month: 2, day: 13 });
        assert_eq!(date.to_string(), "115.02.13");
        assert_eq!(date.to_naive(), Some(d(2026, 2, 13)));
        assert_eq!(RocDate::from_naive(d(2026, 2, 13)), date);
    }

    #[test]
    fn rejects_impossible_dates() {
        for bad in ["115.02.30", "115.13.01", "115.02", "115.02.13.1", "abc", ""] {
            assert!(bad.parse::<RocDate>().is_err(), "{bad}");
        }
    }

    #[test]
    fn converts_date_picker_values() {
        assert_eq!(RocDate::from_iso("2026-02-13").unwrap().to_string(), "115.02.13");
        assert_eq!(
            RocDate::from_user_input("2025-12-01").unwrap().to_string(),
            "114.12.01"
        );
        assert_eq!(RocDate::from_user_input("114.12.01").unwrap().year, 114);
        assert!(RocDate::from_iso("2026-02-31").is_err());
    }

    #[test]
    fn month_filter_parsing_and_matching() {
        assert_eq!("all".parse::<MonthFilter>().unwrap(), MonthFilter::All);
        assert_eq!("02".parse::<MonthFilter>().unwrap(), MonthFilter::Month(2));
        assert!("13".parse::<MonthFilter>().is_err());
        assert!(MonthFilter::Month(2).matches("02"));
        assert!(!MonthFilter::Month(2).matches("2"));
        assert_eq!(MonthFilter::Month(7).to_string(), "07");
    }

    #[test]
    fn new_day_defaults_follow_the_view() {
        let today = d(2026, 2, 13);
        assert_eq!(
            default_new_day_date(today, None, MonthFilter::All).to_string(),
            "115.02.13"
        );
        assert_eq!(
            default_new_day_date(today, Some(2026), MonthFilter::Month(2)).to_string(),
            "115.02.13"
        );
        assert_eq!(
            default_new_day_date(today, Some(2026), MonthFilter::Month(1)).to_string(),
            "115.01.01"
        );
        assert_eq!(
            default_new_day_date(today, Some(2025), MonthFilter::Month(2)).to_string(),
            "114.02.01"
        );
    }

    #[test]
    fn new_day_clamps_to_month_length() {
        let leap_day = d(2024, 2, 29);
        assert_eq!(
            default_new_day_date(leap_day, Some(2025), MonthFilter::All).to_string(),
            "114.02.28"
        );
    }

    #[test]
    fn date_parts() {
        assert_eq!(roc_year_of("115.02.13"), Some(115));
        assert_eq!(roc_year_of("garbage"), None);
        assert_eq!(month_part_of("115.02.13"), Some("02"));
        assert_eq!(month_part_of("115"), None);
    }
}
