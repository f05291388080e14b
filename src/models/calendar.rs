//! Work-week calendar primitives.
//!
//! The planning horizon is one Monday–Friday week. Weekends are never
//! scheduled. Helpers here anchor arbitrary dates to their week and count
//! business days, which the demand translator needs.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A schedulable day of the work week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl WorkDay {
    /// All work days, Monday first.
    pub const ALL: [WorkDay; 5] = [
        WorkDay::Monday,
        WorkDay::Tuesday,
        WorkDay::Wednesday,
        WorkDay::Thursday,
        WorkDay::Friday,
    ];

    /// Zero-based offset from Monday.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Maps a chrono weekday; `None` for Saturday and Sunday.
    pub fn from_weekday(weekday: Weekday) -> Option<Self> {
        match weekday {
            Weekday::Mon => Some(Self::Monday),
            Weekday::Tue => Some(Self::Tuesday),
            Weekday::Wed => Some(Self::Wednesday),
            Weekday::Thu => Some(Self::Thursday),
            Weekday::Fri => Some(Self::Friday),
            Weekday::Sat | Weekday::Sun => None,
        }
    }

    /// The chrono weekday.
    pub fn weekday(self) -> Weekday {
        match self {
            Self::Monday => Weekday::Mon,
            Self::Tuesday => Weekday::Tue,
            Self::Wednesday => Weekday::Wed,
            Self::Thursday => Weekday::Thu,
            Self::Friday => Weekday::Fri,
        }
    }

    /// Work day of a date; `None` on weekends.
    pub fn of(date: NaiveDate) -> Option<Self> {
        Self::from_weekday(date.weekday())
    }

    /// Calendar date of this day in the week starting at `monday`.
    pub fn date_in_week(self, monday: NaiveDate) -> NaiveDate {
        monday + Duration::days(self.index() as i64)
    }
}

impl fmt::Display for WorkDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Monday of the week containing `date`.
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Monday–Friday dates of a month, in order.
///
/// Returns an empty list for an invalid month.
pub fn business_days_in_month(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .filter(|d| WorkDay::of(*d).is_some())
        .collect()
}

/// Distinct ISO weeks `(iso_year, week)` touched by a month's business days.
pub fn iso_weeks_in_month(year: i32, month: u32) -> Vec<(i32, u32)> {
    let mut weeks: Vec<(i32, u32)> = business_days_in_month(year, month)
        .into_iter()
        .map(|d| (d.iso_week().year(), d.iso_week().week()))
        .collect();
    weeks.dedup();
    weeks
}
