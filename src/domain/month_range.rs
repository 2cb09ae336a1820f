use crate::utils::error::{ReportError, Result};
use chrono::{Datelike, Local, NaiveDate};
use std::fmt;

pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar-month window used to scope every report query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    month: u32,
    year: i32,
    start: NaiveDate,
    end: NaiveDate,
    days: u32,
}

impl MonthRange {
    pub fn new(month: i32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ReportError::validation(format!(
                "month {} is out of range, expected 1-12",
                month
            )));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ReportError::validation(format!(
                "year {} is out of range, expected {}-{}",
                year, MIN_YEAR, MAX_YEAR
            )));
        }

        let month = month as u32;
        let days = days_in_month(year, month);
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| ReportError::validation(format!("no such month {}.{}", month, year)))?;
        let end = NaiveDate::from_ymd_opt(year, month, days)
            .ok_or_else(|| ReportError::validation(format!("no such month {}.{}", month, year)))?;

        Ok(Self {
            month,
            year,
            start,
            end,
            days,
        })
    }

    /// Resolves against the local wall clock. Missing fields fall back one by one
    /// to the previous calendar month.
    pub fn resolve(month: Option<i32>, year: Option<i32>) -> Result<Self> {
        Self::resolve_at(month, year, Local::now().date_naive())
    }

    pub fn resolve_at(month: Option<i32>, year: Option<i32>, today: NaiveDate) -> Result<Self> {
        let (prev_month, prev_year) = previous_month(today);
        Self::new(month.unwrap_or(prev_month), year.unwrap_or(prev_year))
    }

    /// The month a given day falls into.
    pub fn containing(date: NaiveDate) -> Result<Self> {
        Self::new(date.month() as i32, date.year())
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn start(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end
    }
}

impl fmt::Display for MonthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start(), self.end())
    }
}

fn previous_month(today: NaiveDate) -> (i32, i32) {
    match today.month() {
        1 => (12, today.year() - 1),
        m => (m as i32 - 1, today.year()),
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}
