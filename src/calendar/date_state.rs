use std::ops::RangeInclusive;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::consts::{
    CENTURY_CYCLE, DAY_WEEK_NUMBER, DAYS_IN_MONTH, FEBRUARY, FEBRUARY_DAYS_LEAP, GREGORIAN_CYCLE,
    HOST_DATE_SEPARATOR, LEAP_YEAR_CYCLE, MAX_FUTURE_YEARS, MONTHS_PER_YEAR,
};

/// `DD/MM/YYYY`, day 01-31 and month 01-12, zero padded. The day is not
/// checked against the month's length.
#[allow(clippy::expect_used)]
static HOST_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[1-9]|[12][0-9]|3[01])/(0[1-9]|1[0-2])/([0-9]{4})$")
        .expect("host date pattern compiles")
});

/// A date read from a host field. `month` is 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostDate {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

/// Parses a host field value of the form `DD/MM/YYYY`.
///
/// `31/02/2024` is accepted: only the digit ranges are checked.
pub fn parse_host_date(text: &str) -> Option<HostDate> {
    let captures = HOST_DATE.captures(text)?;
    let day = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let month = captures.get(2)?.as_str().parse::<u32>().ok()?;
    let year = captures.get(3)?.as_str().parse::<i32>().ok()?;
    Some(HostDate {
        day,
        month: month - 1,
        year,
    })
}

/// Formats a committed date the way it is written back into the host field:
/// `{day}/{month}/{year}` with a 1-indexed month and no zero padding.
pub fn format_host_date(day: u32, month: u32, year: i32) -> String {
    format!(
        "{day}{HOST_DATE_SEPARATOR}{}{HOST_DATE_SEPARATOR}{year}",
        month + 1
    )
}

pub const fn is_leap_year(year: i32) -> bool {
    (year % LEAP_YEAR_CYCLE == 0 && year % CENTURY_CYCLE != 0) || (year % GREGORIAN_CYCLE == 0)
}

/// Days in a 0-indexed month, or `None` if `month` is 12 or more.
pub const fn days_in_month(year: i32, month: u32) -> Option<u32> {
    if month >= MONTHS_PER_YEAR {
        return None;
    }

    if month == FEBRUARY && is_leap_year(year) {
        Some(FEBRUARY_DAYS_LEAP)
    } else {
        Some(DAYS_IN_MONTH[month as usize])
    }
}

/// Column of the 1st of a 0-indexed month in a Monday-first week, which is
/// also the number of blank cells before it.
///
/// `None` for a month of 12 or more, or a year chrono cannot represent.
pub fn first_weekday_offset(year: i32, month: u32) -> Option<u32> {
    if month >= MONTHS_PER_YEAR {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month + 1, 1)
        .map(|date| DAY_WEEK_NUMBER[date.weekday().num_days_from_sunday() as usize])
}

/// Month and year the calendar is showing, relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateState {
    today: NaiveDate,
    current_year: i32,
    current_month: u32,
    selected_year: i32,
    selected_month: u32,
}

impl DateState {
    /// Starts on today's month.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            current_year: today.year(),
            current_month: today.month0(),
            selected_year: today.year(),
            selected_month: today.month0(),
        }
    }

    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    pub const fn current_year(&self) -> i32 {
        self.current_year
    }

    pub const fn current_month(&self) -> u32 {
        self.current_month
    }

    pub const fn selected_year(&self) -> i32 {
        self.selected_year
    }

    pub const fn selected_month(&self) -> u32 {
        self.selected_month
    }

    /// Selects a 0-indexed month. Out-of-range values are ignored.
    /// A month earlier than the current one is kept until the next
    /// [`DateState::clamp_selection`].
    pub fn select_month(&mut self, month: u32) -> bool {
        if month >= MONTHS_PER_YEAR {
            return false;
        }
        self.selected_month = month;
        true
    }

    pub fn select_year(&mut self, year: i32) {
        self.selected_year = year;
    }

    /// Takes month and year from a `DD/MM/YYYY` host value. Anything else
    /// leaves the selection untouched and returns `false`.
    pub fn parse_host_value(&mut self, text: &str) -> bool {
        let Some(date) = parse_host_date(text) else {
            return false;
        };
        self.selected_month = date.month;
        self.selected_year = date.year;
        true
    }

    /// Moves a past month of the current year forward to the current month.
    /// Returns `true` if the selection changed.
    pub fn clamp_selection(&mut self) -> bool {
        if self.selected_year == self.current_year && self.selected_month < self.current_month {
            self.selected_month = self.current_month;
            return true;
        }
        false
    }

    // selected_month is kept below MONTHS_PER_YEAR, so only an
    // unrepresentable year can fall back to zero here
    pub fn first_weekday_offset(&self) -> u32 {
        first_weekday_offset(self.selected_year, self.selected_month).unwrap_or_default()
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.selected_year, self.selected_month).unwrap_or_default()
    }

    /// True if `day` of the selected month is strictly before today.
    pub fn is_before_today(&self, day: u32) -> bool {
        NaiveDate::from_ymd_opt(self.selected_year, self.selected_month + 1, day)
            .is_some_and(|date| date < self.today)
    }

    /// Months offered by the month selector: past months of the current year
    /// are left out.
    pub const fn selectable_months(&self) -> RangeInclusive<u32> {
        let start = if self.selected_year == self.current_year {
            self.current_month
        } else {
            0
        };
        start..=MONTHS_PER_YEAR - 1
    }

    /// Years offered by the year selector. `future_years` is clamped to
    /// `0..=MAX_FUTURE_YEARS` and the end saturates at `i32::MAX`.
    pub fn selectable_years(&self, future_years: i32) -> RangeInclusive<i32> {
        let future_years = future_years.clamp(0, MAX_FUTURE_YEARS);
        self.current_year..=self.current_year.saturating_add(future_years)
    }

    /// Host field text for `day` of the selected month.
    pub fn format_day(&self, day: u32) -> String {
        format_host_date(day, self.selected_month, self.selected_year)
    }
}
