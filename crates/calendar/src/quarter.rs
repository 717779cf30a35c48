//! Fiscal quarters and their Taiwan disclosure windows.
//!
//! Listed companies in Taiwan publish quarterly statements on a fixed legal
//! schedule. Aligning report data to the window in which it became public
//! keeps backtests free of look-ahead bias:
//!
//! | quarter | window (inclusive)              |
//! |---------|---------------------------------|
//! | Q1      | `Y-05-16` .. `Y-08-14`          |
//! | Q2      | `Y-08-15` .. `Y-11-14`          |
//! | Q3      | `Y-11-15` .. `(Y+1)-03-31`      |
//! | Q4      | `(Y+1)-04-01` .. `(Y+1)-05-15`  |
//!
//! The four windows tile the calendar, so every date belongs to exactly one
//! quarter.

use std::{fmt, str::FromStr};

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tamsui_primitives::Date;

use crate::CalendarError;

/// A fiscal quarter, written `{year}-Q{n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FiscalQuarter {
    year: i32,
    quarter: u8,
}

impl FiscalQuarter {
    /// Create a quarter.
    ///
    /// # Errors
    /// Returns [`CalendarError::InvalidQuarterLabel`] when `quarter` is not in
    /// `1..=4` or `year` is outside `0..=9999`.
    pub fn new(year: i32, quarter: u8) -> Result<Self, CalendarError> {
        if !(1..=4).contains(&quarter) || !(0..=9999).contains(&year) {
            return Err(CalendarError::InvalidQuarterLabel(format!("{year}-Q{quarter}")));
        }
        Ok(Self { year, quarter })
    }

    /// Fiscal year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Quarter number in `1..=4`.
    #[must_use]
    pub const fn quarter(&self) -> u8 {
        self.quarter
    }

    /// The following quarter.
    #[must_use]
    pub const fn next(&self) -> Self {
        if self.quarter == 4 {
            Self { year: self.year + 1, quarter: 1 }
        } else {
            Self { year: self.year, quarter: self.quarter + 1 }
        }
    }

    /// The disclosure window of this quarter.
    #[must_use]
    pub fn window(&self) -> DisclosureWindow {
        let y = self.year;
        let (start, end) = match self.quarter {
            1 => (ymd(y, 5, 16), ymd(y, 8, 14)),
            2 => (ymd(y, 8, 15), ymd(y, 11, 14)),
            3 => (ymd(y, 11, 15), ymd(y + 1, 3, 31)),
            _ => (ymd(y + 1, 4, 1), ymd(y + 1, 5, 15)),
        };
        DisclosureWindow { start, end }
    }
}

impl fmt::Display for FiscalQuarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-Q{}", self.year, self.quarter)
    }
}

impl FromStr for FiscalQuarter {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarError::InvalidQuarterLabel(s.to_string());

        let (year, quarter) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let quarter = match quarter {
            "Q1" => 1,
            "Q2" => 2,
            "Q3" => 3,
            "Q4" => 4,
            _ => return Err(invalid()),
        };
        let year = year.parse::<i32>().map_err(|_| invalid())?;

        Self::new(year, quarter)
    }
}

impl TryFrom<String> for FiscalQuarter {
    type Error = CalendarError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FiscalQuarter> for String {
    fn from(q: FiscalQuarter) -> Self {
        q.to_string()
    }
}

/// Inclusive date range during which a quarter's statements are published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisclosureWindow {
    /// First day of the window.
    pub start: Date,
    /// Last day of the window.
    pub end: Date,
}

impl DisclosureWindow {
    /// Whether `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days in the window.
    #[must_use]
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every calendar day in the window, in order.
    pub fn days(&self) -> impl Iterator<Item = Date> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

/// Map a quarter label such as `2013-Q1` to its disclosure window.
///
/// # Errors
/// Returns [`CalendarError::InvalidQuarterLabel`] if the label does not parse.
pub fn quarter_to_window(label: &str) -> Result<DisclosureWindow, CalendarError> {
    Ok(label.parse::<FiscalQuarter>()?.window())
}

/// The fiscal quarter whose disclosure window contains `date`.
///
/// January to March belong to the previous year's Q3, and April 1 to May 15
/// to the previous year's Q4.
#[must_use]
pub fn date_to_quarter(date: Date) -> FiscalQuarter {
    let (y, m, d) = (date.year(), date.month(), date.day());
    let (year, quarter) = match (m, d) {
        (5, 16..) | (6 | 7, _) | (8, ..=14) => (y, 1),
        (8, _) | (9 | 10, _) | (11, ..=14) => (y, 2),
        (11, _) | (12, _) => (y, 3),
        (1..=3, _) => (y - 1, 3),
        _ => (y - 1, 4),
    };
    FiscalQuarter { year, quarter }
}

/// Same as [`date_to_quarter`] for a `YYYY-MM-DD` string.
///
/// # Errors
/// Returns [`CalendarError::InvalidDate`] if the string is not a valid date.
pub fn date_str_to_quarter(date: &str) -> Result<FiscalQuarter, CalendarError> {
    let parsed = Date::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| CalendarError::InvalidDate(date.to_string()))?;
    Ok(date_to_quarter(parsed))
}

// Fixed month/day pairs combined with a year in chrono's range are always valid.
fn ymd(year: i32, month: u32, day: u32) -> Date {
    Date::from_ymd_opt(year, month, day).unwrap_or_default()
}
