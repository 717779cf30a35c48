//! Trading-day calendars and date column helpers.

use chrono::Datelike;
use polars::prelude::*;
use tamsui_primitives::Date;

use crate::CalendarError;

/// `NaiveDate::num_days_from_ce` of 1970-01-01, the epoch of polars `Date`.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Ordered, deduplicated, non-empty set of trading sessions.
///
/// Defines both the sampling grid and the valid output range when quarterly
/// data is expanded to daily frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingCalendar {
    days: Vec<Date>,
}

impl TradingCalendar {
    /// Build a calendar from arbitrary dates; input is sorted and deduplicated.
    ///
    /// # Errors
    /// Returns [`CalendarError::EmptyInput`] when no dates are given.
    pub fn new(mut days: Vec<Date>) -> Result<Self, CalendarError> {
        if days.is_empty() {
            return Err(CalendarError::EmptyInput);
        }
        days.sort_unstable();
        days.dedup();
        Ok(Self { days })
    }

    /// Collect the distinct non-null dates of `date_col` in `df`.
    ///
    /// Typically called on a price table, whose dates are the sessions that
    /// actually traded.
    ///
    /// # Errors
    /// Returns an error if the column is missing or cannot be read as dates,
    /// or [`CalendarError::EmptyInput`] if it holds no dates.
    pub fn from_frame(df: &DataFrame, date_col: &str) -> Result<Self, CalendarError> {
        let days = dates_of(df.column(date_col)?)?.into_iter().flatten().collect();
        Self::new(days)
    }

    /// First session.
    #[must_use]
    pub fn first(&self) -> Date {
        self.days[0]
    }

    /// Last session.
    #[must_use]
    pub fn last(&self) -> Date {
        self.days[self.days.len() - 1]
    }

    /// Number of sessions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.days.len()
    }

    /// Always false; a calendar holds at least one session.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Sessions as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Date] {
        &self.days
    }

    /// Whether `date` is a session.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.days.binary_search(&date).is_ok()
    }

    /// Sessions inside `[start, end]`.
    ///
    /// # Errors
    /// Returns [`CalendarError::EmptyInput`] when no session falls in range.
    pub fn between(&self, start: Date, end: Date) -> Result<Self, CalendarError> {
        Self::new(self.days.iter().copied().filter(|d| start <= *d && *d <= end).collect())
    }

    /// The sessions as a one-column frame named `name`.
    ///
    /// # Errors
    /// Returns a polars error if the frame cannot be built.
    pub fn to_frame(&self, name: &str) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![date_series(name, &self.days)?.into()])
    }
}

/// Build a polars `Date` series from chrono dates.
///
/// # Errors
/// Returns a polars error if the cast to `Date` fails.
pub fn date_series(name: &str, dates: &[Date]) -> PolarsResult<Series> {
    let days: Vec<i32> =
        dates.iter().map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE).collect();
    Series::new(name.into(), days).cast(&DataType::Date)
}

/// Read a `Date` (or `Datetime`, or `YYYY-MM-DD` string) column as chrono dates.
///
/// # Errors
/// Returns a polars error if the column cannot be cast to `Date`.
pub fn dates_of(column: &Column) -> PolarsResult<Vec<Option<Date>>> {
    let days = column.cast(&DataType::Date)?.cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|d| d.and_then(|d| Date::from_num_days_from_ce_opt(d + UNIX_EPOCH_DAYS_FROM_CE)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn sorts_and_dedups() {
        let cal = TradingCalendar::new(vec![d(2024, 1, 3), d(2024, 1, 1), d(2024, 1, 3)]).unwrap();
        assert_eq!(cal.as_slice(), &[d(2024, 1, 1), d(2024, 1, 3)]);
        assert_eq!(cal.first(), d(2024, 1, 1));
        assert_eq!(cal.last(), d(2024, 1, 3));
        assert!(cal.contains(d(2024, 1, 3)));
        assert!(!cal.contains(d(2024, 1, 2)));
    }

    #[test]
    fn empty_calendar_is_rejected() {
        assert!(matches!(TradingCalendar::new(vec![]), Err(CalendarError::EmptyInput)));
    }

    #[test]
    fn between_filters_range() {
        let cal = TradingCalendar::new((1..=10).map(|day| d(2024, 1, day)).collect()).unwrap();
        let sub = cal.between(d(2024, 1, 3), d(2024, 1, 5)).unwrap();
        assert_eq!(sub.len(), 3);
        assert!(cal.between(d(2025, 1, 1), d(2025, 2, 1)).is_err());
    }

    #[test]
    fn frame_round_trip() {
        let cal = TradingCalendar::new(vec![d(1999, 12, 31), d(2024, 2, 29)]).unwrap();
        let df = cal.to_frame("date").unwrap();
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
        let back = TradingCalendar::from_frame(&df, "date").unwrap();
        assert_eq!(back, cal);
    }
}
