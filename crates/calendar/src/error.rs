//! Error types for calendar operations.

/// Errors that can occur while parsing quarters or building calendars.
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    /// Quarter label is not of the form `YYYY-Qn` with `n` in `1..=4`.
    #[error("invalid quarter label: {0:?} (expected YYYY-Qn, n in 1..=4)")]
    InvalidQuarterLabel(String),

    /// Date string is not of the form `YYYY-MM-DD`.
    #[error("invalid date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// A trading calendar needs at least one session.
    #[error("empty input: a trading calendar needs at least one date")]
    EmptyInput,

    /// Polars error while reading dates from a frame.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl CalendarError {
    /// Calendar errors are input validation failures and never recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CalendarError::InvalidQuarterLabel("2013-Q5".to_string());
        assert!(err.to_string().contains("2013-Q5"));
        assert!(!err.is_recoverable());
    }
}
