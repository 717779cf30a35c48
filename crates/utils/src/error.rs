//! Error types for utility functions.

/// Errors that can occur during utility operations.
#[derive(Debug, thiserror::Error)]
pub enum UtilsError {
    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Date handling failed.
    #[error("calendar error: {0}")]
    Calendar(#[from] tamsui_calendar::CalendarError),

    /// Invalid parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Missing column.
    #[error("missing column: {0}")]
    MissingColumn(String),
}

impl UtilsError {
    /// Utility failures are validation errors and never transient.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        false
    }
}
