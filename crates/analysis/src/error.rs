//! Error types for factor analysis.

/// Errors that can occur while evaluating a factor.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Invalid parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Missing column.
    #[error("missing column: {0}")]
    MissingColumn(String),
}

impl AnalysisError {
    /// Analysis failures are validation errors and never transient.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        false
    }
}
