//! Error types for ranking operations.

/// Errors that can occur while ranking or combining factor tables.
#[derive(Debug, thiserror::Error)]
pub enum RankError {
    /// Number of rank tables and weights differ.
    #[error("length mismatch: {tables} rank tables but {weights} weights")]
    LengthMismatch {
        /// Number of rank tables.
        tables: usize,
        /// Number of weights.
        weights: usize,
    },

    /// No rank tables were supplied.
    #[error("empty input: at least one rank table is required")]
    EmptyInput,

    /// Required column missing from an input frame.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// Weight is NaN or infinite.
    #[error("invalid weight: {0}")]
    InvalidWeight(String),

    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl RankError {
    /// Ranking errors are caller mistakes and are never worth retrying.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        false
    }
}
