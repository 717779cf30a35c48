//! Per-date factor quantiles.

use polars::prelude::*;
use tamsui_primitives::columns;
use tamsui_rank::rank_xsection;

use crate::{AnalysisError, returns::require_columns};

/// Name of the quantile bucket column.
pub const QUANTILE: &str = "quantile";

/// Bucket each date's factor values into `quantiles` equal-count groups.
///
/// Expects `date`, `symbol` and `value`. A value with average rank `r` among
/// the `n` non-null values of its date lands in bucket `ceil(r * q / n)`, so
/// buckets run from 1 (smallest values) to `q`. Null values get a null bucket.
///
/// # Errors
/// Returns [`AnalysisError::InvalidParameter`] when `quantiles` is zero, or
/// [`AnalysisError::MissingColumn`] for absent inputs.
pub fn factor_quantiles(mut factor: LazyFrame, quantiles: u32) -> Result<DataFrame, AnalysisError> {
    if quantiles == 0 {
        return Err(AnalysisError::InvalidParameter("quantiles must be positive".to_string()));
    }
    require_columns(&mut factor, &[columns::DATE, columns::SYMBOL, columns::VALUE])?;

    let rank = rank_xsection(columns::VALUE, columns::DATE, true);
    let count = col(columns::VALUE).count().over([col(columns::DATE)]).cast(DataType::Float64);
    let bucket = (rank * lit(f64::from(quantiles)) / count).ceil().cast(DataType::Int32);

    let value =
        col(columns::VALUE).cast(DataType::Float64).fill_nan(lit(NULL).cast(DataType::Float64));

    Ok(factor
        .with_column(value)
        .with_column(bucket.alias(QUANTILE))
        .select([col(columns::DATE), col(columns::SYMBOL), col(columns::VALUE), col(QUANTILE)])
        .sort([columns::DATE, columns::SYMBOL], SortMultipleOptions::default())
        .collect()?)
}
