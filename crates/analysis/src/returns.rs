//! Forward returns over holding periods.

use polars::prelude::*;
use tamsui_primitives::columns;

use crate::AnalysisError;

/// Column holding the `period`-session forward return.
#[must_use]
pub fn forward_return_col(period: usize) -> String {
    format!("fwd_{period}")
}

/// Per-symbol forward returns `close[t + p] / close[t] - 1`.
///
/// Expects `date`, `symbol` and `close`. Adds one `fwd_{p}` column per period;
/// the last `p` sessions of each symbol have a null return. Output holds
/// `date`, `symbol` and the return columns, sorted by date then symbol.
///
/// # Errors
/// Returns [`AnalysisError::InvalidParameter`] for an empty period list or a
/// zero period, and [`AnalysisError::MissingColumn`] for absent inputs.
pub fn forward_returns(
    mut prices: LazyFrame,
    periods: &[usize],
) -> Result<DataFrame, AnalysisError> {
    if periods.is_empty() || periods.contains(&0) {
        return Err(AnalysisError::InvalidParameter(format!(
            "periods must be non-empty and positive, got {periods:?}"
        )));
    }
    require_columns(&mut prices, &[columns::DATE, columns::SYMBOL, "close"])?;

    let mut exprs = vec![col(columns::DATE), col(columns::SYMBOL)];
    for &p in periods {
        let ahead = col("close").shift(lit(-(p as i64))).over([col(columns::SYMBOL)]);
        exprs.push((ahead / col("close") - lit(1.0)).alias(forward_return_col(p)));
    }

    Ok(prices
        .with_columns([
            col(columns::DATE).cast(DataType::Date),
            col("close").cast(DataType::Float64),
        ])
        .sort([columns::SYMBOL, columns::DATE], SortMultipleOptions::default())
        .select(exprs)
        .sort([columns::DATE, columns::SYMBOL], SortMultipleOptions::default())
        .collect()?)
}

pub(crate) fn require_columns(lf: &mut LazyFrame, required: &[&str]) -> Result<(), AnalysisError> {
    let schema = lf.collect_schema()?;
    match required.iter().find(|c| !schema.contains(c)) {
        Some(missing) => Err(AnalysisError::MissingColumn((*missing).to_string())),
        None => Ok(()),
    }
}
