//! Cross-sectional ranking.
//!
//! Every date is ranked on its own. Ties share the average of the ordinal
//! positions they span (`[10, 20, 20, 30]` ranks as `[1, 2.5, 2.5, 4]`), and
//! null or NaN values are left unranked instead of being dropped.

use std::cmp::Ordering;

use ndarray::Array1;
use polars::prelude::*;
use tamsui_calendar::dates_of;
use tamsui_primitives::{FactorRecord, Rank, RankRecord, Symbol, columns};
use tracing::debug;

use crate::RankError;

/// Rank a column within each partition of `over_col`.
///
/// # Arguments
/// * `target_col` - Column holding the values to rank
/// * `over_col` - Column to partition by (typically "date")
/// * `ascending` - If true the smallest value gets rank 1
///
/// # Returns
/// Polars expression producing a nullable `Float64` rank.
pub fn rank_xsection(target_col: &str, over_col: &str, ascending: bool) -> Expr {
    col(target_col)
        .cast(DataType::Float64)
        .fill_nan(lit(NULL).cast(DataType::Float64))
        .rank(RankOptions { method: RankMethod::Average, descending: !ascending }, None)
        .cast(DataType::Float64)
        .over([col(over_col)])
}

/// Rank a long-format factor table per date.
///
/// `records` must hold `date`, `symbol` and `value`. The result keeps every
/// input row and adds a `rank` column; rows whose value is missing get a
/// null rank. Output is sorted by date, then symbol.
///
/// # Errors
/// Returns [`RankError::MissingColumn`] if a required column is absent, or a
/// polars error if evaluation fails.
pub fn rank_factor(mut records: LazyFrame, ascending: bool) -> Result<DataFrame, RankError> {
    require_columns(&mut records, &[columns::DATE, columns::SYMBOL, columns::VALUE])?;

    let ranked = records
        .with_column(
            rank_xsection(columns::VALUE, columns::DATE, ascending).alias(columns::RANK),
        )
        .select([col(columns::DATE), col(columns::SYMBOL), col(columns::VALUE), col(columns::RANK)])
        .sort([columns::DATE, columns::SYMBOL], SortMultipleOptions::default())
        .collect()?;

    debug!(rows = ranked.height(), ascending, "ranked factor cross-sections");
    Ok(ranked)
}

/// Rank a slice of nullable values with the average tie rule.
///
/// This is the in-memory counterpart of [`rank_xsection`] for one date's
/// cross-section.
#[must_use]
pub fn rank_values(values: &[Option<f64>], ascending: bool) -> Vec<Rank> {
    let mut present: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|x| !x.is_nan()).map(|x| (i, x)))
        .collect();

    present.sort_by(|a, b| order(a.1, b.1, ascending));

    let mut ranks = vec![Rank::Unranked; values.len()];
    let mut i = 0;
    while i < present.len() {
        let mut j = i + 1;
        while j < present.len() && present[j].1 == present[i].1 {
            j += 1;
        }
        // Positions i..j (0-based) cover ranks i+1..=j.
        let avg = (i + 1 + j) as f64 / 2.0;
        for &(idx, _) in &present[i..j] {
            ranks[idx] = Rank::Ranked(avg);
        }
        i = j;
    }

    ranks
}

fn order(a: f64, b: f64, ascending: bool) -> Ordering {
    if ascending { a.total_cmp(&b) } else { b.total_cmp(&a) }
}

/// Cross-sectional ranking transform for in-memory data.
#[derive(Debug, Clone, Copy)]
pub struct RankXSection {
    /// Whether the smallest value gets rank 1.
    pub ascending: bool,
}

impl RankXSection {
    /// Create a new ranking transform.
    #[must_use]
    pub const fn new(ascending: bool) -> Self {
        Self { ascending }
    }

    /// Rank nullable values.
    #[must_use]
    pub fn apply(&self, values: &[Option<f64>]) -> Vec<Rank> {
        rank_values(values, self.ascending)
    }

    /// Rank an array, treating NaN as missing; unranked entries come back as NaN.
    #[must_use]
    pub fn apply_array(&self, data: &Array1<f64>) -> Array1<f64> {
        let values: Vec<Option<f64>> = data.iter().map(|&x| Some(x)).collect();
        rank_values(&values, self.ascending)
            .into_iter()
            .map(|r| r.value().unwrap_or(f64::NAN))
            .collect()
    }
}

impl Default for RankXSection {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Read a rank frame back into typed records.
///
/// `rank_col` is usually `rank` or `weighted_rank`. Rows with a null date or
/// symbol are skipped; a null rank becomes [`Rank::Unranked`].
///
/// # Errors
/// Returns a polars error if a column is missing or has the wrong type.
pub fn rank_records(df: &DataFrame, rank_col: &str) -> Result<Vec<RankRecord>, RankError> {
    let dates = dates_of(df.column(columns::DATE)?)?;
    let symbols = df.column(columns::SYMBOL)?.str()?;
    let ranks = df.column(rank_col)?.cast(&DataType::Float64)?;
    let ranks = ranks.f64()?;

    Ok(dates
        .into_iter()
        .zip(symbols)
        .zip(ranks)
        .filter_map(|((date, symbol), rank)| {
            Some(RankRecord::new(date?, Symbol::from(symbol?), Rank::from_option(rank)))
        })
        .collect())
}

/// Read a long factor frame back into typed records.
///
/// Missing and NaN values become `None`.
pub fn factor_records(df: &DataFrame, value_col: &str) -> Result<Vec<FactorRecord>, RankError> {
    let dates = dates_of(df.column(columns::DATE)?)?;
    let symbols = df.column(columns::SYMBOL)?.str()?;
    let values = df.column(value_col)?.cast(&DataType::Float64)?;
    let values = values.f64()?;

    Ok(dates
        .into_iter()
        .zip(symbols)
        .zip(values)
        .filter_map(|((date, symbol), value)| {
            Some(FactorRecord::new(date?, Symbol::from(symbol?), value.filter(|v| !v.is_nan())))
        })
        .collect())
}

pub(crate) fn require_columns(lf: &mut LazyFrame, required: &[&str]) -> Result<(), RankError> {
    let schema = lf.collect_schema()?;
    match required.iter().find(|c| !schema.contains(c)) {
        Some(missing) => Err(RankError::MissingColumn((*missing).to_string())),
        None => Ok(()),
    }
}
