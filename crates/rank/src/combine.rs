//! Weighted combination of per-factor rank tables.

use polars::prelude::*;
use tamsui_primitives::{FactorWeights, columns};
use tracing::{debug, instrument};

use crate::{RankError, cross_section::require_columns, rank_xsection};

const WEIGHTED_SCORE: &str = "weighted_score";

/// Combines several rank tables into one composite ranking.
///
/// Each input table is joined on `(date, symbol)`; only instruments present in
/// every table on a given date survive. An unranked observation contributes
/// rank `0` (see [`Rank::to_sentinel`](tamsui_primitives::Rank::to_sentinel)).
/// The weighted rank sum is then re-ranked per date with the same average-tie
/// rule used for single factors.
#[derive(Debug, Clone)]
pub struct WeightedRankCombiner {
    ascending: bool,
    rank_col: String,
}

impl WeightedRankCombiner {
    /// Combiner whose final re-rank gives rank 1 to the smallest weighted sum
    /// when `ascending` is true.
    #[must_use]
    pub fn new(ascending: bool) -> Self {
        Self { ascending, rank_col: columns::RANK.to_string() }
    }

    /// Read input ranks from `rank_col` instead of `rank`.
    #[must_use]
    pub fn with_rank_col(mut self, rank_col: impl Into<String>) -> Self {
        self.rank_col = rank_col.into();
        self
    }

    /// Direction of the final re-rank.
    #[must_use]
    pub const fn ascending(&self) -> bool {
        self.ascending
    }

    /// Combine `ranked` tables with validated weights.
    ///
    /// # Errors
    /// See [`WeightedRankCombiner::combine`].
    pub fn combine_weighted(
        &self,
        ranked: &[LazyFrame],
        weights: &FactorWeights,
    ) -> Result<DataFrame, RankError> {
        self.combine(ranked, weights.as_slice())
    }

    /// Combine `ranked` tables, weighting table `i` by `weights[i]`.
    ///
    /// Output columns are `date`, `symbol`, `weighted_rank`, sorted by date
    /// then symbol. Tables with no rows give an empty output.
    ///
    /// # Errors
    /// Returns [`RankError::LengthMismatch`] when the counts differ,
    /// [`RankError::EmptyInput`] when no tables are given,
    /// [`RankError::InvalidWeight`] for a non-finite weight, and
    /// [`RankError::MissingColumn`] when a table lacks a required column.
    #[instrument(level = "debug", skip(self, ranked), fields(tables = ranked.len()))]
    pub fn combine(&self, ranked: &[LazyFrame], weights: &[f64]) -> Result<DataFrame, RankError> {
        if ranked.len() != weights.len() {
            return Err(RankError::LengthMismatch { tables: ranked.len(), weights: weights.len() });
        }
        if ranked.is_empty() {
            return Err(RankError::EmptyInput);
        }
        if let Some(w) = weights.iter().find(|w| !w.is_finite()) {
            return Err(RankError::InvalidWeight(w.to_string()));
        }

        let keys = [col(columns::DATE), col(columns::SYMBOL)];
        let mut rank_cols = Vec::with_capacity(ranked.len());
        let mut joined: Option<LazyFrame> = None;

        for (i, table) in ranked.iter().enumerate() {
            let mut table = table.clone();
            require_columns(&mut table, &[columns::DATE, columns::SYMBOL, self.rank_col.as_str()])?;

            let name = format!("{}_{i}", columns::RANK);
            let table = table.select([
                col(columns::DATE),
                col(columns::SYMBOL),
                col(self.rank_col.as_str()).cast(DataType::Float64).alias(name.as_str()),
            ]);
            rank_cols.push(name);

            joined = Some(match joined {
                None => table,
                Some(acc) => {
                    acc.join(table, keys.clone(), keys.clone(), JoinArgs::new(JoinType::Inner))
                }
            });
        }
        let joined = joined.ok_or(RankError::EmptyInput)?;

        let score = rank_cols
            .iter()
            .zip(weights)
            .map(|(c, &w)| col(c.as_str()).fill_null(lit(0.0)) * lit(w))
            .reduce(|acc, e| acc + e)
            .ok_or(RankError::EmptyInput)?;

        let combined = joined
            .with_column(score.alias(WEIGHTED_SCORE))
            .with_column(
                rank_xsection(WEIGHTED_SCORE, columns::DATE, self.ascending)
                    .alias(columns::WEIGHTED_RANK),
            )
            .select([col(columns::DATE), col(columns::SYMBOL), col(columns::WEIGHTED_RANK)])
            .sort([columns::DATE, columns::SYMBOL], SortMultipleOptions::default())
            .collect()?;

        debug!(rows = combined.height(), "combined rank tables");
        Ok(combined)
    }
}

impl Default for WeightedRankCombiner {
    fn default() -> Self {
        Self::new(true)
    }
}

/// All `k`-element combinations of `items`, in lexicographic index order.
///
/// Used to evaluate every factor pairing (or triple, ...) of a factor list.
/// Returns nothing when `k` is zero or larger than `items`.
#[must_use]
pub fn factor_combinations<T: Clone>(items: &[T], k: usize) -> Vec<Vec<T>> {
    let n = items.len();
    if k == 0 || k > n {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        out.push(idx.iter().map(|&i| items[i].clone()).collect());

        // Rightmost index that can still move forward.
        let Some(pos) = (0..k).rev().find(|&p| idx[p] != p + n - k) else {
            break;
        };
        idx[pos] += 1;
        for p in pos + 1..k {
            idx[p] = idx[p - 1] + 1;
        }
    }
    out
}
