//! Tear-sheet summary of a factor against forward returns.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tamsui_primitives::columns;
use tracing::info;

use crate::{
    AnalysisError, QUANTILE, factor_quantiles, forward_return_col, forward_returns, ic_series,
};

/// Summary statistics for one holding period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Holding period in sessions.
    pub period: usize,
    /// Mean forward return of each quantile, bucket 1 first.
    pub mean_return_by_quantile: Vec<Option<f64>>,
    /// Top-quantile minus bottom-quantile mean return.
    pub spread: Option<f64>,
    /// Mean of the per-date rank IC.
    pub ic_mean: Option<f64>,
    /// Sample standard deviation of the per-date rank IC.
    pub ic_std: Option<f64>,
    /// `ic_mean / ic_std`.
    pub ic_ir: Option<f64>,
    /// Dates with a defined IC.
    pub ic_dates: usize,
}

/// Quantile returns and IC of a factor for several holding periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TearSheet {
    /// Number of quantile buckets.
    pub quantiles: u32,
    /// `(date, symbol)` rows present in both the factor and the prices.
    pub observations: usize,
    /// One entry per requested period, in request order.
    pub periods: Vec<PeriodSummary>,
}

impl TearSheet {
    /// Evaluate `factor` (`date`, `symbol`, `value`) against `prices`
    /// (`date`, `symbol`, `close`).
    ///
    /// The factor is bucketed per date, joined to forward returns on
    /// `(date, symbol)`, and summarised per period.
    ///
    /// # Errors
    /// Propagates parameter and column errors from [`forward_returns`] and
    /// [`factor_quantiles`].
    pub fn compute(
        factor: LazyFrame,
        prices: LazyFrame,
        periods: &[usize],
        quantiles: u32,
    ) -> Result<Self, AnalysisError> {
        let fwd = forward_returns(prices, periods)?;
        let bucketed = factor_quantiles(factor, quantiles)?;

        let keys = [col(columns::DATE), col(columns::SYMBOL)];
        let joined = bucketed
            .lazy()
            .join(fwd.lazy(), keys.clone(), keys, JoinArgs::new(JoinType::Inner))
            .collect()?;

        let buckets: Vec<Option<i32>> = joined.column(QUANTILE)?.i32()?.into_iter().collect();

        let mut summaries = Vec::with_capacity(periods.len());
        for &period in periods {
            let ret_col = forward_return_col(period);
            let returns = joined.column(&ret_col)?.f64()?;

            let means = quantile_means(&buckets, returns, quantiles);
            let spread = match (means.first(), means.last()) {
                (Some(Some(bottom)), Some(Some(top))) => Some(top - bottom),
                _ => None,
            };

            let ics: Vec<f64> = ic_series(&joined, columns::VALUE, &ret_col)?
                .into_iter()
                .map(|(_, ic)| ic)
                .collect();
            let (ic_mean, ic_std) = mean_std(&ics);
            let ic_ir = match (ic_mean, ic_std) {
                (Some(m), Some(s)) if s > 0.0 => Some(m / s),
                _ => None,
            };

            summaries.push(PeriodSummary {
                period,
                mean_return_by_quantile: means,
                spread,
                ic_mean,
                ic_std,
                ic_ir,
                ic_dates: ics.len(),
            });
        }

        info!(
            observations = joined.height(),
            periods = periods.len(),
            quantiles,
            "computed tear sheet"
        );
        Ok(Self { quantiles, observations: joined.height(), periods: summaries })
    }

    /// Summary for `period`, if it was requested.
    #[must_use]
    pub fn period(&self, period: usize) -> Option<&PeriodSummary> {
        self.periods.iter().find(|s| s.period == period)
    }
}

fn quantile_means(
    buckets: &[Option<i32>],
    returns: &Float64Chunked,
    quantiles: u32,
) -> Vec<Option<f64>> {
    let mut sums = vec![(0.0, 0usize); quantiles as usize];
    for (bucket, ret) in buckets.iter().zip(returns) {
        if let (Some(b), Some(r)) = (bucket, ret) {
            if let Some(slot) = usize::try_from(*b - 1).ok().and_then(|i| sums.get_mut(i)) {
                slot.0 += r;
                slot.1 += 1;
            }
        }
    }
    sums.into_iter().map(|(sum, n)| (n > 0).then(|| sum / n as f64)).collect()
}

fn mean_std(xs: &[f64]) -> (Option<f64>, Option<f64>) {
    if xs.is_empty() {
        return (None, None);
    }
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    if xs.len() < 2 {
        return (Some(mean), None);
    }
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (Some(mean), Some(var.sqrt()))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use tamsui_calendar::date_series;
    use tamsui_primitives::Date;

    use super::*;
    use crate::returns::tests::{day, prices};

    /// Factor that ranks `A` above `B` on every date.
    fn factor() -> LazyFrame {
        let dates: Vec<Date> = (1..=4).flat_map(|n| [day(n), day(n)]).collect();
        DataFrame::new(vec![
            date_series(columns::DATE, &dates).unwrap().into(),
            Column::new(columns::SYMBOL.into(), ["A", "B", "A", "B", "A", "B", "A", "B"]),
            Column::new(columns::VALUE.into(), [2.0, 1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0]),
        ])
        .unwrap()
        .lazy()
    }

    #[test]
    fn summarises_quantiles_and_ic() {
        let sheet = TearSheet::compute(factor(), prices(), &[1], 2).unwrap();
        assert_eq!(sheet.observations, 8);

        let p1 = sheet.period(1).unwrap();
        // B (bucket 1) returns: -0.25, -1/3, -0.5; A (bucket 2): 0.1, 0.1, 0.0.
        let bottom = p1.mean_return_by_quantile[0].unwrap();
        let top = p1.mean_return_by_quantile[1].unwrap();
        assert_relative_eq!(bottom, (-0.25 - 1.0 / 3.0 - 0.5) / 3.0, epsilon = 1e-12);
        assert_relative_eq!(top, 0.2 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(p1.spread.unwrap(), top - bottom, epsilon = 1e-12);

        // Two names per date: IC is +1 on every date with a return.
        assert_eq!(p1.ic_dates, 3);
        assert_relative_eq!(p1.ic_mean.unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(p1.ic_std.unwrap(), 0.0, epsilon = 1e-12);
        assert_eq!(p1.ic_ir, None);
    }

    #[test]
    fn serialises_to_json() {
        let sheet = TearSheet::compute(factor(), prices(), &[1, 2], 2).unwrap();
        let json = serde_json::to_string(&sheet).unwrap();
        let back: TearSheet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.periods.len(), 2);
        assert!(sheet.period(3).is_none());
    }

    #[test]
    fn summary_statistics() {
        assert_eq!(mean_std(&[]), (None, None));
        assert_eq!(mean_std(&[0.5]), (Some(0.5), None));
        let (m, s) = mean_std(&[1.0, 3.0]);
        assert_relative_eq!(m.unwrap(), 2.0);
        assert_relative_eq!(s.unwrap(), 2.0_f64.sqrt());
    }
}
