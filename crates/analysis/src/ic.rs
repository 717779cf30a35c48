//! Information Coefficient (IC) calculations.
//!
//! IC is the Spearman rank correlation between factor values and forward
//! returns, computed per date.

use std::collections::BTreeMap;

use polars::prelude::*;
use tamsui_calendar::dates_of;
use tamsui_primitives::{Date, columns};
use tamsui_rank::rank_values;

use crate::AnalysisError;

/// Spearman rank correlation between `values` and `returns`.
///
/// Only positions where both sides are present and finite take part. Ranks
/// use the average tie rule. Returns `None` with fewer than two usable pairs
/// or when either side has no variation.
#[must_use]
pub fn rank_ic(values: &[Option<f64>], returns: &[Option<f64>]) -> Option<f64> {
    let (xs, ys): (Vec<Option<f64>>, Vec<Option<f64>>) = values
        .iter()
        .zip(returns)
        .filter_map(|(&x, &y)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((Some(x), Some(y))),
            _ => None,
        })
        .unzip();

    if xs.len() < 2 {
        return None;
    }

    let rx: Vec<f64> = rank_values(&xs, true).into_iter().filter_map(|r| r.value()).collect();
    let ry: Vec<f64> = rank_values(&ys, true).into_iter().filter_map(|r| r.value()).collect();
    pearson(&rx, &ry)
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Per-date rank IC between `factor_col` and `return_col` of a joined frame.
///
/// Dates where the IC is undefined are omitted. Output is in date order.
///
/// # Errors
/// Returns [`AnalysisError::MissingColumn`] when a column is absent.
pub fn ic_series(
    joined: &DataFrame,
    factor_col: &str,
    return_col: &str,
) -> Result<Vec<(Date, f64)>, AnalysisError> {
    for name in [columns::DATE, factor_col, return_col] {
        if joined.column(name).is_err() {
            return Err(AnalysisError::MissingColumn(name.to_string()));
        }
    }

    let dates = dates_of(joined.column(columns::DATE)?)?;
    let factor = joined.column(factor_col)?.cast(&DataType::Float64)?;
    let returns = joined.column(return_col)?.cast(&DataType::Float64)?;

    let mut by_date: BTreeMap<Date, (Vec<Option<f64>>, Vec<Option<f64>>)> = BTreeMap::new();
    for ((date, x), y) in dates.into_iter().zip(factor.f64()?).zip(returns.f64()?) {
        if let Some(date) = date {
            let entry = by_date.entry(date).or_default();
            entry.0.push(x);
            entry.1.push(y);
        }
    }

    Ok(by_date
        .into_iter()
        .filter_map(|(date, (xs, ys))| rank_ic(&xs, &ys).map(|ic| (date, ic)))
        .collect())
}
