//! End-to-end workflows used by the `tamsui` binary.
//!
//! prices -> trading calendar -> quarterly factors expanded to daily ->
//! per-factor ranks -> weighted composites -> tear sheets.

use std::path::Path;

use anyhow::{Context, bail};
use polars::prelude::*;
use tamsui_analysis::TearSheet;
use tamsui_calendar::{TradingCalendar, date_series};
use tamsui_primitives::{Date, FactorName, FactorWeights, Symbol, columns};
use tamsui_rank::{WeightedRankCombiner, factor_combinations, rank_factor};
use tamsui_traits::{FactorSource, PriceSource};
use tamsui_utils::{UtilsError, clean_ohlcv, expand_to_long};
use tracing::{info, warn};

use crate::{
    config::{MultiFactorParams, SingleFactorParams},
    sources::{CsvFactorSource, CsvPriceSource},
};

/// Cleaned prices together with the calendar and symbols they define.
#[derive(Debug, Clone)]
pub struct Universe {
    /// Output of [`clean_ohlcv`].
    pub prices: DataFrame,
    /// Sessions present in the prices.
    pub calendar: TradingCalendar,
    /// Distinct symbols, sorted.
    pub symbols: Vec<Symbol>,
}

impl Universe {
    /// Load and clean bars between `start` and `end`.
    ///
    /// # Errors
    /// Fails when the source cannot be read or holds no bars in range.
    pub fn load(source: &dyn PriceSource, start: Date, end: Date) -> anyhow::Result<Self> {
        let raw = source
            .load_prices(start, end)
            .with_context(|| format!("loading prices from {} source", source.name()))?;
        let prices = clean_ohlcv(raw.lazy())?;
        let calendar = TradingCalendar::from_frame(&prices, columns::DATE)
            .with_context(|| format!("no trading days between {start} and {end}"))?;

        let mut symbols: Vec<Symbol> = prices
            .column(columns::SYMBOL)?
            .str()?
            .into_iter()
            .flatten()
            .map(Symbol::from)
            .collect();
        symbols.sort();
        symbols.dedup();

        info!(sessions = calendar.len(), symbols = symbols.len(), "loaded universe");
        Ok(Self { prices, calendar, symbols })
    }
}

/// Daily long-format values of several factors.
///
/// Each factor's quarterly table is expanded onto `calendar` and restricted
/// to `symbols`. Factors that cannot be loaded or expanded are skipped with a
/// warning. The result has columns `date, symbol, factor_name, value` sorted
/// by date, symbol, factor; it is empty when `factors` or `symbols` is.
///
/// # Errors
/// Returns a polars error if the per-factor frames cannot be combined.
pub fn fetch_factors_daily(
    source: &dyn FactorSource,
    factors: &[FactorName],
    calendar: &TradingCalendar,
    symbols: &[Symbol],
) -> Result<DataFrame, UtilsError> {
    if factors.is_empty() || symbols.is_empty() {
        return Ok(empty_daily_frame()?);
    }

    let mut parts = Vec::with_capacity(factors.len());
    for name in factors {
        let long = source
            .quarterly_factor(name)
            .map_err(|e| e.to_string())
            .and_then(|table| {
                expand_to_long(&table, calendar, columns::DATE, symbols).map_err(|e| e.to_string())
            });
        match long {
            Ok(long) => parts.push(long.lazy().select([
                col(columns::DATE),
                col(columns::SYMBOL),
                lit(name.as_str()).alias(columns::FACTOR_NAME),
                col(columns::VALUE),
            ])),
            Err(error) => warn!(factor = %name, %error, "skipping factor"),
        }
    }

    if parts.is_empty() {
        return Ok(empty_daily_frame()?);
    }

    let daily = concat(parts, UnionArgs::default())?
        .sort(
            [columns::DATE, columns::SYMBOL, columns::FACTOR_NAME],
            SortMultipleOptions::default(),
        )
        .collect()?;
    info!(rows = daily.height(), factors = factors.len(), "fetched daily factors");
    Ok(daily)
}

/// The `(date, symbol, value)` series of one factor from a
/// [`fetch_factors_daily`] frame.
pub fn factor_series(daily: &DataFrame, name: &FactorName) -> LazyFrame {
    daily
        .clone()
        .lazy()
        .filter(col(columns::FACTOR_NAME).eq(lit(name.as_str())))
        .select([col(columns::DATE), col(columns::SYMBOL), col(columns::VALUE)])
}

fn empty_daily_frame() -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        date_series(columns::DATE, &[])?.into(),
        Series::new_empty(columns::SYMBOL.into(), &DataType::String).into(),
        Series::new_empty(columns::FACTOR_NAME.into(), &DataType::String).into(),
        Series::new_empty(columns::VALUE.into(), &DataType::Float64).into(),
    ])
}

/// Tear sheet of a single factor's raw values.
///
/// # Errors
/// Fails when prices or the factor cannot be loaded, or the analysis rejects
/// the parameters.
pub fn run_single(data_dir: &Path, params: &SingleFactorParams) -> anyhow::Result<TearSheet> {
    let universe = Universe::load(&CsvPriceSource::new(data_dir), params.start, params.end)?;
    let daily = fetch_factors_daily(
        &CsvFactorSource::new(data_dir),
        std::slice::from_ref(&params.factor),
        &universe.calendar,
        &universe.symbols,
    )?;
    if daily.height() == 0 {
        bail!("factor {} has no data for the selected universe", params.factor);
    }

    let sheet = TearSheet::compute(
        factor_series(&daily, &params.factor),
        universe.prices.lazy(),
        &params.periods,
        params.quantiles,
    )?;
    info!(
        factor = %params.factor,
        observations = sheet.observations,
        "single-factor analysis done"
    );
    Ok(sheet)
}

/// One weighted-rank composite and its tear sheet.
#[derive(Debug, Clone)]
pub struct CompositeReport {
    /// Factors in the combination.
    pub factors: Vec<FactorName>,
    /// `date, symbol, weighted_rank`.
    pub ranks: DataFrame,
    /// Evaluation of the composite rank.
    pub sheet: TearSheet,
}

impl CompositeReport {
    /// Factor names joined with `_`.
    #[must_use]
    pub fn label(&self) -> String {
        self.factors.iter().map(FactorName::as_str).collect::<Vec<_>>().join("_")
    }
}

/// Rank every factor, then evaluate the weighted composite of every
/// `combo_size` combination.
///
/// # Errors
/// Fails when prices cannot be loaded, no factor has data, or ranking fails.
pub fn run_multi(
    data_dir: &Path,
    params: &MultiFactorParams,
) -> anyhow::Result<Vec<CompositeReport>> {
    let universe = Universe::load(&CsvPriceSource::new(data_dir), params.start, params.end)?;
    let daily = fetch_factors_daily(
        &CsvFactorSource::new(data_dir),
        &params.factors,
        &universe.calendar,
        &universe.symbols,
    )?;

    let ascending = params.direction.ascending();
    let mut ranked = Vec::new();
    for name in &params.factors {
        let series = factor_series(&daily, name);
        let ranks = rank_factor(series, ascending)?;
        if ranks.height() == 0 {
            warn!(factor = %name, "no daily values, leaving factor out of combinations");
            continue;
        }
        ranked.push((name.clone(), ranks));
    }

    let combo_size = params.combo_size.min(ranked.len());
    if combo_size == 0 {
        bail!("none of the requested factors has data");
    }
    let weights = if combo_size == params.weights.len() {
        params.weights.clone()
    } else {
        warn!(combo_size, "fewer factors than the combination size, using equal weights");
        FactorWeights::equal(combo_size)
            .context("combination size must be positive")?
    };

    let combiner = WeightedRankCombiner::new(ascending);
    let combos = factor_combinations(&ranked, combo_size);
    info!(combinations = combos.len(), combo_size, "running weighted-rank analysis");

    let mut reports = Vec::with_capacity(combos.len());
    for combo in combos {
        let tables: Vec<LazyFrame> = combo.iter().map(|(_, df)| df.clone().lazy()).collect();
        let composite = combiner.combine_weighted(&tables, &weights)?;
        let as_factor = composite.clone().lazy().select([
            col(columns::DATE),
            col(columns::SYMBOL),
            col(columns::WEIGHTED_RANK).alias(columns::VALUE),
        ]);

        let sheet = TearSheet::compute(
            as_factor,
            universe.prices.clone().lazy(),
            &params.periods,
            params.quantiles,
        )?;
        reports.push(CompositeReport {
            factors: combo.into_iter().map(|(name, _)| name).collect(),
            ranks: composite,
            sheet,
        });
    }
    Ok(reports)
}

/// Write a tear sheet as pretty JSON.
///
/// # Errors
/// Fails when the file cannot be written.
pub fn write_report(sheet: &TearSheet, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(sheet)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tamsui_primitives::FactorDirection;

    use super::*;
    use crate::sources::{FACTORS_DIR, PRICES_FILE, tests::data_dir};

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn fetch_expands_and_skips_unknown_factors() {
        let dir = data_dir();
        let universe = Universe::load(&CsvPriceSource::new(dir.path()), d(14), d(17)).unwrap();
        let factors = [FactorName::new("roe"), FactorName::new("missing")];

        let daily = fetch_factors_daily(
            &CsvFactorSource::new(dir.path()),
            &factors,
            &universe.calendar,
            &universe.symbols,
        )
        .unwrap();

        // Four sessions, two symbols, one usable factor.
        assert_eq!(daily.height(), 8);
        let roe = factor_series(&daily, &FactorName::new("roe"))
            .filter(col(columns::SYMBOL).eq(lit("2330")))
            .collect()
            .unwrap();
        let values: Vec<Option<f64>> =
            roe.column(columns::VALUE).unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(0.20), Some(0.25), Some(0.25), Some(0.25)]);
    }

    #[test]
    fn fetch_keeps_leading_zero_tickers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(PRICES_FILE),
            "date,symbol,open,high,low,close,volume\n\
             2024-05-14,0050,150,150,150,150,10\n\
             2024-05-15,0050,151,151,151,151,10\n",
        )
        .unwrap();
        std::fs::create_dir(dir.path().join(FACTORS_DIR)).unwrap();
        std::fs::write(
            dir.path().join(FACTORS_DIR).join("roe.csv"),
            "date,0050\n2024-05-14,0.30\n",
        )
        .unwrap();

        let universe = Universe::load(&CsvPriceSource::new(dir.path()), d(14), d(15)).unwrap();
        assert_eq!(universe.symbols, vec![Symbol::from("0050")]);

        let daily = fetch_factors_daily(
            &CsvFactorSource::new(dir.path()),
            &[FactorName::new("roe")],
            &universe.calendar,
            &universe.symbols,
        )
        .unwrap();
        assert_eq!(daily.height(), 2);
    }

    #[test]
    fn fetch_with_nothing_requested_is_empty() {
        let dir = data_dir();
        let calendar = TradingCalendar::new(vec![d(14)]).unwrap();
        let daily =
            fetch_factors_daily(&CsvFactorSource::new(dir.path()), &[], &calendar, &[]).unwrap();

        assert_eq!(daily.height(), 0);
        let names: Vec<String> = daily.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, ["date", "symbol", "factor_name", "value"]);
    }

    #[test]
    fn single_factor_report() {
        let dir = data_dir();
        let params = SingleFactorParams {
            factor: FactorName::new("roe"),
            start: d(14),
            end: d(17),
            quantiles: 2,
            periods: vec![1],
        };

        let sheet = run_single(dir.path(), &params).unwrap();
        assert_eq!(sheet.observations, 8);

        let path = dir.path().join("roe.json");
        write_report(&sheet, &path).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("\"periods\""));
    }

    #[test]
    fn multi_factor_reports_every_combination() {
        let dir = data_dir();
        let params = MultiFactorParams {
            factors: vec![FactorName::new("roe"), FactorName::new("pb")],
            start: d(14),
            end: d(17),
            quantiles: 2,
            periods: vec![1],
            combo_size: 2,
            weights: FactorWeights::new(vec![0.5, 0.5]).unwrap(),
            direction: FactorDirection::Positive,
        };

        let reports = run_multi(dir.path(), &params).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].label(), "roe_pb");
        // pb is unranked on 2024-05-14 but still scores, as rank 0.
        assert_eq!(reports[0].ranks.height(), 8);
        let first = reports[0]
            .ranks
            .clone()
            .lazy()
            .filter(col(columns::DATE).eq(lit(d(14))))
            .collect()
            .unwrap();
        assert_eq!(first.column(columns::WEIGHTED_RANK).unwrap().null_count(), 0);
    }
}
