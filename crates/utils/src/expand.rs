//! Quarterly-to-daily expansion and reshaping.

use polars::prelude::*;
use tamsui_calendar::{TradingCalendar, date_series};
use tamsui_primitives::{Symbol, columns};
use tracing::debug;

use crate::UtilsError;

/// Expand a sparse factor table onto a trading-day grid.
///
/// The trading days are full-outer-joined with `factor_table` on `date_col`,
/// sorted ascending and every instrument column is forward filled. Rows
/// outside `[trading_days.first(), trading_days.last()]` are then dropped, so
/// a disclosure made before the range still seeds the first trading days.
/// Values before an instrument's first observation stay null.
///
/// # Arguments
/// * `factor_table` - Wide table: `date_col` plus one column per instrument
/// * `trading_days` - Sampling grid and output range
/// * `date_col` - Name of the date column (kept in the output)
///
/// # Returns
/// Wide table sorted by date with instrument columns cast to `Float64`.
///
/// # Errors
/// Returns [`UtilsError::MissingColumn`] if `date_col` is absent, or a polars
/// error if the join fails.
pub fn expand_factor_table(
    factor_table: &DataFrame,
    trading_days: &TradingCalendar,
    date_col: &str,
) -> Result<DataFrame, UtilsError> {
    if factor_table.column(date_col).is_err() {
        return Err(UtilsError::MissingColumn(date_col.to_string()));
    }
    let instruments = instrument_columns(factor_table, date_col);

    let mut factor_exprs = vec![col(date_col).cast(DataType::Date)];
    factor_exprs.extend(instruments.iter().map(|c| col(c.as_str()).cast(DataType::Float64)));
    let factor = factor_table.clone().lazy().select(factor_exprs);

    let filled: Vec<Expr> =
        instruments.iter().map(|c| col(c.as_str()).forward_fill(None)).collect();

    let expanded = trading_days
        .to_frame(date_col)?
        .lazy()
        .join(
            factor,
            [col(date_col)],
            [col(date_col)],
            JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
        )
        .sort([date_col], SortMultipleOptions::default())
        .with_columns(filled)
        .filter(
            col(date_col)
                .gt_eq(lit(trading_days.first()))
                .and(col(date_col).lt_eq(lit(trading_days.last()))),
        )
        .collect()?;

    debug!(
        rows = expanded.height(),
        instruments = instruments.len(),
        source_rows = factor_table.height(),
        "expanded factor table"
    );
    Ok(expanded)
}

/// Reshape a wide table into `(date, symbol, value)` records.
///
/// Only the columns named in `symbols` are reshaped. The result is sorted by
/// date, then symbol.
///
/// # Errors
/// Returns [`UtilsError::MissingColumn`] if `date_col` or a symbol column is
/// absent.
pub fn wide_to_long(
    wide: &DataFrame,
    date_col: &str,
    symbols: &[&str],
) -> Result<DataFrame, UtilsError> {
    for name in std::iter::once(&date_col).chain(symbols) {
        if wide.column(name).is_err() {
            return Err(UtilsError::MissingColumn((*name).to_string()));
        }
    }

    if symbols.is_empty() {
        return Ok(empty_long_frame()?);
    }

    let parts: Vec<LazyFrame> = symbols
        .iter()
        .map(|&sym| {
            wide.clone().lazy().select([
                col(date_col).cast(DataType::Date).alias(columns::DATE),
                lit(sym).alias(columns::SYMBOL),
                col(sym).cast(DataType::Float64).alias(columns::VALUE),
            ])
        })
        .collect();

    Ok(concat(parts, UnionArgs::default())?
        .sort([columns::DATE, columns::SYMBOL], SortMultipleOptions::default())
        .collect()?)
}

/// Expand a quarterly table and reshape it into long records.
///
/// `symbols` restricts the output to a subset of instruments; names absent
/// from the table are ignored and an empty subset keeps every instrument. A
/// non-empty subset that matches no column yields an empty frame.
///
/// # Errors
/// See [`expand_factor_table`].
pub fn expand_to_long(
    factor_table: &DataFrame,
    trading_days: &TradingCalendar,
    date_col: &str,
    symbols: &[Symbol],
) -> Result<DataFrame, UtilsError> {
    let expanded = expand_factor_table(factor_table, trading_days, date_col)?;
    let available = instrument_columns(&expanded, date_col);

    let selected: Vec<&str> = if symbols.is_empty() {
        available.iter().map(String::as_str).collect()
    } else {
        let picked: Vec<&str> = symbols
            .iter()
            .map(Symbol::as_str)
            .filter(|s| available.iter().any(|a| a.as_str() == *s))
            .collect();
        if picked.len() < symbols.len() {
            debug!(requested = symbols.len(), found = picked.len(), "ignoring unknown symbols");
        }
        picked
    };

    wide_to_long(&expanded, date_col, &selected)
}

fn instrument_columns(df: &DataFrame, date_col: &str) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != date_col)
        .map(|name| name.to_string())
        .collect()
}

fn empty_long_frame() -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        date_series(columns::DATE, &[])?.into(),
        Series::new_empty(columns::SYMBOL.into(), &DataType::String).into(),
        Series::new_empty(columns::VALUE.into(), &DataType::Float64).into(),
    ])
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tamsui_calendar::dates_of;
    use tamsui_primitives::Date;

    use super::*;

    fn d(m: u32, day: u32) -> Date {
        Date::from_ymd_opt(2024, m, day).unwrap()
    }

    fn factor_table(dates: &[Date], columns: &[(&str, &[Option<f64>])]) -> DataFrame {
        let mut cols: Vec<Column> = vec![date_series("date", dates).unwrap().into()];
        cols.extend(columns.iter().map(|(name, values)| Column::new((*name).into(), *values)));
        DataFrame::new(cols).unwrap()
    }

    fn values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name).unwrap().f64().unwrap().into_iter().collect()
    }

    fn dates(df: &DataFrame, name: &str) -> Vec<Date> {
        dates_of(df.column(name).unwrap()).unwrap().into_iter().flatten().collect()
    }

    #[test]
    fn forward_fills_within_trading_range() {
        let table = factor_table(&[d(1, 2)], &[("A", &[Some(100.0)])]);
        let days = TradingCalendar::new(vec![d(1, 1), d(1, 2), d(1, 3), d(1, 4)]).unwrap();

        let out = expand_factor_table(&table, &days, "date").unwrap();

        assert_eq!(out.height(), 4);
        assert_eq!(dates(&out, "date"), vec![d(1, 1), d(1, 2), d(1, 3), d(1, 4)]);
        assert_eq!(values(&out, "A"), vec![None, Some(100.0), Some(100.0), Some(100.0)]);
    }

    #[test]
    fn fills_between_two_disclosures() {
        let table = factor_table(&[d(1, 1), d(1, 10)], &[("A", &[Some(100.0), Some(110.0)])]);
        let days = TradingCalendar::new(vec![d(1, 1), d(1, 2), d(1, 3), d(1, 10)]).unwrap();

        let out = expand_factor_table(&table, &days, "date").unwrap();

        assert_eq!(out.height(), 4);
        let got = dates(&out, "date");
        assert_eq!(got.first(), Some(&d(1, 1)));
        assert_eq!(got.last(), Some(&d(1, 10)));
        assert_eq!(values(&out, "A"), vec![Some(100.0), Some(100.0), Some(100.0), Some(110.0)]);
    }

    #[test]
    fn earlier_disclosure_seeds_range_and_is_trimmed() {
        let table = factor_table(
            &[d(1, 1), d(3, 1), d(9, 1)],
            &[("A", &[Some(1.0), Some(2.0), Some(3.0)]), ("B", &[None, Some(5.0), None])],
        );
        let days = TradingCalendar::new(vec![d(2, 1), d(3, 1), d(4, 1)]).unwrap();

        let out = expand_factor_table(&table, &days, "date").unwrap();

        assert_eq!(dates(&out, "date"), vec![d(2, 1), d(3, 1), d(4, 1)]);
        assert_eq!(values(&out, "A"), vec![Some(1.0), Some(2.0), Some(2.0)]);
        assert_eq!(values(&out, "B"), vec![None, Some(5.0), Some(5.0)]);
    }

    #[test]
    fn off_grid_disclosure_inside_range_is_kept() {
        let table = factor_table(&[d(1, 6)], &[("A", &[Some(7.0)])]);
        let days = TradingCalendar::new(vec![d(1, 5), d(1, 8)]).unwrap();

        let out = expand_factor_table(&table, &days, "date").unwrap();

        assert_eq!(dates(&out, "date"), vec![d(1, 5), d(1, 6), d(1, 8)]);
        assert_eq!(values(&out, "A"), vec![None, Some(7.0), Some(7.0)]);
    }

    #[test]
    fn expansion_is_idempotent() {
        let table = factor_table(
            &[d(1, 1), d(2, 15)],
            &[("A", &[Some(1.0), Some(2.0)]), ("B", &[Some(3.0), None])],
        );
        let days = TradingCalendar::new(d(1, 1).iter_days().take(90).collect()).unwrap();

        let once = expand_factor_table(&table, &days, "date").unwrap();
        let twice = expand_factor_table(&once, &days, "date").unwrap();

        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn missing_date_column() {
        let table = df!("day" => [1i32], "A" => [1.0]).unwrap();
        let days = TradingCalendar::new(vec![d(1, 1)]).unwrap();
        assert!(matches!(
            expand_factor_table(&table, &days, "date"),
            Err(UtilsError::MissingColumn(c)) if c == "date"
        ));
    }

    #[test]
    fn reshapes_wide_to_long() {
        let wide = factor_table(
            &[d(1, 2), d(1, 1)],
            &[("2330", &[Some(2.0), Some(1.0)]), ("2317", &[None, Some(3.0)])],
        );
        let long = wide_to_long(&wide, "date", &["2330", "2317"]).unwrap();

        assert_eq!(long.height(), 4);
        assert_eq!(dates(&long, columns::DATE), vec![d(1, 1), d(1, 1), d(1, 2), d(1, 2)]);
        let symbols: Vec<Option<&str>> =
            long.column(columns::SYMBOL).unwrap().str().unwrap().into_iter().collect();
        assert_eq!(symbols, vec![Some("2317"), Some("2330"), Some("2317"), Some("2330")]);
        assert_eq!(values(&long, columns::VALUE), vec![Some(3.0), Some(1.0), None, Some(2.0)]);
    }

    #[rstest]
    #[case(&[], 3)]
    #[case(&["A"], 1)]
    #[case(&["A", "ZZZ"], 1)]
    #[case::no_match_is_empty(&["ZZZ"], 0)]
    fn expand_to_long_subsets(#[case] subset: &[&str], #[case] instruments: usize) {
        let table = factor_table(
            &[d(1, 1)],
            &[("A", &[Some(1.0)]), ("B", &[Some(2.0)]), ("C", &[Some(3.0)])],
        );
        let days = TradingCalendar::new(vec![d(1, 1), d(1, 2)]).unwrap();
        let subset: Vec<Symbol> = subset.iter().map(|&s| Symbol::from(s)).collect();

        let long = expand_to_long(&table, &days, "date", &subset).unwrap();

        assert_eq!(long.height(), instruments * 2);
        assert_eq!(long.width(), 3);
    }
}
