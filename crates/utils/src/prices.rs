//! Daily price cleaning.

use polars::prelude::*;
use tamsui_primitives::columns;
use tracing::info;

use crate::UtilsError;

const PRICE_COLS: [&str; 4] = ["open", "high", "low", "close"];

/// Normalise raw daily bars and flag untradeable sessions.
///
/// Expects `date`, `symbol`, `open`, `high`, `low`, `close` and `volume`.
/// Prices are forward filled per symbol and missing volume becomes 0; rows
/// whose close is still null are dropped. Adds `daily_return` (close-to-close
/// change per symbol) and three flags for sessions that printed a single
/// price on zero volume: `is_limit_up` / `is_limit_down` when the close moved
/// against the previous close, `is_suspended` when it did not.
///
/// Output is sorted by symbol, then date.
///
/// # Errors
/// Returns [`UtilsError::MissingColumn`] if an input column is absent, or a
/// polars error if evaluation fails.
pub fn clean_ohlcv(mut prices: LazyFrame) -> Result<DataFrame, UtilsError> {
    let schema = prices.collect_schema()?;
    for name in [columns::DATE, columns::SYMBOL, "volume"].into_iter().chain(PRICE_COLS) {
        if !schema.contains(name) {
            return Err(UtilsError::MissingColumn(name.to_string()));
        }
    }

    let by_symbol = [col(columns::SYMBOL)];
    let filled: Vec<Expr> = PRICE_COLS
        .iter()
        .map(|&c| col(c).cast(DataType::Float64).forward_fill(None).over(by_symbol.clone()))
        .collect();

    let prev_close = col("close").shift(lit(1)).over(by_symbol.clone());
    let single_print = col("volume")
        .eq(lit(0.0))
        .and(col("open").eq(col("close")))
        .and(col("high").eq(col("low")));
    let flag = |cond: Expr| single_print.clone().and(cond).fill_null(lit(false));

    let cleaned = prices
        .with_columns([
            col(columns::DATE).cast(DataType::Date),
            col(columns::SYMBOL).cast(DataType::String),
        ])
        .sort([columns::SYMBOL, columns::DATE], SortMultipleOptions::default())
        .with_columns(filled)
        .with_column(col("volume").cast(DataType::Float64).fill_null(lit(0.0)))
        .filter(col("close").is_not_null())
        .with_columns([
            (col("close") / prev_close.clone() - lit(1.0)).alias("daily_return"),
            flag(col("close").eq(prev_close.clone())).alias("is_suspended"),
            flag(col("close").gt(prev_close.clone())).alias("is_limit_up"),
            flag(col("close").lt(prev_close)).alias("is_limit_down"),
        ])
        .select([
            col(columns::DATE),
            col(columns::SYMBOL),
            col("open"),
            col("high"),
            col("low"),
            col("close"),
            col("volume"),
            col("daily_return"),
            col("is_suspended"),
            col("is_limit_up"),
            col("is_limit_down"),
        ])
        .collect()?;

    info!(rows = cleaned.height(), "cleaned daily bars");
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use tamsui_calendar::date_series;
    use tamsui_primitives::Date;

    use super::*;

    fn bars() -> LazyFrame {
        let dates: Vec<Date> = Date::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .iter_days()
            .take(4)
            .chain(Date::from_ymd_opt(2024, 3, 1).unwrap().iter_days().take(2))
            .collect();
        DataFrame::new(vec![
            date_series("date", &dates).unwrap().into(),
            Column::new("symbol".into(), ["2330", "2330", "2330", "2330", "1101", "1101"]),
            Column::new("open".into(), [Some(10.0), None, Some(11.0), Some(11.0), None, Some(5.0)]),
            Column::new("high".into(), [Some(10.5), None, Some(11.0), Some(11.0), None, Some(5.5)]),
            Column::new("low".into(), [Some(9.5), None, Some(11.0), Some(11.0), None, Some(4.5)]),
            Column::new(
                "close".into(),
                [Some(10.0), None, Some(11.0), Some(11.0), None, Some(5.0)],
            ),
            Column::new(
                "volume".into(),
                [Some(100.0), None, Some(0.0), Some(0.0), None, Some(10.0)],
            ),
        ])
        .unwrap()
        .lazy()
    }

    fn flags(df: &DataFrame, name: &str) -> Vec<bool> {
        df.column(name).unwrap().bool().unwrap().into_iter().map(|v| v.unwrap()).collect()
    }

    #[test]
    fn fills_drops_and_flags() {
        let df = clean_ohlcv(bars()).unwrap();

        // 1101's leading null close is dropped; 2330's gap is filled.
        assert_eq!(df.height(), 5);
        let symbols: Vec<Option<&str>> =
            df.column("symbol").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(
            symbols,
            vec![Some("1101"), Some("2330"), Some("2330"), Some("2330"), Some("2330")]
        );

        let close: Vec<Option<f64>> =
            df.column("close").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(close, vec![Some(5.0), Some(10.0), Some(10.0), Some(11.0), Some(11.0)]);
        let volume: Vec<Option<f64>> =
            df.column("volume").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(volume[2], Some(0.0));

        let ret = df.column("daily_return").unwrap().f64().unwrap();
        assert_eq!(ret.get(0), None);
        assert_eq!(ret.get(1), None);
        assert_relative_eq!(ret.get(2).unwrap(), 0.0);
        assert_relative_eq!(ret.get(3).unwrap(), 0.1, epsilon = 1e-12);

        assert_eq!(flags(&df, "is_limit_up"), vec![false, false, false, true, false]);
        assert_eq!(flags(&df, "is_suspended"), vec![false, false, false, false, true]);
        assert_eq!(flags(&df, "is_limit_down"), vec![false; 5]);
    }

    #[test]
    fn rejects_missing_columns() {
        let lf = df!("date" => [1i32], "symbol" => ["A"]).unwrap().lazy();
        assert!(matches!(clean_ohlcv(lf), Err(UtilsError::MissingColumn(_))));
    }
}
