//! CSV-backed price and factor sources.
//!
//! A data directory holds `prices.csv` (`date, symbol, open, high, low, close,
//! volume`) and one wide quarterly table per factor under `factors/`
//! (`factors/<name>.csv` with a `date` column and one column per symbol).

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use polars::prelude::*;
use tamsui_primitives::{Date, FactorName, columns};
use tamsui_traits::{FactorSource, PriceSource, SourceError};
use tracing::debug;

/// File name of the price table inside a data directory.
pub const PRICES_FILE: &str = "prices.csv";

/// Sub-directory holding quarterly factor tables.
pub const FACTORS_DIR: &str = "factors";

/// Read a CSV file lazily, parsing ISO dates.
///
/// # Errors
/// Returns [`SourceError::NotFound`] when the file does not exist.
pub fn scan_csv(path: &Path) -> Result<LazyFrame, SourceError> {
    Ok(csv_reader(path)?.finish()?)
}

/// Read a long-format CSV (one `symbol` column) lazily.
///
/// `symbol` is always read as text so tickers such as `0050` keep their
/// leading zeros.
///
/// # Errors
/// Returns [`SourceError::NotFound`] when the file does not exist.
pub fn scan_long_csv(path: &Path) -> Result<LazyFrame, SourceError> {
    let symbol = Schema::from_iter([Field::new(columns::SYMBOL.into(), DataType::String)]);
    Ok(csv_reader(path)?.with_dtype_overwrite(Some(Arc::new(symbol))).finish()?)
}

fn csv_reader(path: &Path) -> Result<LazyCsvReader, SourceError> {
    if !path.is_file() {
        return Err(SourceError::NotFound(path.display().to_string()));
    }
    Ok(LazyCsvReader::new(path).with_has_header(true).with_try_parse_dates(true))
}

/// Write `df` to `path` as CSV with a header.
///
/// # Errors
/// Returns an I/O or polars error if the file cannot be written.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), SourceError> {
    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Daily bars from `<dir>/prices.csv`.
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    path: PathBuf,
}

impl CsvPriceSource {
    /// Source reading the price table of data directory `dir`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(PRICES_FILE) }
    }

    /// Source reading an explicit CSV file.
    #[must_use]
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PriceSource for CsvPriceSource {
    fn load_prices(&self, start: Date, end: Date) -> Result<DataFrame, SourceError> {
        let prices = scan_long_csv(&self.path)?
            .with_column(col(columns::DATE).cast(DataType::Date))
            .filter(col(columns::DATE).gt_eq(lit(start)).and(col(columns::DATE).lt_eq(lit(end))))
            .collect()?;
        debug!(rows = prices.height(), path = %self.path.display(), "loaded prices");
        Ok(prices)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Quarterly factor tables from `<dir>/factors/<name>.csv`.
#[derive(Debug, Clone)]
pub struct CsvFactorSource {
    dir: PathBuf,
}

impl CsvFactorSource {
    /// Source reading the factor tables of data directory `dir`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().join(FACTORS_DIR) }
    }

    fn path_of(&self, name: &FactorName) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }
}

impl FactorSource for CsvFactorSource {
    fn available_factors(&self) -> Result<Vec<FactorName>, SourceError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.push(FactorName::new(stem));
            }
        }
        names.sort();
        Ok(names)
    }

    fn quarterly_factor(&self, name: &FactorName) -> Result<DataFrame, SourceError> {
        let table = scan_csv(&self.path_of(name))?
            .with_column(col(columns::DATE).cast(DataType::Date))
            .sort([columns::DATE], SortMultipleOptions::default())
            .collect()?;
        if table.width() < 2 {
            return Err(SourceError::Parse(format!("factor table {name} has no symbol columns")));
        }
        Ok(table)
    }

    fn name(&self) -> &str {
        "csv"
    }
}
