//! Typed builder for wide quarterly factor tables.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;
use tamsui_calendar::date_series;
use tamsui_primitives::{Date, Symbol, columns};

/// Sparse quarterly observations keyed by disclosure date, then instrument.
///
/// [`QuarterlyTable::to_frame`] produces the wide layout expected by
/// [`expand_factor_table`](crate::expand_factor_table): a `date` column and
/// one nullable float column per instrument, instruments in symbol order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuarterlyTable {
    rows: BTreeMap<Date, BTreeMap<Symbol, Option<f64>>>,
}

impl QuarterlyTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `symbol` disclosed on `date`, replacing any earlier entry.
    pub fn insert(&mut self, date: Date, symbol: impl Into<Symbol>, value: Option<f64>) {
        self.rows.entry(date).or_default().insert(symbol.into(), value);
    }

    /// Builder-style [`QuarterlyTable::insert`].
    #[must_use]
    pub fn with(mut self, date: Date, symbol: impl Into<Symbol>, value: Option<f64>) -> Self {
        self.insert(date, symbol, value);
        self
    }

    /// Value for `symbol` on `date`; `None` when absent or null.
    #[must_use]
    pub fn get(&self, date: Date, symbol: &Symbol) -> Option<f64> {
        self.rows.get(&date).and_then(|row| row.get(symbol)).copied().flatten()
    }

    /// Disclosure dates, ascending.
    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.rows.keys().copied()
    }

    /// Every instrument seen on any date.
    #[must_use]
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        self.rows.values().flat_map(|row| row.keys().cloned()).collect()
    }

    /// Number of disclosure dates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no dates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a wide polars frame.
    ///
    /// # Errors
    /// Returns a polars error if the frame cannot be assembled.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let dates: Vec<Date> = self.dates().collect();
        let mut cols: Vec<Column> = vec![date_series(columns::DATE, &dates)?.into()];

        for symbol in self.symbols() {
            let values: Vec<Option<f64>> = self
                .rows
                .values()
                .map(|row| row.get(&symbol).copied().flatten())
                .collect();
            cols.push(Column::new(symbol.as_str().into(), values));
        }

        DataFrame::new(cols)
    }
}
