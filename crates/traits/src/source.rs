//! Data source trait definitions.

use polars::prelude::*;
use tamsui_primitives::{Date, FactorName};

/// Errors raised by data sources.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The requested dataset does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Underlying I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The data could be read but not interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl SourceError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Supplies daily price bars.
///
/// Frames carry `date`, `symbol`, `open`, `high`, `low`, `close` and
/// `volume`, restricted to `[start, end]` inclusive.
pub trait PriceSource: Send + Sync {
    /// Load bars for every available instrument between `start` and `end`.
    fn load_prices(&self, start: Date, end: Date) -> Result<DataFrame, SourceError>;

    /// Returns the name of this source.
    fn name(&self) -> &str;
}

/// Supplies sparse quarterly factor tables.
///
/// A quarterly table is wide: a `date` column plus one nullable float column
/// per instrument, one row per disclosure date.
pub trait FactorSource: Send + Sync {
    /// Factor names this source can serve.
    fn available_factors(&self) -> Result<Vec<FactorName>, SourceError>;

    /// Load the quarterly table for `name`.
    fn quarterly_factor(&self, name: &FactorName) -> Result<DataFrame, SourceError>;

    /// Returns the name of this source.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct InMemory(HashMap<FactorName, DataFrame>);

    impl FactorSource for InMemory {
        fn available_factors(&self) -> Result<Vec<FactorName>, SourceError> {
            let mut names: Vec<_> = self.0.keys().cloned().collect();
            names.sort();
            Ok(names)
        }

        fn quarterly_factor(&self, name: &FactorName) -> Result<DataFrame, SourceError> {
            self.0.get(name).cloned().ok_or_else(|| SourceError::NotFound(name.to_string()))
        }

        fn name(&self) -> &str {
            "memory"
        }
    }

    #[test]
    fn trait_objects_dispatch() {
        let df = df!("date" => [1i32], "2330" => [0.1]).unwrap();
        let source: Box<dyn FactorSource> =
            Box::new(InMemory(HashMap::from([(FactorName::new("roe"), df)])));

        assert_eq!(source.available_factors().unwrap(), vec![FactorName::new("roe")]);
        assert_eq!(source.quarterly_factor(&FactorName::new("roe")).unwrap().height(), 1);
        assert!(matches!(
            source.quarterly_factor(&FactorName::new("pe")),
            Err(SourceError::NotFound(n)) if n == "pe"
        ));
    }

    #[test]
    fn only_io_is_recoverable() {
        let io = SourceError::Io(std::io::Error::other("reset"));
        assert!(io.is_recoverable());
        assert!(!SourceError::Parse("bad".into()).is_recoverable());
        assert_eq!(SourceError::NotFound("roe".into()).to_string(), "not found: roe");
    }
}
