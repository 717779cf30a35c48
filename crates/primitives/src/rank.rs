//! Cross-sectional rank values and long-format records.

use serde::{Deserialize, Serialize};

use crate::{Date, Symbol};

/// Position of an instrument within a single date's cross-section.
///
/// Ranks start at 1. Tied values share the average of the positions they
/// span, so a rank may be fractional (`2.5`). Observations without a usable
/// value are kept as [`Rank::Unranked`] instead of being dropped.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub enum Rank {
    /// A ranked observation.
    Ranked(f64),
    /// The factor value was missing, so no rank could be assigned.
    #[default]
    Unranked,
}

impl Rank {
    /// Lift a nullable rank (as stored in a frame) into a [`Rank`].
    #[must_use]
    pub const fn from_option(rank: Option<f64>) -> Self {
        match rank {
            Some(r) => Self::Ranked(r),
            None => Self::Unranked,
        }
    }

    /// The rank value, if any.
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Ranked(r) => Some(r),
            Self::Unranked => None,
        }
    }

    /// Whether a rank was assigned.
    #[must_use]
    pub const fn is_ranked(self) -> bool {
        matches!(self, Self::Ranked(_))
    }

    /// Legacy encoding with `0` standing in for "unranked".
    #[must_use]
    pub const fn to_sentinel(self) -> f64 {
        match self {
            Self::Ranked(r) => r,
            Self::Unranked => 0.0,
        }
    }
}

impl From<Option<f64>> for Rank {
    fn from(rank: Option<f64>) -> Self {
        Self::from_option(rank)
    }
}

/// One `(date, symbol, value)` observation of a daily factor series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRecord {
    /// Trading date.
    pub date: Date,
    /// Instrument.
    pub symbol: Symbol,
    /// Factor value, `None` before the first disclosure.
    pub value: Option<f64>,
}

impl FactorRecord {
    /// Create a new record.
    #[must_use]
    pub fn new(date: Date, symbol: impl Into<Symbol>, value: Option<f64>) -> Self {
        Self { date, symbol: symbol.into(), value }
    }
}

/// One `(date, symbol, rank)` row of a rank table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankRecord {
    /// Trading date.
    pub date: Date,
    /// Instrument.
    pub symbol: Symbol,
    /// Rank within the date's cross-section.
    pub rank: Rank,
}

impl RankRecord {
    /// Create a new record.
    #[must_use]
    pub fn new(date: Date, symbol: impl Into<Symbol>, rank: Rank) -> Self {
        Self { date, symbol: symbol.into(), rank }
    }
}
