//! Factor-related type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a fundamental factor, e.g. `營業利益` or `ROE稅後`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorName(pub String);

impl FactorName {
    /// Create a new factor name.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the factor name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FactorName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FactorName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for FactorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Correlation between a factor and forward returns.
///
/// The direction decides how a factor is ranked. A positively correlated
/// factor is ranked ascending, so the smallest (worst) value gets rank 1 and
/// the best instruments end up with the largest ranks. A negatively correlated
/// factor is ranked descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorDirection {
    /// Larger values predict larger forward returns.
    #[default]
    Positive,
    /// Larger values predict smaller forward returns.
    Negative,
}

impl FactorDirection {
    /// Build a direction from a `positive_corr` flag.
    #[must_use]
    pub const fn from_positive_corr(positive_corr: bool) -> Self {
        if positive_corr { Self::Positive } else { Self::Negative }
    }

    /// Whether ranks are assigned in ascending value order.
    #[must_use]
    pub const fn ascending(self) -> bool {
        matches!(self, Self::Positive)
    }
}

impl fmt::Display for FactorDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
        }
    }
}
