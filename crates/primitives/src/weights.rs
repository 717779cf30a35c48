//! Factor weight definitions.

use serde::{Deserialize, Serialize};

/// Errors raised when building factor weights.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightsError {
    /// No weights were supplied.
    #[error("weights must not be empty")]
    Empty,

    /// A weight is NaN or infinite.
    #[error("weight at position {index} is not finite: {value}")]
    NonFinite {
        /// Position in the weight list.
        index: usize,
        /// Offending value.
        value: f64,
    },
}

/// Per-factor weights used when combining rank tables.
///
/// Weights are not normalised; a multi-factor composite only depends on the
/// relative order of weighted rank sums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FactorWeights(Vec<f64>);

impl FactorWeights {
    /// Create weights from raw values.
    ///
    /// # Errors
    /// Returns [`WeightsError`] when the list is empty or holds non-finite values.
    pub fn new(weights: Vec<f64>) -> Result<Self, WeightsError> {
        if weights.is_empty() {
            return Err(WeightsError::Empty);
        }
        if let Some((index, &value)) = weights.iter().enumerate().find(|(_, w)| !w.is_finite()) {
            return Err(WeightsError::NonFinite { index, value });
        }
        Ok(Self(weights))
    }

    /// Equal weights `1/n` for `n` factors; `None` when `n` is zero.
    #[must_use]
    pub fn equal(n: usize) -> Option<Self> {
        (n > 0).then(|| Self(vec![1.0 / n as f64; n]))
    }

    /// Weights as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of weights.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed value; present for API symmetry.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<f64>> for FactorWeights {
    type Error = WeightsError;

    fn try_from(weights: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(weights)
    }
}

impl From<FactorWeights> for Vec<f64> {
    fn from(weights: FactorWeights) -> Self {
        weights.0
    }
}
