//! Typed analysis settings.
//!
//! Settings are read from a YAML file with one section per workflow:
//!
//! ```yaml
//! single_factor_analysis:
//!   factor: roe
//!   start: 2020-01-01
//!   end: 2023-12-31
//!   quantiles: 5
//!   periods: [1, 5, 10]
//! multi_factor_analysis:
//!   factors: [roe, pb, operating_margin]
//!   combo_size: 2
//!   weights: [0.6, 0.4]
//!   positive_corr: true
//! ```
//!
//! Command-line values override file values, which override the defaults.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tamsui_primitives::{FactorDirection, FactorName, FactorWeights};
use tracing::warn;

/// Default number of quantile buckets.
pub const DEFAULT_QUANTILES: u32 = 5;

/// Default forward-return periods, in sessions.
pub const DEFAULT_PERIODS: [usize; 3] = [1, 5, 10];

/// Default number of factors per combination.
pub const DEFAULT_COMBO_SIZE: usize = 5;

/// Errors raised while loading or resolving settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid YAML for [`Settings`].
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A required value was given neither on the command line nor in the file.
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// A value is out of range.
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// File-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Single-factor tear sheet.
    pub single_factor_analysis: SectionSettings,
    /// Weighted-rank multi-factor tear sheets.
    pub multi_factor_analysis: SectionSettings,
}

/// One workflow section. Every field is optional; see [`Overrides`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionSettings {
    /// Factor name (single-factor).
    pub factor: Option<String>,
    /// Factor names (multi-factor).
    pub factors: Option<Vec<String>>,
    /// First analysis date.
    pub start: Option<NaiveDate>,
    /// Last analysis date.
    pub end: Option<NaiveDate>,
    /// Quantile buckets.
    pub quantiles: Option<u32>,
    /// Forward-return periods.
    pub periods: Option<Vec<usize>>,
    /// Factors per combination.
    pub combo_size: Option<usize>,
    /// Per-factor weights; must match the combination size.
    pub weights: Option<Vec<f64>>,
    /// Whether larger factor values predict larger returns.
    pub positive_corr: Option<bool>,
}

/// Command-line values that take precedence over [`Settings`].
#[derive(Debug, Clone, Default, PartialEq, clap::Args)]
pub struct Overrides {
    /// Factor name (single-factor)
    #[arg(long)]
    pub factor: Option<String>,
    /// Comma-separated factor names (multi-factor)
    #[arg(long, value_delimiter = ',')]
    pub factors: Option<Vec<String>>,
    /// First analysis date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Last analysis date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// Number of quantile buckets
    #[arg(long)]
    pub quantiles: Option<u32>,
    /// Comma-separated forward-return periods
    #[arg(long, value_delimiter = ',')]
    pub periods: Option<Vec<usize>>,
    /// Factors per combination (multi-factor)
    #[arg(long)]
    pub combo_size: Option<usize>,
    /// Comma-separated weights, one per factor in a combination
    #[arg(long, value_delimiter = ',')]
    pub weights: Option<Vec<f64>>,
    /// Treat factors as negatively correlated with returns
    #[arg(long, conflicts_with = "positive")]
    pub negative: bool,
    /// Treat factors as positively correlated with returns
    #[arg(long)]
    pub positive: bool,
}

impl Overrides {
    fn positive_corr(&self) -> Option<bool> {
        match (self.positive, self.negative) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Resolved single-factor parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleFactorParams {
    /// Factor to analyse.
    pub factor: FactorName,
    /// First analysis date.
    pub start: NaiveDate,
    /// Last analysis date.
    pub end: NaiveDate,
    /// Quantile buckets.
    pub quantiles: u32,
    /// Forward-return periods.
    pub periods: Vec<usize>,
}

/// Resolved multi-factor parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiFactorParams {
    /// Candidate factors.
    pub factors: Vec<FactorName>,
    /// First analysis date.
    pub start: NaiveDate,
    /// Last analysis date.
    pub end: NaiveDate,
    /// Quantile buckets.
    pub quantiles: u32,
    /// Forward-return periods.
    pub periods: Vec<usize>,
    /// Factors per combination, capped at the number of factors.
    pub combo_size: usize,
    /// One weight per factor in a combination.
    pub weights: FactorWeights,
    /// Ranking direction.
    pub direction: FactorDirection,
}

impl Settings {
    /// Read settings from a YAML file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] or [`ConfigError::Yaml`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Parse settings from YAML text.
    ///
    /// # Errors
    /// Returns [`ConfigError::Yaml`] when the text does not match [`Settings`].
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Merge the single-factor section with `cli`.
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] when the factor or a date is absent and
    /// [`ConfigError::Invalid`] for an empty range or zero quantiles.
    pub fn resolve_single(&self, cli: &Overrides) -> Result<SingleFactorParams, ConfigError> {
        let file = &self.single_factor_analysis;
        let common = Common::resolve(file, cli)?;
        let factor = cli
            .factor
            .clone()
            .or_else(|| file.factor.clone())
            .ok_or(ConfigError::Missing("factor"))?;

        Ok(SingleFactorParams {
            factor: FactorName::new(factor),
            start: common.start,
            end: common.end,
            quantiles: common.quantiles,
            periods: common.periods,
        })
    }

    /// Merge the multi-factor section with `cli`.
    ///
    /// Weights that are missing, not finite, or whose count differs from the
    /// combination size fall back to equal weights.
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] when no factors or dates are given and
    /// [`ConfigError::Invalid`] for an empty range, zero quantiles or a zero
    /// combination size.
    pub fn resolve_multi(&self, cli: &Overrides) -> Result<MultiFactorParams, ConfigError> {
        let file = &self.multi_factor_analysis;
        let common = Common::resolve(file, cli)?;

        let factors: Vec<FactorName> = cli
            .factors
            .clone()
            .or_else(|| file.factors.clone())
            .unwrap_or_default()
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .map(FactorName::new)
            .collect();
        if factors.is_empty() {
            return Err(ConfigError::Missing("factors"));
        }

        let combo_size =
            cli.combo_size.or(file.combo_size).unwrap_or(DEFAULT_COMBO_SIZE).min(factors.len());
        if combo_size == 0 {
            return Err(ConfigError::Invalid("combo_size must be at least 1".to_string()));
        }

        let raw_weights = cli.weights.as_ref().or(file.weights.as_ref());
        let weights = parse_weights(raw_weights, combo_size)?;

        Ok(MultiFactorParams {
            factors,
            start: common.start,
            end: common.end,
            quantiles: common.quantiles,
            periods: common.periods,
            combo_size,
            weights,
            direction: common.direction,
        })
    }
}

struct Common {
    start: NaiveDate,
    end: NaiveDate,
    quantiles: u32,
    periods: Vec<usize>,
    direction: FactorDirection,
}

impl Common {
    fn resolve(file: &SectionSettings, cli: &Overrides) -> Result<Self, ConfigError> {
        let start = cli.start.or(file.start).ok_or(ConfigError::Missing("start"))?;
        let end = cli.end.or(file.end).ok_or(ConfigError::Missing("end"))?;
        if start > end {
            return Err(ConfigError::Invalid(format!("start {start} is after end {end}")));
        }

        let quantiles = cli.quantiles.or(file.quantiles).unwrap_or(DEFAULT_QUANTILES);
        if quantiles == 0 {
            return Err(ConfigError::Invalid("quantiles must be at least 1".to_string()));
        }

        let periods = cli
            .periods
            .clone()
            .or_else(|| file.periods.clone())
            .unwrap_or_else(|| DEFAULT_PERIODS.to_vec());
        if periods.is_empty() || periods.contains(&0) {
            return Err(ConfigError::Invalid(format!("periods must be positive, got {periods:?}")));
        }

        let positive = cli.positive_corr().or(file.positive_corr).unwrap_or(true);
        Ok(Self {
            start,
            end,
            quantiles,
            periods,
            direction: FactorDirection::from_positive_corr(positive),
        })
    }
}

fn parse_weights(raw: Option<&Vec<f64>>, combo_size: usize) -> Result<FactorWeights, ConfigError> {
    let equal = || {
        FactorWeights::equal(combo_size)
            .ok_or_else(|| ConfigError::Invalid("combo_size must be at least 1".to_string()))
    };

    let Some(raw) = raw else {
        return equal();
    };

    match FactorWeights::new(raw.clone()) {
        Ok(weights) if weights.len() == combo_size => Ok(weights),
        _ => {
            warn!(
                ?raw,
                combo_size,
                "weights do not match the combination size, using equal weights"
            );
            equal()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    const YAML: &str = "
single_factor_analysis:
  factor: roe
  start: 2020-01-01
  end: 2020-12-31
  quantiles: 10
multi_factor_analysis:
  factors: [roe, pb, margin]
  start: 2021-01-01
  end: 2021-06-30
  combo_size: 2
  weights: [0.7, 0.3]
  positive_corr: false
";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn file_values_fill_gaps() {
        let settings = Settings::from_yaml(YAML).unwrap();
        let single = settings.resolve_single(&Overrides::default()).unwrap();

        assert_eq!(single.factor, FactorName::new("roe"));
        assert_eq!(single.start, date(2020, 1, 1));
        assert_eq!(single.quantiles, 10);
        assert_eq!(single.periods, DEFAULT_PERIODS.to_vec());
    }

    #[test]
    fn cli_wins_over_file() {
        let settings = Settings::from_yaml(YAML).unwrap();
        let cli = Overrides {
            factor: Some("pb".into()),
            end: Some(date(2020, 6, 30)),
            periods: Some(vec![20]),
            ..Overrides::default()
        };
        let single = settings.resolve_single(&cli).unwrap();

        assert_eq!(single.factor, FactorName::new("pb"));
        assert_eq!(single.start, date(2020, 1, 1));
        assert_eq!(single.end, date(2020, 6, 30));
        assert_eq!(single.periods, vec![20]);
    }

    #[test]
    fn multi_factor_section() {
        let settings = Settings::from_yaml(YAML).unwrap();
        let multi = settings.resolve_multi(&Overrides::default()).unwrap();

        assert_eq!(multi.factors.len(), 3);
        assert_eq!(multi.combo_size, 2);
        assert_eq!(multi.weights.as_slice(), &[0.7, 0.3]);
    }

    #[rstest]
    #[case(false, false, FactorDirection::Negative)]
    #[case(true, false, FactorDirection::Positive)]
    #[case(false, true, FactorDirection::Negative)]
    fn direction_flags_override_file(
        #[case] positive: bool,
        #[case] negative: bool,
        #[case] expected: FactorDirection,
    ) {
        let settings = Settings::from_yaml(YAML).unwrap();
        let cli = Overrides { positive, negative, ..Overrides::default() };
        assert_eq!(settings.resolve_multi(&cli).unwrap().direction, expected);
    }

    #[test]
    fn mismatched_weights_fall_back_to_equal() {
        let settings = Settings::from_yaml(YAML).unwrap();
        let cli = Overrides { combo_size: Some(3), ..Overrides::default() };
        let multi = settings.resolve_multi(&cli).unwrap();

        assert_eq!(multi.combo_size, 3);
        for &w in multi.weights.as_slice() {
            assert_relative_eq!(w, 1.0 / 3.0);
        }
    }

    #[test]
    fn combo_size_is_capped_by_factor_count() {
        let settings = Settings::from_yaml(YAML).unwrap();
        let cli = Overrides { combo_size: Some(9), ..Overrides::default() };
        assert_eq!(settings.resolve_multi(&cli).unwrap().combo_size, 3);
    }

    #[test]
    fn validation_errors() {
        let settings = Settings::default();
        assert!(matches!(
            settings.resolve_single(&Overrides::default()),
            Err(ConfigError::Missing("start"))
        ));

        let cli = Overrides {
            start: Some(date(2021, 1, 1)),
            end: Some(date(2020, 1, 1)),
            factor: Some("roe".into()),
            ..Overrides::default()
        };
        assert!(matches!(settings.resolve_single(&cli), Err(ConfigError::Invalid(_))));

        let cli = Overrides {
            start: Some(date(2020, 1, 1)),
            end: Some(date(2021, 1, 1)),
            ..Overrides::default()
        };
        assert!(matches!(settings.resolve_single(&cli), Err(ConfigError::Missing("factor"))));
        assert!(matches!(settings.resolve_multi(&cli), Err(ConfigError::Missing("factors"))));
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let settings = Settings::from_path(file.path()).unwrap();
        assert_eq!(settings.single_factor_analysis.factor.as_deref(), Some("roe"));
        assert!(matches!(
            Settings::from_yaml("single_factor_analysis: 3"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
