#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tamsui/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod asset;
pub use asset::Symbol;

mod factor;
pub use factor::{FactorDirection, FactorName};

mod rank;
pub use rank::{FactorRecord, Rank, RankRecord};

mod weights;
pub use weights::{FactorWeights, WeightsError};

/// Re-export common date type.
pub type Date = chrono::NaiveDate;

/// Column names shared by every long-format frame in the workspace.
pub mod columns {
    /// Trading date (`Date` dtype).
    pub const DATE: &str = "date";
    /// Instrument ticker.
    pub const SYMBOL: &str = "symbol";
    /// Raw factor value.
    pub const VALUE: &str = "value";
    /// Single-factor cross-sectional rank.
    pub const RANK: &str = "rank";
    /// Composite rank produced by the weighted combiner.
    pub const WEIGHTED_RANK: &str = "weighted_rank";
    /// Factor name in stacked multi-factor frames.
    pub const FACTOR_NAME: &str = "factor_name";
}
