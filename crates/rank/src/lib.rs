#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tamsui/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod cross_section;
pub use cross_section::{
    RankXSection, factor_records, rank_factor, rank_records, rank_values, rank_xsection,
};

mod combine;
pub use combine::{WeightedRankCombiner, factor_combinations};

mod error;
pub use error::RankError;
