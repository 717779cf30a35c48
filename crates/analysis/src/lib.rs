#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tamsui/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod returns;
pub use returns::{forward_return_col, forward_returns};

mod quantile;
pub use quantile::{QUANTILE, factor_quantiles};

mod ic;
pub use ic::{ic_series, rank_ic};

mod tearsheet;
pub use tearsheet::{PeriodSummary, TearSheet};

mod error;
pub use error::AnalysisError;
