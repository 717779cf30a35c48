#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tamsui/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod expand;
pub use expand::{expand_factor_table, expand_to_long, wide_to_long};

mod table;
pub use table::QuarterlyTable;

mod select;
pub use select::top_n_by_group;

mod prices;
pub use prices::clean_ohlcv;

mod error;
pub use error::UtilsError;
