#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tamsui/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod quarter;
pub use quarter::{
    DisclosureWindow, FiscalQuarter, date_str_to_quarter, date_to_quarter, quarter_to_window,
};

mod trading;
pub use trading::{TradingCalendar, date_series, dates_of};

mod error;
pub use error::CalendarError;
