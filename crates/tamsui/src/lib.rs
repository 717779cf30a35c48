//! # tamsui
//!
//! Cross-sectional factor ranking for Taiwan equities: expand quarterly
//! fundamentals onto the trading calendar, rank every cross-section, and
//! blend several factor rankings into one composite.
//!
//! This crate provides a unified interface to the tamsui workspace.
//! Individual components can be enabled via feature flags.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Core type definitions
//! - `calendar`: Fiscal-quarter disclosure windows and trading calendars
//! - `traits`: Price and factor source abstractions
//! - `rank`: Cross-sectional ranking and weighted rank combination
//! - `utils`: Quarterly-to-daily expansion and data cleaning
//! - `analysis`: Forward returns, quantiles and rank IC
//! - `cli`: Typed configuration, logging, CSV sources and the `tamsui` binary
//!
//! ## Example
//!
//! ```rust,ignore
//! use tamsui::rank::{WeightedRankCombiner, rank_factor};
//!
//! let roe = rank_factor(roe_daily, true)?;
//! let pb = rank_factor(pb_daily, false)?;
//! let composite = WeightedRankCombiner::new(true).combine(&[roe.lazy(), pb.lazy()], &[0.5, 0.5])?;
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use tamsui_primitives as primitives;
#[cfg(feature = "calendar")]
#[doc(inline)]
pub use tamsui_calendar as calendar;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use tamsui_traits as traits;
#[cfg(feature = "rank")]
#[doc(inline)]
pub use tamsui_rank as rank;
#[cfg(feature = "utils")]
#[doc(inline)]
pub use tamsui_utils as utils;
#[cfg(feature = "analysis")]
#[doc(inline)]
pub use tamsui_analysis as analysis;

#[cfg(feature = "cli")]
pub mod config;
#[cfg(feature = "cli")]
pub mod logging;
#[cfg(feature = "cli")]
pub mod pipeline;
#[cfg(feature = "cli")]
pub mod sources;
