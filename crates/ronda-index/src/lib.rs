//! Month-end rank-weighted equity index pipeline.
//!
//! This crate turns a table of daily stock prices into an index level series:
//! - End-of-month anchor detection over the trading calendar
//! - Price-rank weight tiers (50% / 25% / 25%) held between anchors
//! - Simple daily stock returns
//! - Index returns from the weights held two trading dates earlier
//! - Compounding from a base level of 100 at a chosen start date
//!
//! # Example
//!
//! ```rust,ignore
//! use ronda_index::{IndexConfig, IndexModel, IndexSummary};
//!
//! let mut model = IndexModel::new(table, IndexConfig::default())?;
//! let levels = model.calc_index_level(start, end)?;
//! let summary = IndexSummary::from_points(&model.levels().unwrap().slice(start, end)?);
//! ```

pub mod aggregate;
pub mod config;
pub mod eom;
pub mod level;
pub mod pipeline;
pub mod returns;
pub mod summary;
pub mod weights;

// Re-export main types
pub use aggregate::{IndexReturnAggregator, IndexReturnSeries};
pub use config::{IndexConfig, RETURN_LAG};
pub use eom::{EomFlags, end_of_month_flags};
pub use level::{IndexLevelCompounder, IndexLevelSeries, LevelPoint};
pub use pipeline::{IndexModel, Stage, compute_index_levels, compute_weights};
pub use returns::{ReturnSeries, daily_returns};
pub use summary::IndexSummary;
pub use weights::{Rebalance, WeightAllocator, WeightSeries};
