#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types for the ronda equity index engine.
//!
//! This crate provides the shared vocabulary of the index pipeline: the
//! trading calendar, the price table the pipeline reads, and the error
//! taxonomy every stage reports through.

/// The version of the ronda-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod calendar;
pub mod error;
pub mod types;

// Re-exports
pub use calendar::Calendar;
pub use error::{IndexError, Result};
pub use types::{Date, PriceTable, StockId, TableSchema};
