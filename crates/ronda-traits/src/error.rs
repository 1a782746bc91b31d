//! Error types for the ronda index engine.
//!
//! The first three variants are the pipeline's own failure modes: a stage run
//! out of order, a date range that resolves to nothing, and a table without
//! any trading dates. The rest describe bad input handed to the core by a
//! loader or a caller. Missing individual stock prices are never errors.

use thiserror::Error;

/// The main error type for ronda operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A stage was invoked before the outputs it depends on exist.
    #[error("Missing dependency: {stage} requires {requires}")]
    MissingDependency {
        /// The stage that was invoked.
        stage: &'static str,
        /// What had to be computed first.
        requires: String,
    },

    /// A requested date range resolves to an empty or inverted slice.
    #[error("Date resolution failed: {0}")]
    DateResolution(String),

    /// The price table has no trading dates.
    #[error("Empty calendar: the price table has no trading dates")]
    EmptyCalendar,

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a required column is missing from the data.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error when a date cannot be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Error when an index configuration is unusable.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl IndexError {
    /// Returns true for errors caused by the shape or content of the input data,
    /// as opposed to the way the pipeline was driven.
    #[must_use]
    pub const fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyCalendar
                | Self::InvalidData(_)
                | Self::MissingColumn(_)
                | Self::InvalidDate(_)
                | Self::Polars(_)
        )
    }
}

/// A specialized Result type for ronda operations.
pub type Result<T> = std::result::Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IndexError::MissingDependency {
            stage: "index_returns",
            requires: "weights".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing dependency: index_returns requires weights"
        );

        let err = IndexError::EmptyCalendar;
        assert_eq!(
            err.to_string(),
            "Empty calendar: the price table has no trading dates"
        );

        let err = IndexError::MissingColumn("Date".to_string());
        assert_eq!(err.to_string(), "Missing required column: Date");
    }

    #[test]
    fn test_data_vs_usage_errors() {
        assert!(IndexError::EmptyCalendar.is_data_error());
        assert!(IndexError::InvalidData("dup".to_string()).is_data_error());
        assert!(!IndexError::DateResolution("inverted".to_string()).is_data_error());
        assert!(
            !IndexError::MissingDependency {
                stage: "compound",
                requires: "index returns".to_string(),
            }
            .is_data_error()
        );
    }

    #[test]
    fn test_result_type() {
        let ok_result: Result<i32> = Ok(42);
        assert!(ok_result.is_ok());

        let err_result: Result<i32> = Err(IndexError::InvalidConfig("fail".to_string()));
        assert!(err_result.is_err());
    }
}
