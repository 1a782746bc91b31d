//! Performance summary of an index level series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::level::LevelPoint;

/// Trading days per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

/// Summary statistics over a run of index levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSummary {
    /// First date in the window
    pub start_date: NaiveDate,
    /// Last date in the window
    pub end_date: NaiveDate,
    /// Number of levels
    pub n_obs: usize,
    /// Level on the first date
    pub start_level: f64,
    /// Level on the last date
    pub end_level: f64,
    /// Total return over the window
    pub total_return: f64,
    /// Annualized return
    pub annualized_return: f64,
    /// Annualized volatility of daily returns
    pub annualized_volatility: f64,
    /// Sharpe ratio (annualized, zero risk-free rate)
    pub sharpe_ratio: f64,
    /// Maximum peak-to-trough decline, as a fraction of the peak
    pub max_drawdown: f64,
}

impl IndexSummary {
    /// Summarize a window of index levels.
    ///
    /// Returns `None` for an empty window. Statistics that need at least two
    /// daily returns are `NaN` when there are fewer.
    pub fn from_points(points: &[LevelPoint]) -> Option<Self> {
        let first = points.first()?;
        let last = points.last()?;

        let levels: Vec<f64> = points.iter().map(|p| p.level).collect();
        let returns: Vec<f64> = levels.windows(2).map(|w| w[1] / w[0] - 1.0).collect();

        let total_return = last.level / first.level - 1.0;
        let n_years = returns.len() as f64 / TRADING_DAYS_PER_YEAR as f64;
        let annualized_return = if n_years > 0.0 {
            (1.0 + total_return).powf(1.0 / n_years) - 1.0
        } else {
            f64::NAN
        };

        Some(Self {
            start_date: first.date,
            end_date: last.date,
            n_obs: points.len(),
            start_level: first.level,
            end_level: last.level,
            total_return,
            annualized_return,
            annualized_volatility: Self::calculate_volatility(&returns, TRADING_DAYS_PER_YEAR),
            sharpe_ratio: Self::calculate_sharpe(&returns, TRADING_DAYS_PER_YEAR),
            max_drawdown: Self::calculate_max_drawdown(&levels),
        })
    }

    /// Annualized sample standard deviation of returns.
    pub fn calculate_volatility(returns: &[f64], trading_days_per_year: usize) -> f64 {
        let valid: Vec<f64> = returns.iter().copied().filter(|x| x.is_finite()).collect();
        if valid.len() < 2 {
            return f64::NAN;
        }

        let mean = valid.iter().sum::<f64>() / valid.len() as f64;
        let variance =
            valid.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (valid.len() - 1) as f64;
        variance.sqrt() * (trading_days_per_year as f64).sqrt()
    }

    /// Calculate Sharpe ratio from returns.
    pub fn calculate_sharpe(returns: &[f64], trading_days_per_year: usize) -> f64 {
        let valid: Vec<f64> = returns.iter().copied().filter(|x| x.is_finite()).collect();
        if valid.len() < 2 {
            return f64::NAN;
        }

        let mean = valid.iter().sum::<f64>() / valid.len() as f64;
        let vol = Self::calculate_volatility(&valid, trading_days_per_year);

        if vol == 0.0 {
            f64::NAN
        } else {
            mean * trading_days_per_year as f64 / vol
        }
    }

    /// Calculate maximum drawdown of a level series.
    pub fn calculate_max_drawdown(levels: &[f64]) -> f64 {
        let mut max_dd = 0.0;
        let mut peak = f64::NEG_INFINITY;

        for &level in levels {
            if level > peak {
                peak = level;
            }
            if peak > 0.0 {
                let dd = (peak - level) / peak;
                if dd > max_dd {
                    max_dd = dd;
                }
            }
        }

        max_dd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn points(levels: &[f64]) -> Vec<LevelPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        levels
            .iter()
            .enumerate()
            .map(|(i, &level)| LevelPoint {
                date: start + chrono::Duration::days(i as i64),
                level,
            })
            .collect()
    }

    #[test]
    fn test_empty_window() {
        assert!(IndexSummary::from_points(&[]).is_none());
    }

    #[test]
    fn test_single_point() {
        let summary = IndexSummary::from_points(&points(&[100.0])).unwrap();
        assert_eq!(summary.n_obs, 1);
        assert_eq!(summary.total_return, 0.0);
        assert!(summary.annualized_return.is_nan());
        assert!(summary.sharpe_ratio.is_nan());
        assert_eq!(summary.max_drawdown, 0.0);
    }

    #[test]
    fn test_summary_values() {
        let summary = IndexSummary::from_points(&points(&[100.0, 110.0, 99.0, 121.0])).unwrap();
        assert_relative_eq!(summary.total_return, 0.21, epsilon = 1e-12);
        assert_relative_eq!(summary.max_drawdown, 0.1, epsilon = 1e-12);
        assert_eq!(summary.start_level, 100.0);
        assert_eq!(summary.end_level, 121.0);
        assert!(summary.annualized_volatility > 0.0);
        assert!(summary.sharpe_ratio.is_finite());
    }

    #[test]
    fn test_flat_series_has_undefined_sharpe() {
        let summary = IndexSummary::from_points(&points(&[100.0, 100.0, 100.0])).unwrap();
        assert_eq!(summary.annualized_volatility, 0.0);
        assert!(summary.sharpe_ratio.is_nan());
    }

    #[test]
    fn test_calculate_max_drawdown() {
        let dd = IndexSummary::calculate_max_drawdown(&[100.0, 120.0, 90.0, 130.0, 117.0]);
        assert_relative_eq!(dd, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_summary_serializes() {
        let summary = IndexSummary::from_points(&points(&[100.0, 101.0, 102.0])).unwrap();
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"n_obs\":3"));
    }
}
