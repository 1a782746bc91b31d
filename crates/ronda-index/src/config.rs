//! Index configuration.

use ronda_traits::{IndexError, Result};
use serde::{Deserialize, Serialize};

/// Number of trading-calendar positions between the weights used and the
/// returns they are applied to.
pub const RETURN_LAG: usize = 2;

/// Configuration for the index calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Weight given to each price rank on an anchor date, highest price first
    pub tier_weights: Vec<f64>,
    /// Index level at the start date
    pub base_level: f64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            tier_weights: vec![0.5, 0.25, 0.25],
            base_level: 100.0,
        }
    }
}

impl IndexConfig {
    /// Checks that the tiers form a valid allocation and the base level is usable.
    pub fn validate(&self) -> Result<()> {
        if let Some(w) = self
            .tier_weights
            .iter()
            .find(|w| !w.is_finite() || !(0.0..=1.0).contains(*w))
        {
            return Err(IndexError::InvalidConfig(format!(
                "tier weight {w} outside [0, 1]"
            )));
        }

        let total: f64 = self.tier_weights.iter().sum();
        if total > 1.0 + 1e-12 {
            return Err(IndexError::InvalidConfig(format!(
                "tier weights sum to {total}, more than 1"
            )));
        }

        if !self.base_level.is_finite() || self.base_level <= 0.0 {
            return Err(IndexError::InvalidConfig(format!(
                "base level must be positive, got {}",
                self.base_level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = IndexConfig::default();
        assert_eq!(config.tier_weights, vec![0.5, 0.25, 0.25]);
        assert_eq!(config.base_level, 100.0);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case::negative_tier(vec![0.5, -0.25], 100.0)]
    #[case::oversized_total(vec![0.5, 0.5, 0.25], 100.0)]
    #[case::nan_tier(vec![f64::NAN], 100.0)]
    #[case::zero_base(vec![0.5], 0.0)]
    fn test_invalid_config(#[case] tier_weights: Vec<f64>, #[case] base_level: f64) {
        let config = IndexConfig {
            tier_weights,
            base_level,
        };
        assert!(matches!(config.validate(), Err(IndexError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: IndexConfig = serde_json::from_str(r#"{"base_level": 1000.0}"#).unwrap();
        assert_eq!(config.base_level, 1000.0);
        assert_eq!(config.tier_weights, vec![0.5, 0.25, 0.25]);
    }
}
