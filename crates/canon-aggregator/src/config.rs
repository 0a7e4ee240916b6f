//! Aggregator configuration

use serde::{Deserialize, Serialize};

/// Configuration for the document-level decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// A contradicted claim scoring at least this decides the document (default: 0.7)
    pub significance_threshold: f64,

    /// The score-weighted supported share must exceed this (default: 0.5)
    pub majority_threshold: f64,

    /// Weight of causal and temporal claims in the document score (default: 1.5)
    pub dependent_claim_weight: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            significance_threshold: 0.7,
            majority_threshold: 0.5,
            dependent_claim_weight: 1.5,
        }
    }
}

impl AggregatorConfig {
    /// Aggressive preset: a weaker contradiction is enough
    pub fn aggressive() -> Self {
        Self {
            significance_threshold: 0.6,
            majority_threshold: 0.6,
            ..Default::default()
        }
    }

    /// Lenient preset: only near-certain contradictions decide
    pub fn lenient() -> Self {
        Self {
            significance_threshold: 0.85,
            majority_threshold: 0.4,
            ..Default::default()
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("significance_threshold", self.significance_threshold),
            ("majority_threshold", self.majority_threshold),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be in [0.0, 1.0], got {}", name, value));
            }
        }
        if !self.dependent_claim_weight.is_finite() || self.dependent_claim_weight <= 0.0 {
            return Err(format!(
                "dependent_claim_weight must be positive, got {}",
                self.dependent_claim_weight
            ));
        }
        Ok(())
    }

    /// Load from a TOML string
    pub fn from_toml(s: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(s).map_err(|e| format!("Invalid aggregator config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string(self).map_err(|e| format!("Failed to serialize aggregator config: {}", e))
    }
}
