//! Checker configuration

use crate::world::WorldRulesConfig;
use serde::{Deserialize, Serialize};

/// Configuration for consistency checking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Contradicting evidence must be more relevant than this to count
    pub contradiction_threshold: f64,

    /// Share of a claim's key words evidence must cover to take a side
    pub support_overlap: f64,

    /// `[checker.world]`
    pub world: WorldRulesConfig,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            contradiction_threshold: 0.5,
            support_overlap: 0.5,
            world: WorldRulesConfig::default(),
        }
    }
}

impl CheckerConfig {
    /// Aggressive preset: contradictions count early
    pub fn aggressive() -> Self {
        Self {
            contradiction_threshold: 0.3,
            support_overlap: 0.4,
            world: WorldRulesConfig::default(),
        }
    }

    /// Lenient preset: only strong evidence takes a side
    pub fn lenient() -> Self {
        Self {
            contradiction_threshold: 0.7,
            support_overlap: 0.7,
            world: WorldRulesConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.contradiction_threshold) {
            return Err("contradiction_threshold must be between 0.0 and 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.support_overlap) || self.support_overlap == 0.0 {
            return Err("support_overlap must be in (0.0, 1.0]".to_string());
        }
        self.world.validate().map_err(|e| format!("world: {}", e))
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
