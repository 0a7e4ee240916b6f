//! Configuration for the Evidence Retriever

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How passage relevance is adjusted after retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerankStrategy {
    /// Keep backend similarity scores
    #[default]
    None,
    /// Blend similarity 0.6, claim keyword overlap 0.3, passage length 0.1
    KeywordOverlap,
}

/// Configuration for the Evidence Retriever
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    /// Evidence items kept per claim
    pub top_k: usize,

    /// Passage candidates requested per query, as a multiple of `top_k`
    pub candidate_multiplier: usize,

    /// Items below this relevance are dropped
    pub min_relevance: f64,

    /// Lowest relevance a structured fact can have
    pub structured_fact_floor: f64,

    /// Maximum character-fact lookups per claim
    pub max_fact_lookups: usize,

    /// Timeout for each narrative memory call (milliseconds)
    pub lookup_timeout_ms: u64,

    /// Budget for all lookups of one claim together (milliseconds)
    pub claim_timeout_ms: u64,

    /// Issue one extra passage query per subject entity
    pub entity_queries: bool,

    /// Passages requested per entity query
    pub entity_query_top_k: usize,

    /// Passage rescoring
    pub rerank: RerankStrategy,
}

impl RetrieverConfig {
    /// Get the lookup timeout as a Duration
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    /// Get the per-claim budget as a Duration
    pub fn claim_timeout(&self) -> Duration {
        Duration::from_millis(self.claim_timeout_ms)
    }

    /// Passage candidates requested for the main claim query
    pub fn candidate_pool(&self) -> usize {
        self.top_k.saturating_mul(self.candidate_multiplier).max(self.top_k)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        if self.candidate_multiplier == 0 {
            return Err("candidate_multiplier must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.min_relevance) {
            return Err("min_relevance must be between 0.0 and 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.structured_fact_floor) {
            return Err("structured_fact_floor must be between 0.0 and 1.0".to_string());
        }
        if self.lookup_timeout_ms == 0 {
            return Err("lookup_timeout_ms must be greater than 0".to_string());
        }
        if self.claim_timeout_ms < self.lookup_timeout_ms {
            return Err(format!(
                "claim_timeout_ms ({}) must be at least lookup_timeout_ms ({})",
                self.claim_timeout_ms, self.lookup_timeout_ms
            ));
        }
        Ok(())
    }
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            candidate_multiplier: 2,
            min_relevance: 0.2,
            structured_fact_floor: 0.8,
            max_fact_lookups: 6,
            lookup_timeout_ms: 10_000,
            claim_timeout_ms: 30_000,
            entity_queries: true,
            entity_query_top_k: 2,
            rerank: RerankStrategy::None,
        }
    }
}

impl RetrieverConfig {
    /// Aggressive preset: fewer, stronger items and short timeouts
    pub fn aggressive() -> Self {
        Self {
            top_k: 3,
            min_relevance: 0.35,
            max_fact_lookups: 3,
            lookup_timeout_ms: 3_000,
            claim_timeout_ms: 6_000,
            entity_queries: false,
            ..Self::default()
        }
    }

    /// Lenient preset: wider evidence sets and patient lookups
    pub fn lenient() -> Self {
        Self {
            top_k: 10,
            candidate_multiplier: 3,
            min_relevance: 0.1,
            max_fact_lookups: 12,
            lookup_timeout_ms: 30_000,
            claim_timeout_ms: 60_000,
            rerank: RerankStrategy::KeywordOverlap,
            ..Self::default()
        }
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
