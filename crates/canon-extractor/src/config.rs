//! Configuration for the Extractor

use serde::{Deserialize, Serialize};

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum backstory length (characters)
    pub max_text_length: usize,

    /// Sentences with fewer words produce no claim
    pub min_sentence_words: usize,

    /// Split compound sentences at causal/temporal connectives
    pub split_compound: bool,

    /// Recognize capitalized names when no lexicon is supplied
    pub capitalized_fallback: bool,

    /// Upper bound on claims per document; later sentences are dropped
    pub max_claims: usize,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.min_sentence_words == 0 {
            return Err("min_sentence_words must be greater than 0".to_string());
        }
        if self.max_claims == 0 {
            return Err("max_claims must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_text_length: 50_000,
            min_sentence_words: 3,
            split_compound: true,
            capitalized_fallback: true,
            max_claims: 500,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: shorter documents, only substantial sentences
    pub fn aggressive() -> Self {
        Self {
            max_text_length: 20_000,
            min_sentence_words: 5,
            split_compound: true,
            capitalized_fallback: false,
            max_claims: 100,
        }
    }

    /// Lenient preset: long documents, short sentences accepted
    pub fn lenient() -> Self {
        Self {
            max_text_length: 200_000,
            min_sentence_words: 2,
            split_compound: true,
            capitalized_fallback: true,
            max_claims: 2_000,
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
