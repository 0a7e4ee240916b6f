//! Configuration for a full verification run
//!
//! Every stage keeps its own config struct; this module nests them under one
//! TOML document:
//!
//! ```toml
//! [retriever]
//! top_k = 8
//!
//! [aggregator]
//! significance_threshold = 0.75
//!
//! [pipeline]
//! max_concurrent_retrievals = 8
//! ```
//!
//! Missing tables and keys fall back to their defaults.

use canon_aggregator::AggregatorConfig;
use canon_checker::CheckerConfig;
use canon_domain::ScoringConfig;
use canon_extractor::ExtractorConfig;
use canon_retriever::RetrieverConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Override for `retriever.top_k`
pub const ENV_TOP_K: &str = "CANON_TOP_K";
/// Override for `retriever.lookup_timeout_ms`
pub const ENV_RETRIEVAL_TIMEOUT_MS: &str = "CANON_RETRIEVAL_TIMEOUT_MS";
/// Override for `pipeline.max_concurrent_retrievals`
pub const ENV_MAX_CONCURRENT_RETRIEVALS: &str = "CANON_MAX_CONCURRENT_RETRIEVALS";
/// Override for `aggregator.significance_threshold`
pub const ENV_SIGNIFICANCE_THRESHOLD: &str = "CANON_SIGNIFICANCE_THRESHOLD";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to render TOML
    #[error("Failed to serialize config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A value is out of range or an override does not parse
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for the orchestration itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Per-claim retrievals allowed in flight at once (default: 4)
    pub max_concurrent_retrievals: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_retrievals: 4,
        }
    }
}

/// All stage configurations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// `[extractor]`
    pub extractor: ExtractorConfig,
    /// `[retriever]`
    pub retriever: RetrieverConfig,
    /// `[checker]`
    pub checker: CheckerConfig,
    /// `[scoring]`
    pub scoring: ScoringConfig,
    /// `[aggregator]`
    pub aggregator: AggregatorConfig,
    /// `[pipeline]`
    pub pipeline: ExecutionConfig,
}

impl PipelineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Apply `CANON_*` environment overrides
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by the `CANON_*` variable names
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_TOP_K) {
            self.retriever.top_k = parse(ENV_TOP_K, &v)?;
        }
        if let Some(v) = lookup(ENV_RETRIEVAL_TIMEOUT_MS) {
            self.retriever.lookup_timeout_ms = parse(ENV_RETRIEVAL_TIMEOUT_MS, &v)?;
        }
        if let Some(v) = lookup(ENV_MAX_CONCURRENT_RETRIEVALS) {
            self.pipeline.max_concurrent_retrievals = parse(ENV_MAX_CONCURRENT_RETRIEVALS, &v)?;
        }
        if let Some(v) = lookup(ENV_SIGNIFICANCE_THRESHOLD) {
            self.aggregator.significance_threshold = parse(ENV_SIGNIFICANCE_THRESHOLD, &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate every stage and the cross-stage constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let stage = |name: &str, result: Result<(), String>| {
            result.map_err(|e| ConfigError::Invalid(format!("[{}] {}", name, e)))
        };
        stage("extractor", self.extractor.validate())?;
        stage("retriever", self.retriever.validate())?;
        stage("checker", self.checker.validate())?;
        stage("scoring", self.scoring.validate())?;
        stage("aggregator", self.aggregator.validate())?;

        if self.pipeline.max_concurrent_retrievals == 0 {
            return Err(ConfigError::Invalid(
                "[pipeline] max_concurrent_retrievals must be at least 1".to_string(),
            ));
        }
        if self.retriever.structured_fact_floor < self.retriever.min_relevance {
            return Err(ConfigError::Invalid(format!(
                "[retriever] structured_fact_floor ({}) is below min_relevance ({}), structured facts would be dropped",
                self.retriever.structured_fact_floor, self.retriever.min_relevance
            )));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{} has unparseable value '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.max_concurrent_retrievals, 4);
        assert_eq!(config.retriever.top_k, 5);
        assert_eq!(config.aggregator.significance_threshold, 0.7);
    }

    #[test]
    fn test_partial_toml() {
        let config = PipelineConfig::from_toml(
            r#"
            [retriever]
            top_k = 8

            [pipeline]
            max_concurrent_retrievals = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.retriever.top_k, 8);
        assert_eq!(config.retriever.min_relevance, 0.2);
        assert_eq!(config.pipeline.max_concurrent_retrievals, 2);
        assert_eq!(config.checker, CheckerConfig::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = PipelineConfig::default();
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[aggregator]"));
        assert_eq!(PipelineConfig::from_toml(&rendered).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = PipelineConfig::from_toml("[pipeline]\nmax_concurrent_retrievals = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = PipelineConfig::from_toml("[retriever]\nstructured_fact_floor = 0.1\nmin_relevance = 0.3").unwrap_err();
        assert!(err.to_string().contains("structured_fact_floor"));

        let err = PipelineConfig::from_toml("[retriever\ntop_k = 1").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_TOP_K, "3"),
            (ENV_RETRIEVAL_TIMEOUT_MS, "250"),
            (ENV_MAX_CONCURRENT_RETRIEVALS, "16"),
            (ENV_SIGNIFICANCE_THRESHOLD, "0.9"),
        ]
        .into_iter()
        .collect();
        let config = PipelineConfig::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.retriever.top_k, 3);
        assert_eq!(config.retriever.lookup_timeout_ms, 250);
        assert_eq!(config.pipeline.max_concurrent_retrievals, 16);
        assert_eq!(config.aggregator.significance_threshold, 0.9);
    }

    #[test]
    fn test_bad_override_rejected() {
        let err = PipelineConfig::default()
            .with_overrides(|k| (k == ENV_TOP_K).then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_TOP_K));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[checker]\ncontradiction_threshold = 0.6").unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.checker.contradiction_threshold, 0.6);

        let missing = PipelineConfig::from_file("/nonexistent/canon.toml").unwrap_err();
        assert!(matches!(missing, ConfigError::FileRead(_)));
    }
}
