//! Error types for pipeline runs

use crate::config::ConfigError;
use canon_aggregator::AggregationError;
use canon_checker::CheckerError;
use canon_extractor::ExtractorError;
use thiserror::Error;

/// Errors that end a document run without a dossier
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Claim extraction failed
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractorError),

    /// The claim set is malformed
    #[error("Checking failed: {0}")]
    Checker(#[from] CheckerError),

    /// An aggregation invariant was violated
    #[error("Aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A per-claim task panicked or was aborted
    #[error("Retrieval task failed: {0}")]
    Task(String),

    /// The run was cancelled before completion
    #[error("Verification cancelled")]
    Cancelled,
}
