//! Aggregation error types

use thiserror::Error;

/// Errors from the decision aggregator and dossier builder
///
/// All of these are internal invariant violations and fatal for the document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    /// Assessments are missing, malformed, or disagree with the claims
    #[error("Aggregation inconsistency: {0}")]
    Inconsistency(String),

    /// Nothing to aggregate
    #[error("No claim assessments to aggregate")]
    Empty,
}
