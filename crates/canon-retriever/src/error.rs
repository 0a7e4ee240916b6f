//! Error types for the Evidence Retriever

use thiserror::Error;

/// Errors that can occur while gathering evidence for one claim
///
/// None of them is fatal for the document: the pipeline downgrades the claim
/// to UNVERIFIABLE with empty evidence and records a flag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetrievalError {
    /// Narrative memory did not answer within the lookup or claim budget
    #[error("Narrative memory lookup timed out after {0} ms")]
    Timeout(u64),

    /// The narrative memory returned an error
    #[error("Narrative memory error: {0}")]
    Backend(String),

    /// The blocking task running the lookup panicked or was cancelled
    #[error("Lookup task failed: {0}")]
    TaskFailed(String),
}

impl RetrievalError {
    /// True for [`RetrievalError::Timeout`]
    pub fn is_timeout(&self) -> bool {
        matches!(self, RetrievalError::Timeout(_))
    }
}
