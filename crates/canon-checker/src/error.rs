//! Checker error types

use canon_domain::ClaimId;
use thiserror::Error;

/// Malformed claim sets; fatal for the document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckerError {
    /// A claim references an identifier that is not in the claim set
    #[error("Claim {claim} references unknown claim {reference}")]
    DanglingReference {
        /// The referencing claim
        claim: ClaimId,
        /// The missing target
        reference: ClaimId,
    },

    /// Two claims share an identifier
    #[error("Duplicate claim id {0}")]
    DuplicateClaim(ClaimId),

    /// Evidence inputs do not line up with the claims
    #[error("Expected evidence for {expected} claims, got {actual}")]
    EvidenceMismatch {
        /// Number of claims
        expected: usize,
        /// Number of evidence inputs
        actual: usize,
    },
}

/// Claims whose references form a cycle
///
/// Not returned as `Err`: the claims involved are forced to UNVERIFIABLE and
/// the error is logged and reported in the check plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Dependency cycle among claims at ordinals {ordinals:?}")]
pub struct DependencyCycleError {
    /// Claims in the cycle(s), in extraction order
    pub claims: Vec<ClaimId>,
    /// Their ordinals
    pub ordinals: Vec<usize>,
}
