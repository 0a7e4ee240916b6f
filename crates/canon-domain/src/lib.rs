//! Canon Domain Layer
//!
//! Core vocabulary shared by every stage of backstory verification: the
//! claims extracted from a backstory, the evidence retrieved from the novel,
//! the verdicts assigned to them, the scoring formula, and the dossier that
//! records the outcome.
//!
//! ## Key Concepts
//!
//! - **Claim**: an atomic assertion from the backstory, optionally depending on
//!   an earlier claim (causal or temporal link)
//! - **Evidence**: a novel passage or structured fact retrieved for one claim
//! - **Verdict**: supported, contradicted or unverifiable
//! - **Score**: deterministic confidence in [0, 1] computed from verdict and evidence
//! - **Dossier**: the immutable, evidence-linked record of a whole run
//!
//! ## Architecture
//!
//! This crate holds pure logic only. The narrative store is reached through
//! the [`traits::NarrativeMemory`] trait; implementations live elsewhere.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod claim;
pub mod dossier;
pub mod evidence;
pub mod scoring;
pub mod span;
pub mod text;
pub mod traits;
pub mod verdict;

// Re-exports for convenience
pub use claim::{Claim, ClaimId, ClaimKind, TemporalOrder};
pub use dossier::{Citation, ClaimFlag, ClaimRecord, Dossier, Prediction};
pub use evidence::{ranking_order, Evidence, EvidenceSource, Polarity};
pub use scoring::{score_claim, ScoringConfig};
pub use span::Span;
pub use traits::{CharacterFact, NarrativeMemory, NarrativeTime, Passage, TimelineFact};
pub use verdict::Verdict;
