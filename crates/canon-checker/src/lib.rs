//! Canon Consistency Checker
//!
//! Assigns a verdict to every claim of a backstory from the evidence gathered
//! for it.
//!
//! The checker provides:
//! - Per-evidence polarity through a pluggable [`EvidenceJudge`]
//! - Factual, temporal and causal verdict rules
//! - Dependency ordering with cycle detection ([`DependencyGraph`])
//! - World rules: anachronisms against the setting's period
//! - Claim scoring with the dependency cap
//!
//! Checking is pure: all narrative lookups happen before, during retrieval.
//!
//! # Examples
//!
//! ```
//! use canon_checker::{CheckContext, ConsistencyChecker};
//! use canon_domain::{Claim, ClaimId, ClaimKind, Evidence, EvidenceSource, Span, Verdict};
//!
//! let checker = ConsistencyChecker::default();
//! let claim = Claim::new(
//!     ClaimId::derive("doc", 0), 0, Span::new(0, 27),
//!     "Anna worked as a seamstress", ["Anna".to_string()], ClaimKind::Factual,
//! );
//! let evidence = vec![Evidence::new(
//!     Span::new(0, 35), 0.8, EvidenceSource::Passage, "Anna worked as a seamstress in Lyon",
//! )];
//!
//! let outcome = checker.check(&claim, evidence, &CheckContext::default());
//! assert_eq!(outcome.verdict, Verdict::Supported);
//! ```

#![warn(missing_docs)]

mod checker;
mod config;
mod error;
mod graph;
mod judge;
mod world;

pub use checker::{CheckContext, CheckOutcome, ClaimAssessment, ClaimEvidence, ConsistencyChecker, Dependency};
pub use config::CheckerConfig;
pub use error::{CheckerError, DependencyCycleError};
pub use graph::{CheckPlan, DependencyGraph};
pub use judge::{EvidenceJudge, LexicalJudge};
pub use world::WorldRulesConfig;
