//! Canon Decision Aggregator
//!
//! Turns checked claims into a document verdict and an evidence-linked
//! [`Dossier`](canon_domain::Dossier).
//!
//! # Examples
//!
//! ```
//! use canon_aggregator::{Aggregator, AggregatorConfig};
//! use canon_checker::ClaimAssessment;
//! use canon_domain::{ClaimId, ClaimKind, Verdict};
//!
//! let assessments = vec![ClaimAssessment {
//!     claim_id: ClaimId::derive("doc", 0),
//!     ordinal: 0,
//!     kind: ClaimKind::Factual,
//!     verdict: Verdict::Contradicted,
//!     score: 0.9,
//!     evidence: Vec::new(),
//!     capped: false,
//!     flags: Vec::new(),
//! }];
//!
//! let decision = Aggregator::new(AggregatorConfig::default()).decide(&assessments).unwrap();
//! assert_eq!(decision.verdict, Verdict::Contradicted);
//! ```

#![warn(missing_docs)]

mod aggregator;
mod config;
mod dossier_builder;
mod error;
mod summary;

pub use aggregator::{supported_share, Aggregator, DocumentDecision};
pub use config::AggregatorConfig;
pub use dossier_builder::DossierBuilder;
pub use error::AggregationError;
pub use summary::DossierSummary;
