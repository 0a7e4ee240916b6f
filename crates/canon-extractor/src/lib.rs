//! Canon Extractor
//!
//! Decomposes a backstory into an ordered sequence of atomic claims.
//!
//! # Overview
//!
//! Every declarative sentence that names a known entity becomes a claim.
//! Compound sentences joined by a causal ("because", "since", "due to") or
//! temporal ("before", "after") connective are split into two linked claims:
//! the antecedent clause first, then the dependent clause referencing it.
//!
//! # Architecture
//!
//! ```text
//! Backstory → sentences → entity recognition → clause split → Claims
//! ```
//!
//! Extraction is deterministic: claim ids are derived from the document id
//! and the extraction ordinal.
//!
//! # Example Usage
//!
//! ```
//! use canon_extractor::{ClaimExtractor, ExtractorConfig};
//! use canon_domain::ClaimKind;
//!
//! let extractor = ClaimExtractor::new(ExtractorConfig::default()).with_lexicon(["Anna"]);
//! let claims = extractor.extract("doc-1", "Anna fled the city after the fire.").unwrap();
//!
//! assert_eq!(claims.len(), 2);
//! assert_eq!(claims[0].text, "the fire");
//! assert!(matches!(claims[1].kind, ClaimKind::Temporal(_)));
//! assert_eq!(claims[1].references, vec![claims[0].id]);
//! ```

#![warn(missing_docs)]

mod config;
mod entity;
mod error;
mod extractor;
pub mod segment;


pub use config::ExtractorConfig;
pub use entity::{capitalized_names, EntityRecognizer};
pub use error::ExtractorError;
pub use extractor::{attribute_keys, ClaimExtractor};
