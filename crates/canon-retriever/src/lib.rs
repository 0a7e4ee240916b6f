//! Canon Evidence Retriever
//!
//! Gathers ranked evidence for one claim from narrative memory.
//!
//! # Architecture
//!
//! ```text
//!            ┌─ passage search (claim text + entities)
//! Claim ─────┼─ passage search per entity           ─┐
//!            └─ entity check → character facts,      ├─→ merge → top-K Evidence
//!                              own event time        ─┘
//! ```
//!
//! - Free-text and structured lookups run concurrently
//! - Structured facts get a relevance floor and win ties
//! - Overlapping spans keep their best instance, whatever their source
//! - Every answer is memoized in a [`LookupCache`] owned by the caller
//!
//! # Examples
//!
//! ```
//! use canon_retriever::{EvidenceRetriever, LookupCache, RetrieverConfig};
//! use canon_memory::InMemoryNarrative;
//! use canon_domain::{Claim, ClaimId, ClaimKind, Span};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let memory = InMemoryNarrative::new()
//!     .with_passage(Span::new(0, 35), "Anna worked as a seamstress in Lyon");
//! let retriever = EvidenceRetriever::new(Arc::new(memory), RetrieverConfig::default());
//!
//! let claim = Claim::new(
//!     ClaimId::derive("doc", 0), 0, Span::new(0, 20),
//!     "Anna was a seamstress", ["Anna".to_string()], ClaimKind::Factual,
//! );
//! let cache = LookupCache::new();
//! let retrieval = retriever.retrieve(&claim, false, &cache).await?;
//! assert!(!retrieval.evidence.is_empty());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod cache;
mod config;
mod error;
pub mod merge;
mod retriever;

pub use cache::{CachedLookup, LookupCache, LookupKey};
pub use config::{RerankStrategy, RetrieverConfig};
pub use error::RetrievalError;
pub use retriever::{EvidenceRetriever, Retrieval};
