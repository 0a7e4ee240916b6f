//! Canon Pipeline
//!
//! Runs one backstory through every stage and returns its dossier.
//!
//! # Overview
//!
//! The pipeline is responsible for:
//! - **Extraction**: splitting the backstory into claims, using the entity
//!   names known to narrative memory as the lexicon
//! - **Retrieval**: one task per claim under a concurrency bound, sharing a
//!   lookup cache owned by the run
//! - **Degradation**: a claim whose lookups time out or fail keeps running as
//!   UNVERIFIABLE with an empty evidence set and a flag
//! - **Checking and aggregation** in dependency order
//! - **Cancellation**: aborting outstanding tasks with no partial dossier
//!
//! # Usage
//!
//! ```
//! use canon_memory::InMemoryNarrative;
//! use canon_pipeline::{Pipeline, PipelineConfig};
//! use canon_domain::{Span, Verdict};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let memory = InMemoryNarrative::new()
//!     .with_passage(Span::new(0, 39), "Anna worked as a seamstress in Lyon.")
//!     .with_character_fact("Anna", "occupation", "seamstress", Span::new(0, 39));
//!
//! let pipeline = Pipeline::new(Arc::new(memory), PipelineConfig::default())?;
//! let dossier = pipeline.verify("case-1", "Anna worked as a seamstress in Lyon.").await?;
//! assert_eq!(dossier.verdict(), Verdict::Supported);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
mod error;
mod pipeline;
pub mod telemetry;

pub use config::{ConfigError, ExecutionConfig, PipelineConfig};
pub use error::PipelineError;
pub use pipeline::Pipeline;
pub use telemetry::init_tracing;
