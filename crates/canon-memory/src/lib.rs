//! Canon In-Memory Narrative Store
//!
//! A deterministic, in-process implementation of the `NarrativeMemory` trait
//! from `canon-domain`.
//!
//! # Architecture
//!
//! Production deployments put an embedding index and structured tables
//! behind `NarrativeMemory`. This crate answers the same queries from plain
//! collections using content-word overlap, which is enough for small corpora,
//! fixtures, and every test suite in the workspace.
//!
//! # Examples
//!
//! ```
//! use canon_memory::InMemoryNarrative;
//! use canon_domain::{NarrativeMemory, Span};
//!
//! let memory = InMemoryNarrative::new()
//!     .with_passage(Span::new(0, 31), "Edmond was a sailor in Marseille")
//!     .with_event("Edmond", "Edmond imprisoned in the Chateau d'If", 1815, Span::new(40, 80));
//!
//! let passages = memory.retrieve_passages("Edmond sailor", &["Edmond".to_string()], 3).unwrap();
//! assert_eq!(passages.len(), 1);
//!
//! let event = memory.lookup_event_time("Edmond", "Edmond was imprisoned").unwrap();
//! assert_eq!(event.map(|e| e.timestamp), Some(1815));
//! ```

#![warn(missing_docs)]

pub mod snapshot;

use canon_domain::text::{content_words, overlap};
use canon_domain::{CharacterFact, NarrativeMemory, NarrativeTime, Passage, Span, TimelineFact};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub use snapshot::NarrativeSnapshot;

/// Minimum fraction of a timeline entry's words that must appear in the query
pub const EVENT_MATCH_THRESHOLD: f64 = 0.5;

/// Weight of word overlap in passage relevance; the rest rewards entity hits
const OVERLAP_WEIGHT: f64 = 0.8;

/// Errors that can occur during narrative store operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MemoryError {
    /// The store refused or failed the query
    #[error("Narrative memory unavailable: {0}")]
    Unavailable(String),

    /// A snapshot could not be loaded
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

#[derive(Debug, Clone)]
struct StoredPassage {
    span: Span,
    text: String,
    words: Vec<String>,
}

#[derive(Debug, Clone)]
struct TimelineEntry {
    /// Lowercased participant; `None` for events not tied to a character
    entity: Option<String>,
    description: String,
    words: Vec<String>,
    timestamp: NarrativeTime,
    span: Span,
}

/// In-process narrative store
///
/// Clones share the call counter, so a clone handed to a pipeline can be
/// inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNarrative {
    passages: Vec<StoredPassage>,
    timeline: Vec<TimelineEntry>,
    characters: BTreeMap<String, Vec<CharacterFact>>,
    names: BTreeMap<String, String>,
    failures: Vec<String>,
    call_count: Arc<AtomicUsize>,
}

impl InMemoryNarrative {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a novel into paragraph passages (blank-line separated) with byte spans
    pub fn from_text(novel: &str) -> Self {
        let mut memory = Self::new();
        let mut offset = 0;
        for block in novel.split("\n\n") {
            let start = offset + (block.len() - block.trim_start().len());
            offset += block.len() + 2;
            let trimmed = block.trim();
            if trimmed.is_empty() {
                continue;
            }
            memory = memory.with_passage(Span::new(start, start + trimmed.len()), trimmed);
        }
        memory
    }

    /// Add a free-text passage
    pub fn with_passage(mut self, span: Span, text: impl Into<String>) -> Self {
        let text = text.into();
        let words = content_words(&text);
        self.passages.push(StoredPassage { span, text, words });
        self
    }

    /// Add a timeline event involving `entity`
    pub fn with_event(
        mut self,
        entity: &str,
        description: impl Into<String>,
        timestamp: NarrativeTime,
        span: Span,
    ) -> Self {
        self.register_name(entity);
        self.push_event(Some(entity.to_lowercase()), description.into(), timestamp, span);
        self
    }

    /// Add a timeline event not tied to any character (a fire, a war)
    ///
    /// World events match lookups for every entity.
    pub fn with_world_event(
        mut self,
        description: impl Into<String>,
        timestamp: NarrativeTime,
        span: Span,
    ) -> Self {
        self.push_event(None, description.into(), timestamp, span);
        self
    }

    /// Add a character table entry
    pub fn with_character_fact(
        mut self,
        entity: &str,
        attribute: impl Into<String>,
        value: impl Into<String>,
        span: Span,
    ) -> Self {
        self.register_name(entity);
        self.characters
            .entry(entity.to_lowercase())
            .or_default()
            .push(CharacterFact {
                entity: entity.to_string(),
                attribute: attribute.into(),
                value: value.into(),
                span,
            });
        self
    }

    /// Fail every query whose text contains `fragment` (case-insensitive)
    pub fn with_failure(mut self, fragment: impl Into<String>) -> Self {
        self.failures.push(fragment.into().to_lowercase());
        self
    }

    /// Total number of queries answered or failed
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
    }

    /// Number of stored passages
    pub fn passage_count(&self) -> usize {
        self.passages.len()
    }

    fn register_name(&mut self, entity: &str) {
        self.names
            .entry(entity.to_lowercase())
            .or_insert_with(|| entity.to_string());
    }

    fn push_event(&mut self, entity: Option<String>, description: String, timestamp: NarrativeTime, span: Span) {
        let words = content_words(&description);
        self.timeline.push(TimelineEntry {
            entity,
            description,
            words,
            timestamp,
            span,
        });
    }

    /// Count the call and apply configured failures
    fn begin(&self, query: &str) -> Result<(), MemoryError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let lowered = query.to_lowercase();
        match self.failures.iter().find(|f| lowered.contains(f.as_str())) {
            Some(fragment) => Err(MemoryError::Unavailable(format!(
                "query matched failure fragment '{}'",
                fragment
            ))),
            None => Ok(()),
        }
    }
}

impl NarrativeMemory for InMemoryNarrative {
    type Error = MemoryError;

    fn retrieve_passages(
        &self,
        query_text: &str,
        subject_entities: &[String],
        top_k: usize,
    ) -> Result<Vec<Passage>, Self::Error> {
        self.begin(query_text)?;

        let query = content_words(query_text);
        let entity_words: Vec<Vec<String>> =
            subject_entities.iter().map(|e| content_words(e)).collect();

        let mut results: Vec<Passage> = self
            .passages
            .iter()
            .filter_map(|p| {
                let word_score = overlap(&query, &p.words);
                let entity_score = if entity_words.is_empty() {
                    0.0
                } else {
                    let hits = entity_words
                        .iter()
                        .filter(|words| !words.is_empty() && words.iter().all(|w| p.words.contains(w)))
                        .count();
                    hits as f64 / entity_words.len() as f64
                };
                let relevance = OVERLAP_WEIGHT * word_score + (1.0 - OVERLAP_WEIGHT) * entity_score;
                (relevance > 0.0).then(|| Passage {
                    span: p.span,
                    text: p.text.clone(),
                    relevance,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.relevance
                .total_cmp(&a.relevance)
                .then_with(|| a.span.cmp(&b.span))
        });
        results.truncate(top_k);
        Ok(results)
    }

    fn lookup_event_time(
        &self,
        entity: &str,
        event_description: &str,
    ) -> Result<Option<TimelineFact>, Self::Error> {
        self.begin(event_description)?;

        let entity = entity.to_lowercase();
        let query = content_words(event_description);

        let best = self
            .timeline
            .iter()
            .filter(|e| e.entity.as_deref().map_or(true, |owner| owner == entity))
            .map(|e| (overlap(&e.words, &query), e))
            .filter(|(score, _)| *score >= EVENT_MATCH_THRESHOLD)
            .max_by(|(sa, ea), (sb, eb)| {
                sa.total_cmp(sb)
                    // prefer the entity's own events, then the earliest narration
                    .then_with(|| ea.entity.is_some().cmp(&eb.entity.is_some()))
                    .then_with(|| eb.span.cmp(&ea.span))
            });

        Ok(best.map(|(_, e)| TimelineFact {
            timestamp: e.timestamp,
            span: e.span,
            description: e.description.clone(),
        }))
    }

    fn lookup_character_fact(
        &self,
        entity: &str,
        attribute: &str,
    ) -> Result<Option<CharacterFact>, Self::Error> {
        self.begin(attribute)?;

        let attribute = attribute.to_lowercase();
        let Some(facts) = self.characters.get(&entity.to_lowercase()) else {
            return Ok(None);
        };

        Ok(facts
            .iter()
            .find(|f| {
                f.attribute.to_lowercase() == attribute
                    || content_words(&f.value).contains(&attribute)
            })
            .cloned())
    }

    fn knows_entity(&self, entity: &str) -> Result<bool, Self::Error> {
        self.begin(entity)?;
        Ok(self.names.contains_key(&entity.to_lowercase()))
    }

    fn entity_names(&self) -> Result<Vec<String>, Self::Error> {
        Ok(self.names.values().cloned().collect())
    }

    fn latest_event(&self) -> Result<Option<TimelineFact>, Self::Error> {
        let latest = self.timeline.iter().max_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                // earliest narration among equal times
                .then_with(|| b.span.cmp(&a.span))
        });
        Ok(latest.map(|e| TimelineFact {
            timestamp: e.timestamp,
            span: e.span,
            description: e.description.clone(),
        }))
    }
}
