//! Trait definitions for external interactions
//!
//! The narrative store (passage index, timeline, character table) is an
//! external collaborator. The reasoning stages only ever see it through
//! [`NarrativeMemory`].

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Sortable position of an event on the novel's timeline
///
/// The scale is backend-defined (a year, a chapter rank, a day count); only
/// the ordering is used.
pub type NarrativeTime = i64;

/// A passage returned by similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Span in the novel
    pub span: Span,
    /// Passage text
    pub text: String,
    /// Similarity to the query [0.0, 1.0]
    pub relevance: f64,
}

/// A resolved timeline entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineFact {
    /// Position on the timeline
    pub timestamp: NarrativeTime,
    /// Where the event is narrated
    pub span: Span,
    /// Description of the event as recorded in the timeline
    pub description: String,
}

/// A resolved character table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterFact {
    /// Character the fact is about
    pub entity: String,
    /// Attribute name (e.g. "occupation")
    pub attribute: String,
    /// Attribute value (e.g. "sailor")
    pub value: String,
    /// Where the fact is established
    pub span: Span,
}

impl CharacterFact {
    /// Render the fact as a sentence-like string for judging and citation
    pub fn render(&self) -> String {
        format!("{} {}: {}", self.entity, self.attribute, self.value)
    }
}

/// Query contract of the narrative store
///
/// Implemented outside the core (an index over the novel); the in-process
/// `canon-memory` crate provides one for small corpora and tests.
/// Calls may block; the pipeline runs them on the blocking pool with a timeout.
pub trait NarrativeMemory {
    /// Error type for store operations
    type Error;

    /// Passages ranked by similarity to `query_text`, biased toward `subject_entities`
    fn retrieve_passages(
        &self,
        query_text: &str,
        subject_entities: &[String],
        top_k: usize,
    ) -> Result<Vec<Passage>, Self::Error>;

    /// Timeline position of the event involving `entity` best matching `event_description`
    fn lookup_event_time(
        &self,
        entity: &str,
        event_description: &str,
    ) -> Result<Option<TimelineFact>, Self::Error>;

    /// Character table entry for `entity` keyed by `attribute`
    fn lookup_character_fact(
        &self,
        entity: &str,
        attribute: &str,
    ) -> Result<Option<CharacterFact>, Self::Error>;

    /// True if `entity` has timeline or character table entries
    fn knows_entity(&self, entity: &str) -> Result<bool, Self::Error>;

    /// Names with structured entries, used as the extraction lexicon
    fn entity_names(&self) -> Result<Vec<String>, Self::Error> {
        Ok(Vec::new())
    }

    /// The latest entry on the timeline, which dates the setting
    fn latest_event(&self) -> Result<Option<TimelineFact>, Self::Error> {
        Ok(None)
    }
}
