//! Serializable form of a narrative store
//!
//! Lets a pre-built timeline and character table be shipped as JSON or TOML
//! next to the novel and loaded without rebuilding them.

use crate::{InMemoryNarrative, MemoryError};
use canon_domain::{NarrativeTime, Span};
use serde::{Deserialize, Serialize};

/// A stored passage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageEntry {
    /// Span in the novel
    pub span: Span,
    /// Passage text
    pub text: String,
}

/// A timeline entry; `entity` is absent for world events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEntry {
    /// Participant, if any
    #[serde(default)]
    pub entity: Option<String>,
    /// Event description
    pub description: String,
    /// Position on the timeline
    pub timestamp: NarrativeTime,
    /// Where the event is narrated
    pub span: Span,
}

/// A character table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterEntry {
    /// Character name
    pub entity: String,
    /// Attribute name
    pub attribute: String,
    /// Attribute value
    pub value: String,
    /// Where the fact is established
    pub span: Span,
}

/// Everything an [`InMemoryNarrative`] is built from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeSnapshot {
    /// Free-text passages
    pub passages: Vec<PassageEntry>,
    /// Timeline events
    pub events: Vec<EventEntry>,
    /// Character facts
    pub characters: Vec<CharacterEntry>,
}

impl NarrativeSnapshot {
    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self, MemoryError> {
        serde_json::from_str(json).map_err(|e| MemoryError::InvalidSnapshot(e.to_string()))
    }

    /// Reject entries the store could never match
    pub fn validate(&self) -> Result<(), MemoryError> {
        if let Some(p) = self.passages.iter().find(|p| p.text.trim().is_empty()) {
            return Err(MemoryError::InvalidSnapshot(format!("empty passage at {}", p.span)));
        }
        if let Some(e) = self.events.iter().find(|e| e.description.trim().is_empty()) {
            return Err(MemoryError::InvalidSnapshot(format!(
                "event at {} has no description",
                e.span
            )));
        }
        if let Some(c) = self
            .characters
            .iter()
            .find(|c| c.entity.trim().is_empty() || c.attribute.trim().is_empty())
        {
            return Err(MemoryError::InvalidSnapshot(format!(
                "character fact at {} needs an entity and an attribute",
                c.span
            )));
        }
        Ok(())
    }

    /// Build the store
    pub fn into_memory(self) -> Result<InMemoryNarrative, MemoryError> {
        self.validate()?;

        let mut memory = InMemoryNarrative::new();
        for p in self.passages {
            memory = memory.with_passage(p.span, p.text);
        }
        for e in self.events {
            memory = match e.entity {
                Some(entity) => memory.with_event(&entity, e.description, e.timestamp, e.span),
                None => memory.with_world_event(e.description, e.timestamp, e.span),
            };
        }
        for c in self.characters {
            memory = memory.with_character_fact(&c.entity, c.attribute, c.value, c.span);
        }
        Ok(memory)
    }
}

impl TryFrom<NarrativeSnapshot> for InMemoryNarrative {
    type Error = MemoryError;

    fn try_from(snapshot: NarrativeSnapshot) -> Result<Self, Self::Error> {
        snapshot.into_memory()
    }
}
