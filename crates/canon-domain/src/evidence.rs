//! Evidence retrieved from the novel for a single claim

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Where a piece of evidence came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    /// Free-text passage found by similarity search
    Passage,
    /// Entry of the novel's event timeline
    Timeline,
    /// Entry of the character table
    CharacterFact,
}

impl EvidenceSource {
    /// True for timeline and character table entries
    pub fn is_structured(&self) -> bool {
        !matches!(self, EvidenceSource::Passage)
    }
}

/// Relation of a piece of evidence to its claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// The evidence backs the claim
    Supports,
    /// The evidence asserts something incompatible with the claim
    Contradicts,
    /// Not yet judged, or judged as saying nothing decisive
    #[default]
    Neutral,
}

/// A unit of support or refutation for one claim
///
/// Polarity is [`Polarity::Neutral`] at retrieval time and assigned by the
/// consistency checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Span in the novel
    pub span: Span,

    /// Relevance to the claim [0.0, 1.0]
    pub relevance: f64,

    /// Passage, timeline entry or character fact
    pub source: EvidenceSource,

    /// Text of the passage or a rendering of the structured fact
    pub text: String,

    /// Assigned during checking
    pub polarity: Polarity,
}

impl Evidence {
    /// Create a neutral evidence item, clamping relevance into [0, 1]
    pub fn new(span: Span, relevance: f64, source: EvidenceSource, text: impl Into<String>) -> Self {
        let relevance = if relevance.is_finite() {
            relevance.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            span,
            relevance,
            source,
            text: text.into(),
            polarity: Polarity::Neutral,
        }
    }

    /// True if this came from the timeline or character table
    pub fn is_structured_fact(&self) -> bool {
        self.source.is_structured()
    }

    /// Copy with the given polarity
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }
}

/// Canonical ranking order for evidence.
///
/// Higher relevance first; on exactly equal relevance structured facts come
/// before free text; then by span and text so the order is total.
pub fn ranking_order(a: &Evidence, b: &Evidence) -> Ordering {
    b.relevance
        .total_cmp(&a.relevance)
        .then_with(|| b.is_structured_fact().cmp(&a.is_structured_fact()))
        .then_with(|| a.span.cmp(&b.span))
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| a.text.cmp(&b.text))
}
