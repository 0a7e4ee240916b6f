//! Dossier - the final, evidence-linked record of a verification run
//!
//! A dossier is built once at the end of a run and has no mutating methods.
//! It contains no wall-clock data, so identical inputs serialize to
//! byte-identical JSON.

use crate::claim::{ClaimId, ClaimKind};
use crate::evidence::{EvidenceSource, Polarity};
use crate::span::Span;
use crate::verdict::Verdict;
use serde::{Deserialize, Serialize};

/// Per-claim condition recorded alongside the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimFlag {
    /// Narrative memory did not answer in time; evidence dropped
    RetrievalTimeout,
    /// Narrative memory returned an error; evidence dropped
    RetrievalFailed,
    /// Claim is part of a reference cycle
    DependencyCycle,
    /// Verdict capped because a referenced claim was not supported
    DependencyCapped,
    /// Claim names something the novel's period cannot contain
    Anachronism,
}

/// One cited evidence item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Span in the novel
    pub span: Span,
    /// Kind of source
    pub source: EvidenceSource,
    /// Judged polarity
    pub polarity: Polarity,
    /// Retrieval relevance
    pub relevance: f64,
    /// Passage text or fact rendering
    pub excerpt: String,
}

/// Outcome for one claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Claim identifier
    pub claim_id: ClaimId,
    /// Extraction order
    pub ordinal: usize,
    /// Span in the backstory
    pub span: Span,
    /// Normalized claim text
    pub text: String,
    /// Claim kind
    pub kind: ClaimKind,
    /// Subject entities, sorted
    pub entities: Vec<String>,
    /// Referenced antecedent claims
    pub references: Vec<ClaimId>,
    /// Claim verdict
    pub verdict: Verdict,
    /// Claim score [0, 1]
    pub score: f64,
    /// Evidence in ranked order
    pub citations: Vec<Citation>,
    /// Mean relevance of the citations (0.0 when none)
    pub mean_relevance: f64,
    /// Degradations and caps applied to this claim
    pub flags: Vec<ClaimFlag>,
}

/// Minimal submission record: id, verdict, confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Document identifier
    pub id: String,
    /// Document verdict
    pub prediction: Verdict,
    /// Document score
    pub confidence: f64,
}

/// Verdict of a document paired with full per-claim provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dossier {
    document_id: String,
    verdict: Verdict,
    score: f64,
    rationale: String,
    total_evidence: usize,
    claims: Vec<ClaimRecord>,
}

impl Dossier {
    /// Assemble a dossier; `claims` must already be in extraction order
    pub fn new(
        document_id: impl Into<String>,
        verdict: Verdict,
        score: f64,
        rationale: impl Into<String>,
        claims: Vec<ClaimRecord>,
    ) -> Self {
        let total_evidence = claims.iter().map(|c| c.citations.len()).sum();
        Self {
            document_id: document_id.into(),
            verdict,
            score,
            rationale: rationale.into(),
            total_evidence,
            claims,
        }
    }

    /// Document identifier
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Document verdict
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Document score [0, 1]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// One-sentence explanation of the document verdict
    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    /// Number of citations across all claims
    pub fn total_evidence(&self) -> usize {
        self.total_evidence
    }

    /// Claim records in extraction order
    pub fn claims(&self) -> &[ClaimRecord] {
        &self.claims
    }

    /// Look up a claim record by id
    pub fn claim(&self, id: ClaimId) -> Option<&ClaimRecord> {
        self.claims.iter().find(|c| c.claim_id == id)
    }

    /// Submission record for this document
    pub fn prediction(&self) -> Prediction {
        Prediction {
            id: self.document_id.clone(),
            prediction: self.verdict,
            confidence: self.score,
        }
    }

    /// Pretty JSON rendering; identical dossiers render identically
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a dossier previously rendered with [`Dossier::to_json`]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ordinal: usize, verdict: Verdict, citations: usize) -> ClaimRecord {
        ClaimRecord {
            claim_id: ClaimId::derive("doc", ordinal),
            ordinal,
            span: Span::new(0, 10),
            text: "Anna left Paris".to_string(),
            kind: ClaimKind::Factual,
            entities: vec!["Anna".to_string()],
            references: Vec::new(),
            verdict,
            score: 0.75,
            citations: (0..citations)
                .map(|i| Citation {
                    span: Span::new(i * 100, i * 100 + 50),
                    source: EvidenceSource::Passage,
                    polarity: Polarity::Supports,
                    relevance: 0.5,
                    excerpt: "Anna left Paris at dawn".to_string(),
                })
                .collect(),
            mean_relevance: 0.5,
            flags: Vec::new(),
        }
    }

    #[test]
    fn test_total_evidence_counted() {
        let dossier = Dossier::new(
            "doc",
            Verdict::Supported,
            0.75,
            "all good",
            vec![record(0, Verdict::Supported, 2), record(1, Verdict::Supported, 3)],
        );
        assert_eq!(dossier.total_evidence(), 5);
        assert!(dossier.claim(ClaimId::derive("doc", 1)).is_some());
    }

    #[test]
    fn test_prediction() {
        let dossier = Dossier::new("case-9", Verdict::Contradicted, 0.9, "x", vec![]);
        let prediction = dossier.prediction();
        assert_eq!(prediction.id, "case-9");
        assert_eq!(prediction.prediction, Verdict::Contradicted);
        assert_eq!(prediction.confidence, 0.9);
    }

    #[test]
    fn test_json_is_stable() {
        let dossier = Dossier::new("doc", Verdict::Supported, 0.75, "ok", vec![record(0, Verdict::Supported, 1)]);
        let first = dossier.to_json().unwrap();
        let second = dossier.clone().to_json().unwrap();
        assert_eq!(first, second);
        assert_eq!(Dossier::from_json(&first).unwrap(), dossier);
    }
}
