//! Evidence judging
//!
//! A judge decides whether one evidence item supports, contradicts, or says
//! nothing about a claim. The checker applies the relevance gate and the
//! per-kind rules on top.

use canon_domain::text::{clauses, content_words, is_negated, overlap, tokens};
use canon_domain::{Claim, Evidence, Polarity};
use std::collections::BTreeSet;

/// Pairs of words that cannot both describe the same subject
const ANTONYMS: &[(&str, &str)] = &[
    ("alive", "dead"),
    ("alive", "died"),
    ("survived", "died"),
    ("married", "unmarried"),
    ("married", "single"),
    ("married", "widowed"),
    ("rich", "poor"),
    ("wealthy", "poor"),
    ("young", "old"),
    ("guilty", "innocent"),
    ("loved", "hated"),
    ("friend", "enemy"),
    ("friends", "enemies"),
    ("won", "lost"),
    ("present", "absent"),
    ("honest", "dishonest"),
    ("legitimate", "illegitimate"),
    ("free", "imprisoned"),
    ("stayed", "left"),
    ("arrived", "departed"),
];

/// Assigns a polarity to one evidence item for one claim
pub trait EvidenceJudge: Send + Sync {
    /// Judge `evidence` against `claim`
    fn judge(&self, claim: &Claim, evidence: &Evidence) -> Polarity;
}

/// Content-word overlap, negation parity and an antonym table
#[derive(Debug, Clone)]
pub struct LexicalJudge {
    support_overlap: f64,
}

impl LexicalJudge {
    /// Create a judge; evidence covering at least `support_overlap` of the
    /// claim's key words agrees or disagrees with it, anything less is neutral
    pub fn new(support_overlap: f64) -> Self {
        Self { support_overlap }
    }
}

impl Default for LexicalJudge {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl EvidenceJudge for LexicalJudge {
    fn judge(&self, claim: &Claim, evidence: &Evidence) -> Polarity {
        let keys = key_words(claim);
        let words = content_words(&evidence.text);
        if keys.is_empty() || words.is_empty() {
            return Polarity::Neutral;
        }

        if antonym_conflict(&keys, &words) && shares_subject(claim, &keys, &words) {
            return Polarity::Contradicts;
        }

        if overlap(&keys, &words) < self.support_overlap {
            return Polarity::Neutral;
        }
        if is_negated(&claim.text) != is_negated(&matching_clause(&keys, &evidence.text)) {
            Polarity::Contradicts
        } else {
            Polarity::Supports
        }
    }
}

/// Claim content words that are not part of an entity name
///
/// Falls back to all content words when the claim is nothing but names.
fn key_words(claim: &Claim) -> Vec<String> {
    let all = content_words(&claim.text);
    let names: BTreeSet<String> = claim.entities.iter().flat_map(|e| tokens(e)).collect();
    let keys: Vec<String> = all.iter().filter(|w| !names.contains(*w)).cloned().collect();
    if keys.is_empty() {
        all
    } else {
        keys
    }
}

/// The evidence clause covering most of the claim's key words
///
/// Negation elsewhere in a passage says nothing about the claim.
fn matching_clause(keys: &[String], text: &str) -> String {
    let mut best: Option<(f64, String)> = None;
    for clause in clauses(text) {
        let score = overlap(keys, &content_words(&clause));
        if best.as_ref().map_or(true, |(top, _)| score > *top) {
            best = Some((score, clause));
        }
    }
    best.map(|(_, clause)| clause).unwrap_or_else(|| text.to_string())
}

fn antonym_conflict(claim_words: &[String], evidence_words: &[String]) -> bool {
    let has = |set: &[String], w: &str| set.iter().any(|x| x == w);
    ANTONYMS.iter().any(|&(a, b)| {
        (has(claim_words, a) && has(evidence_words, b)) || (has(claim_words, b) && has(evidence_words, a))
    })
}

/// Evidence is about the claim's subject if it names an entity or shares a key word
fn shares_subject(claim: &Claim, keys: &[String], words: &[String]) -> bool {
    let names_entity = claim.entities.iter().any(|e| {
        let parts = tokens(e);
        !parts.is_empty() && parts.iter().all(|p| words.contains(p))
    });
    names_entity || keys.iter().any(|k| words.contains(k))
}
