//! Claim scoring module
//!
//! Implements the deterministic confidence formula that turns a verdict and
//! its judged evidence into a score in [0, 1]:
//! 1. Base score per verdict
//! 2. Evidence contribution from the strongest item of the deciding polarity
//! 3. Dependency cap for causal/temporal claims left unverifiable

use crate::{ClaimKind, Evidence, Polarity, Verdict};
use serde::{Deserialize, Serialize};

/// Base score for a supported claim (default: 0.5)
pub const SUPPORTED_BASE: f64 = 0.5;

/// Base score for a contradicted claim (default: 0.5)
///
/// Contradiction is a confident, non-neutral outcome, so it starts from the
/// same base as support.
pub const CONTRADICTED_BASE: f64 = 0.5;

/// Base score for an unverifiable claim (default: 0.0)
pub const UNVERIFIABLE_BASE: f64 = 0.0;

/// Maximum contribution of evidence relevance (default: 0.5)
pub const EVIDENCE_WEIGHT: f64 = 0.5;

/// Score ceiling for dependent claims capped at unverifiable (default: 0.3)
pub const DEPENDENCY_CAP: f64 = 0.3;

/// Configuration for claim scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Base score for SUPPORTED
    pub supported_base: f64,
    /// Base score for CONTRADICTED
    pub contradicted_base: f64,
    /// Base score for UNVERIFIABLE
    pub unverifiable_base: f64,
    /// Weight applied to the deciding evidence relevance
    pub evidence_weight: f64,
    /// Ceiling for capped causal/temporal claims
    pub dependency_cap: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            supported_base: SUPPORTED_BASE,
            contradicted_base: CONTRADICTED_BASE,
            unverifiable_base: UNVERIFIABLE_BASE,
            evidence_weight: EVIDENCE_WEIGHT,
            dependency_cap: DEPENDENCY_CAP,
        }
    }
}

impl ScoringConfig {
    /// Validate that every reachable score lies in [0, 1]
    pub fn validate(&self) -> Result<(), String> {
        let values = [
            ("supported_base", self.supported_base),
            ("contradicted_base", self.contradicted_base),
            ("unverifiable_base", self.unverifiable_base),
            ("evidence_weight", self.evidence_weight),
            ("dependency_cap", self.dependency_cap),
        ];
        for (name, value) in values {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be in [0.0, 1.0], got {}", name, value));
            }
        }
        for (name, base) in &values[..3] {
            if base + self.evidence_weight > 1.0 + f64::EPSILON {
                return Err(format!("{} + evidence_weight must not exceed 1.0", name));
            }
        }
        Ok(())
    }
}

/// Compute a claim's score from its verdict and judged evidence
///
/// # Arguments
/// * `kind` - Claim kind; only causal/temporal claims are subject to the cap
/// * `verdict` - Verdict assigned by the checker
/// * `evidence` - Evidence with polarities assigned
/// * `capped` - True when an unresolved dependency forced the verdict down
/// * `config` - Scoring constants
///
/// The deciding polarity is `Supports` for SUPPORTED and `Contradicts` for
/// CONTRADICTED. For UNVERIFIABLE it is `Neutral`, widened to every
/// non-contradicting item when the claim is capped (its direct support no
/// longer decides, but still bounds confidence).
///
/// # Examples
///
/// ```
/// use canon_domain::{score_claim, ClaimKind, Evidence, EvidenceSource, Polarity, ScoringConfig, Span, Verdict};
///
/// let evidence = vec![
///     Evidence::new(Span::new(0, 40), 0.8, EvidenceSource::Passage, "...")
///         .with_polarity(Polarity::Supports),
/// ];
/// let score = score_claim(&ClaimKind::Factual, Verdict::Supported, &evidence, false, &ScoringConfig::default());
/// assert!((score - 0.9).abs() < 1e-9);
/// ```
pub fn score_claim(
    kind: &ClaimKind,
    verdict: Verdict,
    evidence: &[Evidence],
    capped: bool,
    config: &ScoringConfig,
) -> f64 {
    let base = match verdict {
        Verdict::Supported => config.supported_base,
        Verdict::Contradicted => config.contradicted_base,
        Verdict::Unverifiable => config.unverifiable_base,
    };

    let strongest = deciding_relevance(verdict, evidence, capped);
    let mut score = base + config.evidence_weight * strongest;

    if capped && kind.is_dependent() && verdict == Verdict::Unverifiable {
        score = score.min(config.dependency_cap);
    }

    score.clamp(0.0, 1.0)
}

/// Maximum relevance among evidence items of the deciding polarity
fn deciding_relevance(verdict: Verdict, evidence: &[Evidence], capped: bool) -> f64 {
    evidence
        .iter()
        .filter(|e| match verdict {
            Verdict::Supported => e.polarity == Polarity::Supports,
            Verdict::Contradicted => e.polarity == Polarity::Contradicts,
            Verdict::Unverifiable if capped => e.polarity != Polarity::Contradicts,
            Verdict::Unverifiable => e.polarity == Polarity::Neutral,
        })
        .map(|e| e.relevance)
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(0.0, 1.0))
        .fold(0.0, f64::max)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::{EvidenceSource, Span, TemporalOrder};
    use proptest::prelude::*;

    fn verdict_strategy() -> impl Strategy<Value = Verdict> {
        prop_oneof![
            Just(Verdict::Supported),
            Just(Verdict::Contradicted),
            Just(Verdict::Unverifiable),
        ]
    }

    fn kind_strategy() -> impl Strategy<Value = ClaimKind> {
        prop_oneof![
            Just(ClaimKind::Factual),
            Just(ClaimKind::Causal),
            Just(ClaimKind::Temporal(TemporalOrder::Before)),
        ]
    }

    fn evidence_strategy() -> impl Strategy<Value = Vec<Evidence>> {
        prop::collection::vec(
            (
                -1.0f64..2.0,
                prop_oneof![
                    Just(Polarity::Supports),
                    Just(Polarity::Contradicts),
                    Just(Polarity::Neutral),
                ],
            ),
            0..8,
        )
        .prop_map(|items| {
            items
                .into_iter()
                .enumerate()
                .map(|(i, (rel, pol))| {
                    Evidence::new(Span::new(i * 10, i * 10 + 5), rel, EvidenceSource::Passage, "t")
                        .with_polarity(pol)
                })
                .collect()
        })
    }

    proptest! {
        /// Property: scores always lie in [0, 1]
        #[test]
        fn test_score_range(
            kind in kind_strategy(),
            verdict in verdict_strategy(),
            evidence in evidence_strategy(),
            capped: bool,
        ) {
            let score = score_claim(&kind, verdict, &evidence, capped, &ScoringConfig::default());
            prop_assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
        }

        /// Property: scoring is a pure function of its inputs
        #[test]
        fn test_score_is_pure(
            kind in kind_strategy(),
            verdict in verdict_strategy(),
            evidence in evidence_strategy(),
            capped: bool,
        ) {
            let config = ScoringConfig::default();
            let first = score_claim(&kind, verdict, &evidence, capped, &config);
            let second = score_claim(&kind, verdict, &evidence, capped, &config);
            prop_assert_eq!(first.to_bits(), second.to_bits());
        }

        /// Property: capped dependent claims never exceed the dependency cap
        #[test]
        fn test_cap_respected(evidence in evidence_strategy()) {
            let config = ScoringConfig::default();
            let score = score_claim(&ClaimKind::Causal, Verdict::Unverifiable, &evidence, true, &config);
            prop_assert!(score <= config.dependency_cap);
        }

        /// Property: empty evidence never scores above the unverifiable base
        #[test]
        fn test_empty_evidence_unverifiable(kind in kind_strategy(), capped: bool) {
            let config = ScoringConfig::default();
            let score = score_claim(&kind, Verdict::Unverifiable, &[], capped, &config);
            prop_assert_eq!(score, config.unverifiable_base);
        }
    }
}
