//! Document-level decision
//!
//! The policy is applied over completed assessments only:
//! 1. Any CONTRADICTED claim scoring at least the significance threshold
//!    makes the document CONTRADICTED
//! 2. Otherwise the document is SUPPORTED when the score-weighted share of
//!    SUPPORTED claims exceeds the majority threshold
//! 3. Otherwise it is UNVERIFIABLE

use crate::config::AggregatorConfig;
use crate::error::AggregationError;
use canon_checker::ClaimAssessment;
use canon_domain::{ClaimId, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

/// Verdict, score and rationale for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDecision {
    /// Document verdict
    pub verdict: Verdict,
    /// Weighted mean of claim scores
    pub score: f64,
    /// One sentence naming the deciding claims
    pub rationale: String,
    /// Claims that decided the verdict, strongest first
    pub deciding: Vec<ClaimId>,
}

/// Applies the document policy to a set of claim assessments
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: AggregatorConfig,
}

impl Aggregator {
    /// Create an aggregator
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    /// Aggregator configuration
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Decide the document verdict
    ///
    /// # Errors
    /// [`AggregationError::Empty`] for no assessments, and
    /// [`AggregationError::Inconsistency`] for a score outside [0, 1] or a
    /// claim assessed twice.
    pub fn decide(&self, assessments: &[ClaimAssessment]) -> Result<DocumentDecision, AggregationError> {
        if assessments.is_empty() {
            return Err(AggregationError::Empty);
        }
        validate(assessments)?;

        let score = self.document_score(assessments);
        let decision = match self.significant_contradictions(assessments) {
            deciding if !deciding.is_empty() => {
                let strongest = deciding[0];
                let rationale = if deciding.len() == 1 {
                    format!(
                        "Contradicted by claim {} (score {:.2}, significance {:.2})",
                        strongest.ordinal, strongest.score, self.config.significance_threshold
                    )
                } else {
                    format!(
                        "Contradicted by claims {} (strongest: claim {} at {:.2}, significance {:.2})",
                        ordinal_list(&deciding),
                        strongest.ordinal,
                        strongest.score,
                        self.config.significance_threshold
                    )
                };
                DocumentDecision {
                    verdict: Verdict::Contradicted,
                    score,
                    rationale,
                    deciding: deciding.iter().map(|a| a.claim_id).collect(),
                }
            }
            _ => self.majority_decision(assessments, score),
        };

        info!(
            "Document decision: {} (score {:.3}, {} claims)",
            decision.verdict,
            decision.score,
            assessments.len()
        );
        Ok(decision)
    }

    fn majority_decision(&self, assessments: &[ClaimAssessment], score: f64) -> DocumentDecision {
        let share = supported_share(assessments);
        let mut supported: Vec<&ClaimAssessment> =
            assessments.iter().filter(|a| a.verdict == Verdict::Supported).collect();
        sort_strongest_first(&mut supported);

        if share > self.config.majority_threshold {
            return DocumentDecision {
                verdict: Verdict::Supported,
                score,
                rationale: format!(
                    "Supported by claims {}: score-weighted share {:.2} of {} claims exceeds {:.2}",
                    ordinal_list(&supported),
                    share,
                    assessments.len(),
                    self.config.majority_threshold
                ),
                deciding: supported.iter().map(|a| a.claim_id).collect(),
            };
        }

        let weak_contradictions = assessments
            .iter()
            .filter(|a| a.verdict == Verdict::Contradicted)
            .count();
        let mut rationale = format!(
            "Unverifiable: score-weighted supported share {:.2} of {} claims does not exceed {:.2}",
            share,
            assessments.len(),
            self.config.majority_threshold
        );
        if weak_contradictions > 0 {
            rationale.push_str(&format!(
                "; {} contradicted claim(s) below significance {:.2}",
                weak_contradictions, self.config.significance_threshold
            ));
        }

        DocumentDecision {
            verdict: Verdict::Unverifiable,
            score,
            rationale,
            deciding: Vec::new(),
        }
    }

    fn significant_contradictions<'a>(&self, assessments: &'a [ClaimAssessment]) -> Vec<&'a ClaimAssessment> {
        let mut found: Vec<&ClaimAssessment> = assessments
            .iter()
            .filter(|a| a.verdict == Verdict::Contradicted && a.score >= self.config.significance_threshold)
            .collect();
        sort_strongest_first(&mut found);
        found
    }

    /// Weighted mean: factual claims weigh 1, dependent claims more
    fn document_score(&self, assessments: &[ClaimAssessment]) -> f64 {
        let (weighted, total) = assessments.iter().fold((0.0, 0.0), |(sum, weights), a| {
            let w = if a.kind.is_dependent() {
                self.config.dependent_claim_weight
            } else {
                1.0
            };
            (sum + w * a.score, weights + w)
        });
        if total > 0.0 {
            (weighted / total).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Σ score of SUPPORTED claims over the number of claims
///
/// Unverifiable claims score zero yet stay in the denominator: a document
/// whose claims mostly find no evidence must not reach a majority.
pub fn supported_share(assessments: &[ClaimAssessment]) -> f64 {
    if assessments.is_empty() {
        return 0.0;
    }
    let supported: f64 = assessments
        .iter()
        .filter(|a| a.verdict == Verdict::Supported)
        .map(|a| a.score)
        .sum();
    supported / assessments.len() as f64
}

fn validate(assessments: &[ClaimAssessment]) -> Result<(), AggregationError> {
    let mut seen = HashSet::with_capacity(assessments.len());
    for a in assessments {
        if !a.score.is_finite() || !(0.0..=1.0).contains(&a.score) {
            return Err(AggregationError::Inconsistency(format!(
                "claim {} has score {} outside [0, 1]",
                a.ordinal, a.score
            )));
        }
        if !seen.insert(a.claim_id) {
            return Err(AggregationError::Inconsistency(format!(
                "claim {} assessed more than once",
                a.claim_id
            )));
        }
    }
    Ok(())
}

/// Highest score first, extraction order on ties
fn sort_strongest_first(items: &mut [&ClaimAssessment]) {
    items.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.ordinal.cmp(&b.ordinal)));
}

fn ordinal_list(items: &[&ClaimAssessment]) -> String {
    items
        .iter()
        .map(|a| a.ordinal.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}


#[cfg(test)]
mod proptests {
    use super::*;
    use canon_domain::ClaimKind;
    use proptest::prelude::*;

    fn assessments() -> impl Strategy<Value = Vec<ClaimAssessment>> {
        let verdict = prop_oneof![
            Just(Verdict::Supported),
            Just(Verdict::Contradicted),
            Just(Verdict::Unverifiable)
        ];
        let kind = prop_oneof![Just(ClaimKind::Factual), Just(ClaimKind::Causal)];
        prop::collection::vec((verdict, kind, 0.0f64..=1.0), 1..12).prop_map(|items| {
            items
                .into_iter()
                .enumerate()
                .map(|(i, (verdict, kind, score))| ClaimAssessment {
                    claim_id: ClaimId::derive("doc", i),
                    ordinal: i,
                    kind,
                    verdict,
                    score,
                    evidence: Vec::new(),
                    capped: false,
                    flags: Vec::new(),
                })
                .collect()
        })
    }

    proptest! {
        /// Property: a significant contradiction always decides the document
        #[test]
        fn test_contradiction_override(items in assessments()) {
            let aggregator = Aggregator::default();
            let decision = aggregator.decide(&items).unwrap();
            let significant = items
                .iter()
                .any(|a| a.verdict == Verdict::Contradicted && a.score >= 0.7);
            prop_assert_eq!(decision.verdict == Verdict::Contradicted, significant);
        }

        /// Property: the document score stays in [0, 1]
        #[test]
        fn test_document_score_in_range(items in assessments()) {
            let decision = Aggregator::default().decide(&items).unwrap();
            prop_assert!((0.0..=1.0).contains(&decision.score));
        }

        /// Property: deciding is a pure function of its input
        #[test]
        fn test_decision_deterministic(items in assessments()) {
            let aggregator = Aggregator::default();
            prop_assert_eq!(aggregator.decide(&items).unwrap(), aggregator.decide(&items).unwrap());
        }
    }
}
