//! Consistency checking per claim kind

use crate::config::CheckerConfig;
use crate::error::CheckerError;
use crate::graph::DependencyGraph;
use crate::judge::{EvidenceJudge, LexicalJudge};
use canon_domain::{
    ranking_order, score_claim, Claim, ClaimFlag, ClaimId, ClaimKind, Evidence, EvidenceSource, Polarity,
    ScoringConfig, TemporalOrder, TimelineFact, Verdict,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// What the checker is given for one claim
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClaimEvidence {
    /// Retrieved evidence, neutral
    pub evidence: Vec<Evidence>,
    /// The claim's own resolved timeline entry
    pub event: Option<TimelineFact>,
    /// Conditions recorded during retrieval (timeouts, failures)
    pub flags: Vec<ClaimFlag>,
}

/// An already-checked claim that the current claim references
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    /// Referenced claim
    pub id: ClaimId,
    /// Its verdict
    pub verdict: Verdict,
    /// Its resolved timeline entry
    pub event: Option<TimelineFact>,
}

/// Everything besides the claim's own evidence that a check may look at
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CheckContext {
    /// The claim's own resolved timeline entry
    pub event: Option<TimelineFact>,
    /// Referenced claims, in reference order
    pub dependencies: Vec<Dependency>,
}

/// Result of checking one claim
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    /// Verdict
    pub verdict: Verdict,
    /// Evidence in ranked order, with polarity assigned
    pub evidence: Vec<Evidence>,
    /// True when a dependency forced the verdict down to UNVERIFIABLE
    pub capped: bool,
}

/// Checked and scored claim
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimAssessment {
    /// Claim identifier
    pub claim_id: ClaimId,
    /// Extraction order
    pub ordinal: usize,
    /// Claim kind
    pub kind: ClaimKind,
    /// Verdict
    pub verdict: Verdict,
    /// Score in [0, 1]
    pub score: f64,
    /// Evidence in ranked order, with polarity assigned
    pub evidence: Vec<Evidence>,
    /// Verdict capped by a dependency
    pub capped: bool,
    /// Degradations and caps
    pub flags: Vec<ClaimFlag>,
}

/// Assigns verdicts and evidence polarity to claims
#[derive(Clone)]
pub struct ConsistencyChecker {
    config: CheckerConfig,
    scoring: ScoringConfig,
    setting: Option<TimelineFact>,
    judge: Arc<dyn EvidenceJudge>,
}

impl std::fmt::Debug for ConsistencyChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsistencyChecker")
            .field("config", &self.config)
            .field("scoring", &self.scoring)
            .field("setting", &self.setting)
            .finish_non_exhaustive()
    }
}

impl ConsistencyChecker {
    /// Create a checker using the lexical judge and default scoring
    pub fn new(config: CheckerConfig) -> Self {
        let judge = Arc::new(LexicalJudge::new(config.support_overlap));
        Self {
            config,
            scoring: ScoringConfig::default(),
            setting: None,
            judge,
        }
    }

    /// Replace the evidence judge
    pub fn with_judge(mut self, judge: impl EvidenceJudge + 'static) -> Self {
        self.judge = Arc::new(judge);
        self
    }

    /// Replace the scoring constants
    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    /// Date the novel's setting by its latest timeline entry
    ///
    /// Without a setting the world rules never apply.
    pub fn with_setting(mut self, latest: TimelineFact) -> Self {
        self.setting = Some(latest);
        self
    }

    /// Checker configuration
    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Check one claim
    ///
    /// Dispatches on the claim kind; each rule only reads its inputs. A claim
    /// breaking the world rules is CONTRADICTED whatever its kind.
    pub fn check(&self, claim: &Claim, mut evidence: Vec<Evidence>, ctx: &CheckContext) -> CheckOutcome {
        evidence.sort_by(ranking_order);
        let outcome = match claim.kind {
            ClaimKind::Factual => self.check_factual(claim, evidence),
            ClaimKind::Temporal(order) => self.check_temporal(order, evidence, ctx),
            ClaimKind::Causal => self.check_causal(claim, evidence, ctx),
        };
        match self.anachronism(claim) {
            Some((keyword, setting)) => {
                debug!(
                    "Claim {} names '{}' in a setting dated {}",
                    claim.ordinal, keyword, setting.timestamp
                );
                contradicted_by_setting(outcome, setting)
            }
            None => outcome,
        }
    }

    /// The anachronism `claim` names and the timeline entry dating the setting
    fn anachronism(&self, claim: &Claim) -> Option<(&str, &TimelineFact)> {
        let setting = self.setting.as_ref()?;
        let keyword = self.config.world.anachronism_in(&claim.text, setting.timestamp)?;
        Some((keyword, setting))
    }

    fn check_factual(&self, claim: &Claim, evidence: Vec<Evidence>) -> CheckOutcome {
        let evidence = self.judge_all(claim, evidence);
        CheckOutcome {
            verdict: verdict_from(&evidence),
            evidence,
            capped: false,
        }
    }

    fn check_temporal(&self, order: TemporalOrder, mut evidence: Vec<Evidence>, ctx: &CheckContext) -> CheckOutcome {
        let own = ctx.event.as_ref();
        let referenced = ctx.dependencies.first().and_then(|d| d.event.as_ref());

        let (Some(x), Some(y)) = (own, referenced) else {
            evidence.iter_mut().for_each(|e| e.polarity = Polarity::Neutral);
            return CheckOutcome {
                verdict: Verdict::Unverifiable,
                evidence,
                capped: own.is_some(),
            };
        };

        let polarity = if order.holds(x.timestamp, y.timestamp) {
            Polarity::Supports
        } else {
            Polarity::Contradicts
        };

        let mut cited = false;
        for item in evidence.iter_mut() {
            if item.source == EvidenceSource::Timeline && item.span == x.span {
                item.polarity = polarity;
                cited = true;
            } else {
                item.polarity = Polarity::Neutral;
            }
        }
        if !cited {
            // resolved directly from the timeline, so it is fully relevant
            evidence.push(Evidence::new(x.span, 1.0, EvidenceSource::Timeline, x.description.clone()).with_polarity(polarity));
            evidence.sort_by(ranking_order);
        }

        debug!(
            "Temporal check: {} vs {} ({:?}) -> {:?}",
            x.timestamp, y.timestamp, order, polarity
        );
        CheckOutcome {
            verdict: if polarity == Polarity::Supports {
                Verdict::Supported
            } else {
                Verdict::Contradicted
            },
            evidence,
            capped: false,
        }
    }

    fn check_causal(&self, claim: &Claim, evidence: Vec<Evidence>, ctx: &CheckContext) -> CheckOutcome {
        let evidence = self.judge_all(claim, evidence);
        let direct = verdict_from(&evidence);
        if direct == Verdict::Contradicted {
            return CheckOutcome {
                verdict: direct,
                evidence,
                capped: false,
            };
        }

        let antecedent_holds =
            !ctx.dependencies.is_empty() && ctx.dependencies.iter().all(|d| d.verdict == Verdict::Supported);
        if antecedent_holds {
            CheckOutcome {
                verdict: direct,
                evidence,
                capped: false,
            }
        } else {
            CheckOutcome {
                verdict: Verdict::Unverifiable,
                evidence,
                capped: true,
            }
        }
    }

    /// Judge every item, discarding contradictions at or below the threshold
    fn judge_all(&self, claim: &Claim, evidence: Vec<Evidence>) -> Vec<Evidence> {
        evidence
            .into_iter()
            .map(|item| {
                let polarity = match self.judge.judge(claim, &item) {
                    Polarity::Contradicts if item.relevance <= self.config.contradiction_threshold => {
                        Polarity::Neutral
                    }
                    other => other,
                };
                item.with_polarity(polarity)
            })
            .collect()
    }

    /// Check and score every claim of a document
    ///
    /// `inputs[i]` belongs to `claims[i]`. Claims are checked in dependency
    /// order; claims on a reference cycle are UNVERIFIABLE with neutral
    /// evidence. Assessments come back in the order of `claims`.
    pub fn check_all(&self, claims: &[Claim], inputs: Vec<ClaimEvidence>) -> Result<Vec<ClaimAssessment>, CheckerError> {
        if claims.len() != inputs.len() {
            return Err(CheckerError::EvidenceMismatch {
                expected: claims.len(),
                actual: inputs.len(),
            });
        }

        let plan = DependencyGraph::build(claims)?.plan();
        if let Some(cycle) = &plan.cycle_error {
            error!("{}; forcing {} claims to UNVERIFIABLE", cycle, cycle.claims.len());
        }

        let position: HashMap<ClaimId, usize> = claims.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
        let mut inputs: Vec<Option<ClaimEvidence>> = inputs.into_iter().map(Some).collect();
        let events: Vec<Option<TimelineFact>> = inputs
            .iter()
            .map(|i| i.as_ref().and_then(|i| i.event.clone()))
            .collect();
        let mut assessed: Vec<Option<ClaimAssessment>> = vec![None; claims.len()];

        for id in &plan.order {
            let Some(&i) = position.get(id) else { continue };
            let claim = &claims[i];
            let input = inputs[i].take().unwrap_or_default();
            let mut flags = input.flags;

            let outcome = if plan.is_cyclic(id) {
                flags.push(ClaimFlag::DependencyCycle);
                let mut evidence = input.evidence;
                evidence.sort_by(ranking_order);
                evidence.iter_mut().for_each(|e| e.polarity = Polarity::Neutral);
                CheckOutcome {
                    verdict: Verdict::Unverifiable,
                    evidence,
                    capped: true,
                }
            } else {
                let dependencies = claim
                    .references
                    .iter()
                    .filter_map(|r| {
                        let j = *position.get(r)?;
                        let verdict = assessed[j].as_ref().map_or(Verdict::Unverifiable, |a| a.verdict);
                        Some(Dependency {
                            id: *r,
                            verdict,
                            event: events[j].clone(),
                        })
                    })
                    .collect();
                let ctx = CheckContext {
                    event: input.event,
                    dependencies,
                };
                self.check(claim, input.evidence, &ctx)
            };

            if outcome.capped && claim.kind.is_dependent() && !flags.contains(&ClaimFlag::DependencyCycle) {
                flags.push(ClaimFlag::DependencyCapped);
            }
            if !plan.is_cyclic(id) && self.anachronism(claim).is_some() {
                flags.push(ClaimFlag::Anachronism);
            }
            flags.sort();
            flags.dedup();

            let score = score_claim(&claim.kind, outcome.verdict, &outcome.evidence, outcome.capped, &self.scoring);
            debug!(
                "Claim {} ({}): {} score {:.3} with {} evidence",
                claim.ordinal,
                claim.kind.label(),
                outcome.verdict,
                score,
                outcome.evidence.len()
            );

            assessed[i] = Some(ClaimAssessment {
                claim_id: claim.id,
                ordinal: claim.ordinal,
                kind: claim.kind,
                verdict: outcome.verdict,
                score,
                evidence: outcome.evidence,
                capped: outcome.capped,
                flags,
            });
        }

        let assessments: Vec<ClaimAssessment> = assessed.into_iter().flatten().collect();
        info!(
            "Checked {} claims: {} supported, {} contradicted, {} unverifiable",
            assessments.len(),
            assessments.iter().filter(|a| a.verdict == Verdict::Supported).count(),
            assessments.iter().filter(|a| a.verdict == Verdict::Contradicted).count(),
            assessments.iter().filter(|a| a.verdict == Verdict::Unverifiable).count(),
        );
        Ok(assessments)
    }
}

impl Default for ConsistencyChecker {
    fn default() -> Self {
        Self::new(CheckerConfig::default())
    }
}

/// Cite the setting's latest event against the claim
fn contradicted_by_setting(mut outcome: CheckOutcome, setting: &TimelineFact) -> CheckOutcome {
    let cited = outcome
        .evidence
        .iter_mut()
        .find(|e| e.source == EvidenceSource::Timeline && e.span == setting.span);
    match cited {
        Some(item) => item.polarity = Polarity::Contradicts,
        None => {
            outcome.evidence.push(
                Evidence::new(setting.span, 1.0, EvidenceSource::Timeline, setting.description.clone())
                    .with_polarity(Polarity::Contradicts),
            );
            outcome.evidence.sort_by(ranking_order);
        }
    }
    CheckOutcome {
        verdict: Verdict::Contradicted,
        evidence: outcome.evidence,
        capped: false,
    }
}

/// Contradiction wins over support; nothing decisive is UNVERIFIABLE
fn verdict_from(evidence: &[Evidence]) -> Verdict {
    if evidence.iter().any(|e| e.polarity == Polarity::Contradicts) {
        Verdict::Contradicted
    } else if evidence.iter().any(|e| e.polarity == Polarity::Supports) {
        Verdict::Supported
    } else {
        Verdict::Unverifiable
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use canon_domain::Span;
    use proptest::prelude::*;

    /// Reads the polarity from the evidence text
    struct TaggedJudge;

    impl EvidenceJudge for TaggedJudge {
        fn judge(&self, _: &Claim, evidence: &Evidence) -> Polarity {
            match evidence.text.as_str() {
                "+" => Polarity::Supports,
                "-" => Polarity::Contradicts,
                _ => Polarity::Neutral,
            }
        }
    }

    fn evidence_strategy() -> impl Strategy<Value = Vec<Evidence>> {
        prop::collection::vec((0.0f64..=1.0, prop_oneof![Just("+"), Just("-"), Just("0")]), 0..6).prop_map(|items| {
            items
                .into_iter()
                .enumerate()
                .map(|(i, (rel, tag))| Evidence::new(Span::new(i * 10, i * 10 + 5), rel, EvidenceSource::Passage, tag))
                .collect()
        })
    }

    proptest! {
        /// Property: a causal claim is never SUPPORTED when its antecedent is CONTRADICTED
        #[test]
        fn test_causal_never_supported_over_contradiction(evidence in evidence_strategy()) {
            let checker = ConsistencyChecker::default().with_judge(TaggedJudge);
            let claim = Claim::new(ClaimId::derive("doc", 1), 1, Span::new(0, 5), "x", ["A".to_string()], ClaimKind::Causal);
            let ctx = CheckContext {
                event: None,
                dependencies: vec![Dependency { id: ClaimId::derive("doc", 0), verdict: Verdict::Contradicted, event: None }],
            };
            let outcome = checker.check(&claim, evidence, &ctx);
            prop_assert_ne!(outcome.verdict, Verdict::Supported);
        }

        /// Property: a verdict other than UNVERIFIABLE always cites some evidence
        #[test]
        fn test_decided_claims_have_evidence(evidence in evidence_strategy()) {
            let checker = ConsistencyChecker::default().with_judge(TaggedJudge);
            let claim = Claim::new(ClaimId::derive("doc", 0), 0, Span::new(0, 5), "x", ["A".to_string()], ClaimKind::Factual);
            let outcome = checker.check(&claim, evidence, &CheckContext::default());
            if outcome.verdict != Verdict::Unverifiable {
                prop_assert!(!outcome.evidence.is_empty());
            }
        }
    }
}
