//! Dossier assembly

use crate::aggregator::DocumentDecision;
use crate::error::AggregationError;
use canon_checker::ClaimAssessment;
use canon_domain::{Citation, Claim, ClaimId, ClaimRecord, Dossier, Evidence};
use std::collections::HashMap;
use tracing::debug;

/// Joins claims, their assessments and the document decision into a [`Dossier`]
pub struct DossierBuilder;

impl DossierBuilder {
    /// Build the dossier for one document
    ///
    /// Claim records follow extraction order and citations keep the order the
    /// checker ranked them in. Every claim needs exactly one assessment, and
    /// no assessment may name a claim outside `claims`.
    pub fn build(
        document_id: &str,
        claims: &[Claim],
        assessments: &[ClaimAssessment],
        decision: DocumentDecision,
    ) -> Result<Dossier, AggregationError> {
        let mut by_id: HashMap<ClaimId, &ClaimAssessment> = HashMap::with_capacity(assessments.len());
        for assessment in assessments {
            if by_id.insert(assessment.claim_id, assessment).is_some() {
                return Err(AggregationError::Inconsistency(format!(
                    "claim {} assessed more than once",
                    assessment.claim_id
                )));
            }
        }

        let mut ordered: Vec<&Claim> = claims.iter().collect();
        ordered.sort_by_key(|c| c.ordinal);

        let mut records = Vec::with_capacity(ordered.len());
        for claim in ordered {
            let assessment = by_id.remove(&claim.id).ok_or_else(|| {
                AggregationError::Inconsistency(format!("claim {} ({}) has no assessment", claim.ordinal, claim.id))
            })?;
            records.push(record(claim, assessment)?);
        }

        if let Some(stray) = by_id.keys().min() {
            return Err(AggregationError::Inconsistency(format!(
                "assessment for claim {} which was never extracted",
                stray
            )));
        }

        let dossier = Dossier::new(document_id, decision.verdict, decision.score, decision.rationale, records);
        debug!(
            "Built dossier for '{}': {} claims, {} citations",
            document_id,
            dossier.claims().len(),
            dossier.total_evidence()
        );
        Ok(dossier)
    }
}

fn record(claim: &Claim, assessment: &ClaimAssessment) -> Result<ClaimRecord, AggregationError> {
    if assessment.ordinal != claim.ordinal || assessment.kind != claim.kind {
        return Err(AggregationError::Inconsistency(format!(
            "assessment for claim {} does not match the claim",
            claim.ordinal
        )));
    }

    let citations: Vec<Citation> = assessment.evidence.iter().map(citation).collect();
    let mean_relevance = if citations.is_empty() {
        0.0
    } else {
        citations.iter().map(|c| c.relevance).sum::<f64>() / citations.len() as f64
    };

    Ok(ClaimRecord {
        claim_id: claim.id,
        ordinal: claim.ordinal,
        span: claim.span,
        text: claim.text.clone(),
        kind: claim.kind,
        entities: claim.entities.iter().cloned().collect(),
        references: claim.references.clone(),
        verdict: assessment.verdict,
        score: assessment.score,
        citations,
        mean_relevance,
        flags: assessment.flags.clone(),
    })
}

fn citation(evidence: &Evidence) -> Citation {
    Citation {
        span: evidence.span,
        source: evidence.source,
        polarity: evidence.polarity,
        relevance: evidence.relevance,
        excerpt: evidence.text.clone(),
    }
}
