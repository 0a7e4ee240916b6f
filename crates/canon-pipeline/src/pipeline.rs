//! End-to-end verification of one backstory

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use canon_aggregator::{Aggregator, DossierBuilder};
use canon_checker::{ClaimEvidence, ConsistencyChecker};
use canon_domain::{Claim, ClaimFlag, ClaimId, ClaimKind, Dossier, NarrativeMemory};
use canon_extractor::ClaimExtractor;
use canon_retriever::{EvidenceRetriever, LookupCache, Retrieval, RetrievalError};
use std::collections::HashSet;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Extracts, retrieves, checks and aggregates
///
/// Every run either produces a complete [`Dossier`] or an error; there are no
/// partial results.
pub struct Pipeline<M> {
    extractor: ClaimExtractor,
    retriever: Arc<EvidenceRetriever<M>>,
    checker: ConsistencyChecker,
    aggregator: Aggregator,
    config: PipelineConfig,
}

impl<M> Pipeline<M>
where
    M: NarrativeMemory + Send + Sync + 'static,
    M::Error: Display,
{
    /// Create a pipeline over `memory`
    ///
    /// The entity names known to `memory` become the extractor's lexicon and
    /// its latest timeline entry dates the setting for the world rules.
    pub fn new(memory: Arc<M>, config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;

        let mut extractor = ClaimExtractor::new(config.extractor.clone());
        match memory.entity_names() {
            Ok(names) => {
                debug!("Narrative memory supplied {} entity names", names.len());
                extractor = extractor.with_lexicon(names);
            }
            Err(e) => warn!("Could not read entity names from narrative memory: {}", e),
        }

        let mut checker = ConsistencyChecker::new(config.checker.clone()).with_scoring(config.scoring.clone());
        match memory.latest_event() {
            Ok(Some(latest)) => {
                debug!("Setting dated by '{}' at {}", latest.description, latest.timestamp);
                checker = checker.with_setting(latest);
            }
            Ok(None) => debug!("Narrative memory has no timeline; world rules disabled"),
            Err(e) => warn!("Could not read the timeline from narrative memory: {}", e),
        }

        Ok(Self {
            extractor,
            retriever: Arc::new(EvidenceRetriever::new(memory, config.retriever.clone())),
            checker,
            aggregator: Aggregator::new(config.aggregator.clone()),
            config,
        })
    }

    /// Pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Verify a backstory against the novel
    pub async fn verify(&self, document_id: &str, backstory: &str) -> Result<Dossier, PipelineError> {
        let claims = self.extractor.extract(document_id, backstory)?;
        info!("Extracted {} claims from '{}'", claims.len(), document_id);
        self.verify_claims(document_id, claims).await
    }

    /// Verify an already extracted claim set
    pub async fn verify_claims(&self, document_id: &str, claims: Vec<Claim>) -> Result<Dossier, PipelineError> {
        let inputs = self.retrieve_all(&claims).await?;
        let assessments = self.checker.check_all(&claims, inputs)?;
        let decision = self.aggregator.decide(&assessments)?;
        let dossier = DossierBuilder::build(document_id, &claims, &assessments, decision)?;

        info!(
            "Verified '{}': {} (score {:.3}, {} claims, {} citations)",
            document_id,
            dossier.verdict(),
            dossier.score(),
            dossier.claims().len(),
            dossier.total_evidence()
        );
        Ok(dossier)
    }

    /// Verify a backstory unless `cancel` completes first
    ///
    /// On cancellation all outstanding per-claim tasks are aborted and
    /// [`PipelineError::Cancelled`] is returned.
    pub async fn verify_with_cancel<C>(
        &self,
        document_id: &str,
        backstory: &str,
        cancel: C,
    ) -> Result<Dossier, PipelineError>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            result = self.verify(document_id, backstory) => result,
            _ = cancel => {
                info!("Verification of '{}' cancelled", document_id);
                Err(PipelineError::Cancelled)
            }
        }
    }

    /// One bounded task per claim; failures degrade the claim, not the run
    async fn retrieve_all(&self, claims: &[Claim]) -> Result<Vec<ClaimEvidence>, PipelineError> {
        let timeline = timeline_claims(claims);
        let cache = Arc::new(LookupCache::new());
        let permits = Arc::new(Semaphore::new(self.config.pipeline.max_concurrent_retrievals));

        // dropping the set aborts every task still running
        let mut tasks = JoinSet::new();
        for (i, claim) in claims.iter().enumerate() {
            let retriever = Arc::clone(&self.retriever);
            let cache = Arc::clone(&cache);
            let permits = Arc::clone(&permits);
            let claim = claim.clone();
            let needs_timeline = timeline.contains(&claim.id);
            tasks.spawn(async move {
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => retriever.retrieve(&claim, needs_timeline, &cache).await,
                    Err(e) => Err(RetrievalError::TaskFailed(e.to_string())),
                };
                (i, result)
            });
        }

        let mut inputs: Vec<ClaimEvidence> = vec![ClaimEvidence::default(); claims.len()];
        while let Some(joined) = tasks.join_next().await {
            let (i, result) = joined.map_err(|e| PipelineError::Task(e.to_string()))?;
            inputs[i] = match result {
                Ok(Retrieval { evidence, event }) => ClaimEvidence {
                    evidence,
                    event,
                    flags: Vec::new(),
                },
                Err(e) => {
                    warn!("Claim {} degraded to UNVERIFIABLE: {}", claims[i].ordinal, e);
                    ClaimEvidence {
                        flags: vec![if e.is_timeout() {
                            ClaimFlag::RetrievalTimeout
                        } else {
                            ClaimFlag::RetrievalFailed
                        }],
                        ..Default::default()
                    }
                }
            };
        }

        debug!(
            "Retrieval finished: {} lookups cached, {} hits, {} misses",
            cache.len(),
            cache.hits(),
            cache.misses()
        );
        Ok(inputs)
    }
}

/// Temporal claims and the claims they order themselves against
fn timeline_claims(claims: &[Claim]) -> HashSet<ClaimId> {
    let mut out = HashSet::new();
    for claim in claims {
        if let ClaimKind::Temporal(_) = claim.kind {
            out.insert(claim.id);
            out.extend(claim.references.iter().copied());
        }
    }
    out
}
