//! Core Evidence Retriever implementation

use crate::cache::{CachedLookup, LookupCache, LookupKey};
use crate::config::RetrieverConfig;
use crate::error::RetrievalError;
use crate::merge::{merge, Candidates};
use canon_domain::{CharacterFact, Claim, Evidence, NarrativeMemory, Passage, TimelineFact};
use std::fmt::Display;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Evidence gathered for one claim
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Retrieval {
    /// Ranked evidence, all neutral
    pub evidence: Vec<Evidence>,
    /// The claim's own position on the timeline, when it was requested and found
    pub event: Option<TimelineFact>,
}

impl Retrieval {
    /// A retrieval with no evidence, used for degraded claims
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Queries narrative memory for the evidence of individual claims
///
/// Memory calls are synchronous; each runs on the blocking pool under the
/// lookup timeout, and all calls of one claim share the claim budget.
pub struct EvidenceRetriever<M> {
    memory: Arc<M>,
    config: RetrieverConfig,
}

impl<M> EvidenceRetriever<M>
where
    M: NarrativeMemory + Send + Sync + 'static,
    M::Error: Display,
{
    /// Create a new retriever over a shared memory
    pub fn new(memory: Arc<M>, config: RetrieverConfig) -> Self {
        Self { memory, config }
    }

    /// Retriever configuration
    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Gather ranked evidence for `claim`
    ///
    /// Free-text search and the structured lookups run concurrently. With
    /// `needs_timeline` the claim's own event time is resolved as well.
    /// Nothing clearing the relevance threshold yields an empty evidence set,
    /// not an error.
    pub async fn retrieve(
        &self,
        claim: &Claim,
        needs_timeline: bool,
        cache: &LookupCache,
    ) -> Result<Retrieval, RetrievalError> {
        match timeout(self.config.claim_timeout(), self.gather(claim, needs_timeline, cache)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Claim {} exceeded its {} ms retrieval budget",
                    claim.ordinal, self.config.claim_timeout_ms
                );
                Err(RetrievalError::Timeout(self.config.claim_timeout_ms))
            }
        }
    }

    async fn gather(
        &self,
        claim: &Claim,
        needs_timeline: bool,
        cache: &LookupCache,
    ) -> Result<Retrieval, RetrievalError> {
        let entities: Vec<String> = claim.entities.iter().cloned().collect();
        let query = build_query(claim);

        let (main, per_entity, structured) = tokio::join!(
            self.passages(query, entities.clone(), self.config.candidate_pool(), cache),
            self.entity_passages(claim, cache),
            self.structured(claim, needs_timeline, cache),
        );

        let mut passages = main?;
        passages.extend(per_entity?);
        let (facts, event) = structured?;

        debug!(
            "Claim {} ({}): {} passages, {} facts, event {}",
            claim.ordinal,
            claim.kind.label(),
            passages.len(),
            facts.len(),
            if event.is_some() { "resolved" } else { "unresolved" }
        );

        let evidence = merge(
            &claim.text,
            Candidates {
                passages,
                facts,
                event: event.clone(),
            },
            &self.config,
        );

        Ok(Retrieval { evidence, event })
    }

    async fn entity_passages(&self, claim: &Claim, cache: &LookupCache) -> Result<Vec<Passage>, RetrievalError> {
        if !self.config.entity_queries {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entity in &claim.entities {
            let query = if claim.attributes.is_empty() {
                entity.clone()
            } else {
                format!("{} {}", entity, claim.attributes.join(" "))
            };
            out.extend(
                self.passages(query, vec![entity.clone()], self.config.entity_query_top_k, cache)
                    .await?,
            );
        }
        Ok(out)
    }

    async fn structured(
        &self,
        claim: &Claim,
        needs_timeline: bool,
        cache: &LookupCache,
    ) -> Result<(Vec<CharacterFact>, Option<TimelineFact>), RetrievalError> {
        let mut known = Vec::new();
        for entity in &claim.entities {
            if self.knows_entity(entity, cache).await? {
                known.push(entity.clone());
            }
        }
        if known.is_empty() {
            return Ok((Vec::new(), None));
        }

        let pairs: Vec<(String, String)> = known
            .iter()
            .flat_map(|e| claim.attributes.iter().map(move |a| (e.clone(), a.clone())))
            .take(self.config.max_fact_lookups)
            .collect();
        let mut facts = Vec::new();
        for (entity, attribute) in &pairs {
            if let Some(fact) = self.character_fact(entity, attribute, cache).await? {
                facts.push(fact);
            }
        }

        let mut event = None;
        if needs_timeline {
            for entity in &known {
                event = self.event_time(entity, &claim.text, cache).await?;
                if event.is_some() {
                    break;
                }
            }
        }

        Ok((facts, event))
    }

    async fn passages(
        &self,
        query: String,
        entities: Vec<String>,
        top_k: usize,
        cache: &LookupCache,
    ) -> Result<Vec<Passage>, RetrievalError> {
        let key = LookupKey::Passages {
            query: query.clone(),
            entities: entities.clone(),
            top_k,
        };
        if let Some(CachedLookup::Passages(hit)) = cache.get(&key) {
            return Ok(hit);
        }
        let found = self
            .call(move |m| m.retrieve_passages(&query, &entities, top_k))
            .await?;
        cache.insert(key, CachedLookup::Passages(found.clone()));
        Ok(found)
    }

    async fn knows_entity(&self, entity: &str, cache: &LookupCache) -> Result<bool, RetrievalError> {
        let key = LookupKey::KnowsEntity(entity.to_string());
        if let Some(CachedLookup::KnowsEntity(hit)) = cache.get(&key) {
            return Ok(hit);
        }
        let name = entity.to_string();
        let known = self.call(move |m| m.knows_entity(&name)).await?;
        cache.insert(key, CachedLookup::KnowsEntity(known));
        Ok(known)
    }

    async fn character_fact(
        &self,
        entity: &str,
        attribute: &str,
        cache: &LookupCache,
    ) -> Result<Option<CharacterFact>, RetrievalError> {
        let key = LookupKey::CharacterFact {
            entity: entity.to_string(),
            attribute: attribute.to_string(),
        };
        if let Some(CachedLookup::CharacterFact(hit)) = cache.get(&key) {
            return Ok(hit);
        }
        let (name, attr) = (entity.to_string(), attribute.to_string());
        let found = self.call(move |m| m.lookup_character_fact(&name, &attr)).await?;
        cache.insert(key, CachedLookup::CharacterFact(found.clone()));
        Ok(found)
    }

    async fn event_time(
        &self,
        entity: &str,
        description: &str,
        cache: &LookupCache,
    ) -> Result<Option<TimelineFact>, RetrievalError> {
        let key = LookupKey::EventTime {
            entity: entity.to_string(),
            description: description.to_string(),
        };
        if let Some(CachedLookup::EventTime(hit)) = cache.get(&key) {
            return Ok(hit);
        }
        let (name, desc) = (entity.to_string(), description.to_string());
        let found = self.call(move |m| m.lookup_event_time(&name, &desc)).await?;
        cache.insert(key, CachedLookup::EventTime(found.clone()));
        Ok(found)
    }

    /// Run one memory call on the blocking pool under the lookup timeout
    async fn call<T, F>(&self, f: F) -> Result<T, RetrievalError>
    where
        T: Send + 'static,
        F: FnOnce(&M) -> Result<T, M::Error> + Send + 'static,
    {
        let memory = Arc::clone(&self.memory);
        let task = tokio::task::spawn_blocking(move || {
            f(&memory).map_err(|e| RetrievalError::Backend(e.to_string()))
        });

        match timeout(self.config.lookup_timeout(), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(RetrievalError::TaskFailed(e.to_string())),
            Err(_) => {
                warn!("Narrative memory call exceeded {} ms", self.config.lookup_timeout_ms);
                Err(RetrievalError::Timeout(self.config.lookup_timeout_ms))
            }
        }
    }
}

/// Claim text followed by any subject entity the text does not already name
fn build_query(claim: &Claim) -> String {
    let lowered = claim.text.to_lowercase();
    let mut query = claim.text.clone();
    for entity in &claim.entities {
        if !lowered.contains(&entity.to_lowercase()) {
            query.push(' ');
            query.push_str(entity);
        }
    }
    query
}
