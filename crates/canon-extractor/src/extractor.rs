//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::entity::EntityRecognizer;
use crate::error::ExtractorError;
use crate::segment::{sentences, split_compound, Connective, Segment};
use canon_domain::text::{content_words, normalize, tokens};
use canon_domain::{Claim, ClaimId, ClaimKind};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Decomposes a backstory into ordered atomic claims
#[derive(Debug, Clone)]
pub struct ClaimExtractor {
    config: ExtractorConfig,
    recognizer: EntityRecognizer,
}

impl ClaimExtractor {
    /// Create a new extractor with no lexicon
    pub fn new(config: ExtractorConfig) -> Self {
        let recognizer = EntityRecognizer::new(config.capitalized_fallback);
        Self { config, recognizer }
    }

    /// Use `names` as the entity lexicon
    pub fn with_lexicon<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recognizer = self.recognizer.with_lexicon(names);
        self
    }

    /// Extractor configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract claims from `text`
    ///
    /// Claims come back in order of first appearance. For a compound sentence
    /// the antecedent clause is emitted first and the dependent clause carries
    /// a reference to it, so every reference points to an earlier ordinal.
    pub fn extract(&self, document_id: &str, text: &str) -> Result<Vec<Claim>, ExtractorError> {
        self.config.validate().map_err(ExtractorError::Config)?;

        let length = text.chars().count();
        if length > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(length, self.config.max_text_length));
        }
        if text.trim().is_empty() {
            return Err(ExtractorError::EmptyInput);
        }

        let segments = sentences(text);
        info!(
            "Starting extraction for document '{}': {} bytes, {} sentences, lexicon of {}",
            document_id,
            text.len(),
            segments.len(),
            self.recognizer.lexicon_len()
        );

        let mut claims: Vec<Claim> = Vec::new();
        let mut saw_entity = false;

        for sentence in &segments {
            let entities = self.recognizer.recognize(sentence.text);
            saw_entity |= !entities.is_empty();

            if sentence.is_question() {
                debug!("Skipping question at {}", sentence.span);
                continue;
            }
            if sentence.word_count() < self.config.min_sentence_words {
                debug!("Skipping short sentence at {}", sentence.span);
                continue;
            }
            if entities.is_empty() {
                debug!("Skipping sentence without entities at {}", sentence.span);
                continue;
            }

            let compound = if self.config.split_compound {
                split_compound(sentence)
            } else {
                None
            };

            match compound {
                Some(compound) => {
                    let antecedent_entities = self.entities_or(compound.antecedent.text, &entities);
                    let dependent_entities = self.entities_or(compound.dependent.text, &entities);

                    let antecedent = self.make_claim(
                        document_id,
                        claims.len(),
                        &compound.antecedent,
                        antecedent_entities,
                        ClaimKind::Factual,
                    );
                    let kind = match compound.connective {
                        Connective::Causal => ClaimKind::Causal,
                        Connective::Temporal(order) => ClaimKind::Temporal(order),
                    };
                    let dependent = self
                        .make_claim(document_id, claims.len() + 1, &compound.dependent, dependent_entities, kind)
                        .with_reference(antecedent.id);

                    debug!(
                        "Split sentence at {} into {} claim referencing '{}'",
                        sentence.span,
                        kind.label(),
                        antecedent.text
                    );
                    claims.push(antecedent);
                    claims.push(dependent);
                }
                None => {
                    let claim = self.make_claim(document_id, claims.len(), sentence, entities, ClaimKind::Factual);
                    claims.push(claim);
                }
            }

            if claims.len() >= self.config.max_claims {
                warn!(
                    "Document '{}' reached max_claims ({}); remaining sentences ignored",
                    document_id, self.config.max_claims
                );
                claims.truncate(self.config.max_claims);
                break;
            }
        }

        if !saw_entity {
            return Err(ExtractorError::NoEntities);
        }
        if claims.is_empty() {
            return Err(ExtractorError::NoClaims(segments.len()));
        }

        info!(
            "Extraction complete for document '{}': {} claims ({} dependent)",
            document_id,
            claims.len(),
            claims.iter().filter(|c| c.kind.is_dependent()).count()
        );
        Ok(claims)
    }

    fn entities_or(&self, text: &str, fallback: &BTreeSet<String>) -> BTreeSet<String> {
        let own = self.recognizer.recognize(text);
        if own.is_empty() {
            fallback.clone()
        } else {
            own
        }
    }

    fn make_claim(
        &self,
        document_id: &str,
        ordinal: usize,
        segment: &Segment<'_>,
        entities: BTreeSet<String>,
        kind: ClaimKind,
    ) -> Claim {
        let text = normalize(segment.text);
        let attributes = attribute_keys(&text, &entities);
        Claim::new(
            ClaimId::derive(document_id, ordinal),
            ordinal,
            segment.span,
            text,
            entities,
            kind,
        )
        .with_attributes(attributes)
    }
}

impl Default for ClaimExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

/// Content words of `text` that are not part of an entity name
pub fn attribute_keys(text: &str, entities: &BTreeSet<String>) -> Vec<String> {
    let name_words: BTreeSet<String> = entities.iter().flat_map(|e| tokens(e)).collect();
    content_words(text)
        .into_iter()
        .filter(|w| !name_words.contains(w))
        .collect()
}
