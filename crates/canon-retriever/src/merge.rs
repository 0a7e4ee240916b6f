//! Merging of free-text and structured candidates into one ranked set
//!
//! The merge is sequential and deterministic: scores are adjusted, weak items
//! dropped, the rest sorted with [`ranking_order`], overlapping spans
//! collapsed to their best instance, and the list cut to `top_k`.

use crate::config::{RerankStrategy, RetrieverConfig};
use canon_domain::text::{content_words, overlap};
use canon_domain::{ranking_order, CharacterFact, Evidence, EvidenceSource, Passage, TimelineFact};

/// Passage length (content words) at which the length bonus saturates
const LENGTH_SATURATION: f64 = 40.0;

/// Raw answers gathered for one claim
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    /// Passages from every passage query
    pub passages: Vec<Passage>,
    /// Character facts found for the claim's entities
    pub facts: Vec<CharacterFact>,
    /// The claim's own resolved event
    pub event: Option<TimelineFact>,
}

/// Rank and trim `candidates` for a claim whose normalized text is `claim_text`
///
/// The claim's own timeline entry is never cut by `top_k`; if it ranks below
/// the cut it replaces the last kept item.
pub fn merge(claim_text: &str, candidates: Candidates, config: &RetrieverConfig) -> Vec<Evidence> {
    let claim_words = content_words(claim_text);
    let floor = config.structured_fact_floor;

    let mut items: Vec<Evidence> = Vec::new();

    for passage in candidates.passages {
        let relevance = rescore(config.rerank, &passage, &claim_words);
        items.push(Evidence::new(passage.span, relevance, EvidenceSource::Passage, passage.text));
    }
    for fact in candidates.facts {
        let text = fact.render();
        let relevance = structured_relevance(floor, &text, &claim_words);
        items.push(Evidence::new(fact.span, relevance, EvidenceSource::CharacterFact, text));
    }
    if let Some(event) = &candidates.event {
        let relevance = structured_relevance(floor, &event.description, &claim_words);
        items.push(Evidence::new(
            event.span,
            relevance,
            EvidenceSource::Timeline,
            event.description.clone(),
        ));
    }

    items.retain(|e| e.relevance >= config.min_relevance);
    items.sort_by(ranking_order);

    let mut kept: Vec<Evidence> = Vec::with_capacity(items.len());
    for item in items {
        let duplicate = kept.iter().any(|k| k.span.overlaps(&item.span));
        if !duplicate {
            kept.push(item);
        }
    }

    truncate_keeping_timeline(kept, config.top_k)
}

fn truncate_keeping_timeline(mut kept: Vec<Evidence>, top_k: usize) -> Vec<Evidence> {
    if kept.len() <= top_k {
        return kept;
    }
    let pinned = kept
        .iter()
        .position(|e| e.source == EvidenceSource::Timeline)
        .filter(|&i| i >= top_k);

    match pinned {
        Some(i) => {
            let event = kept.swap_remove(i);
            kept.truncate(top_k.saturating_sub(1));
            kept.push(event);
            kept
        }
        None => {
            kept.truncate(top_k);
            kept
        }
    }
}

fn structured_relevance(floor: f64, text: &str, claim_words: &[String]) -> f64 {
    floor.max(overlap(&content_words(text), claim_words))
}

fn rescore(strategy: RerankStrategy, passage: &Passage, claim_words: &[String]) -> f64 {
    match strategy {
        RerankStrategy::None => passage.relevance,
        RerankStrategy::KeywordOverlap => {
            let words = content_words(&passage.text);
            let keyword = overlap(claim_words, &words);
            let length = (words.len() as f64 / LENGTH_SATURATION).min(1.0);
            0.6 * passage.relevance + 0.3 * keyword + 0.1 * length
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canon_domain::Span;

    fn passage(start: usize, end: usize, relevance: f64, text: &str) -> Passage {
        Passage {
            span: Span::new(start, end),
            text: text.to_string(),
            relevance,
        }
    }

    #[test]
    fn test_weak_items_dropped() {
        let candidates = Candidates {
            passages: vec![passage(0, 10, 0.1, "noise"), passage(20, 30, 0.6, "Anna left")],
            ..Default::default()
        };
        let merged = merge("Anna left", candidates, &RetrieverConfig::default());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].span, Span::new(20, 30));
    }

    #[test]
    fn test_nothing_relevant_is_empty() {
        let candidates = Candidates {
            passages: vec![passage(0, 10, 0.05, "noise")],
            ..Default::default()
        };
        assert!(merge("Anna left", candidates, &RetrieverConfig::default()).is_empty());
    }

    #[test]
    fn test_overlapping_spans_keep_best() {
        let candidates = Candidates {
            passages: vec![
                passage(0, 50, 0.5, "weaker copy"),
                passage(10, 60, 0.9, "stronger copy"),
                passage(100, 120, 0.4, "elsewhere"),
            ],
            ..Default::default()
        };
        let merged = merge("copy", candidates, &RetrieverConfig::default());
        let spans: Vec<Span> = merged.iter().map(|e| e.span).collect();
        assert_eq!(spans, vec![Span::new(10, 60), Span::new(100, 120)]);
    }

    #[test]
    fn test_structured_facts_get_floor() {
        let candidates = Candidates {
            passages: vec![passage(0, 40, 0.9, "Anna worked as a seamstress in Lyon")],
            facts: vec![CharacterFact {
                entity: "Anna".to_string(),
                attribute: "occupation".to_string(),
                value: "seamstress".to_string(),
                span: Span::new(60, 90),
            }],
            event: None,
        };
        let merged = merge("Anna was a seamstress", candidates, &RetrieverConfig::default());

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].source, EvidenceSource::CharacterFact);
        assert_eq!(merged[1].relevance, 0.8);
        assert_eq!(merged[1].text, "Anna occupation: seamstress");
    }

    #[test]
    fn test_overlap_across_sources_keeps_best() {
        let candidates = Candidates {
            passages: vec![passage(0, 50, 0.9, "Anna worked as a seamstress in Lyon")],
            facts: vec![CharacterFact {
                entity: "Anna".to_string(),
                attribute: "occupation".to_string(),
                value: "seamstress".to_string(),
                span: Span::new(10, 30),
            }],
            event: None,
        };
        let merged = merge("Anna was a seamstress", candidates, &RetrieverConfig::default());

        let kept: Vec<(Span, EvidenceSource)> = merged.iter().map(|e| (e.span, e.source)).collect();
        assert_eq!(kept, vec![(Span::new(0, 50), EvidenceSource::Passage)]);
    }

    #[test]
    fn test_structured_fact_wins_tie_on_overlap() {
        let candidates = Candidates {
            passages: vec![passage(0, 40, 0.8, "Anna worked as a seamstress in Lyon")],
            facts: vec![CharacterFact {
                entity: "Anna".to_string(),
                attribute: "occupation".to_string(),
                value: "seamstress".to_string(),
                span: Span::new(0, 40),
            }],
            event: None,
        };
        let merged = merge("Anna was a seamstress", candidates, &RetrieverConfig::default());

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, EvidenceSource::CharacterFact);
    }

    #[test]
    fn test_top_k_keeps_own_event() {
        let config = RetrieverConfig {
            top_k: 2,
            structured_fact_floor: 0.3,
            ..Default::default()
        };
        let candidates = Candidates {
            passages: vec![
                passage(0, 10, 0.9, "a"),
                passage(20, 30, 0.8, "b"),
                passage(40, 50, 0.7, "c"),
            ],
            facts: Vec::new(),
            event: Some(TimelineFact {
                timestamp: 4,
                span: Span::new(60, 70),
                description: "unrelated words".to_string(),
            }),
        };
        let merged = merge("Anna left", candidates, &config);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].span, Span::new(0, 10));
        assert_eq!(merged[1].source, EvidenceSource::Timeline);
    }

    #[test]
    fn test_keyword_rerank_prefers_matching_text() {
        let config = RetrieverConfig {
            rerank: RerankStrategy::KeywordOverlap,
            ..Default::default()
        };
        let candidates = Candidates {
            passages: vec![
                passage(0, 10, 0.6, "the weather in spring"),
                passage(20, 30, 0.55, "Anna fled the burning city"),
            ],
            ..Default::default()
        };
        let merged = merge("Anna fled the city", candidates, &config);
        assert_eq!(merged[0].span, Span::new(20, 30));
    }
}
