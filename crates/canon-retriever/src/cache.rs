//! Keyed cache over narrative memory answers
//!
//! One cache is created per document run and handed to every retrieval, so
//! repeated lookups (the same entity check or event query across claims) hit
//! the store once. Only successful answers are stored; timeouts and backend
//! errors are retried by the next caller.

use canon_domain::{CharacterFact, Passage, TimelineFact};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Identity of one narrative memory query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupKey {
    /// `retrieve_passages(query, entities, top_k)`
    Passages {
        /// Query text
        query: String,
        /// Subject entities
        entities: Vec<String>,
        /// Requested count
        top_k: usize,
    },
    /// `lookup_event_time(entity, description)`
    EventTime {
        /// Entity name
        entity: String,
        /// Event description
        description: String,
    },
    /// `lookup_character_fact(entity, attribute)`
    CharacterFact {
        /// Entity name
        entity: String,
        /// Attribute key
        attribute: String,
    },
    /// `knows_entity(entity)`
    KnowsEntity(String),
}

/// A cached answer
#[derive(Debug, Clone, PartialEq)]
pub enum CachedLookup {
    /// Passage search result
    Passages(Vec<Passage>),
    /// Event lookup result
    EventTime(Option<TimelineFact>),
    /// Character fact lookup result
    CharacterFact(Option<CharacterFact>),
    /// Entity check result
    KnowsEntity(bool),
}

/// Explicit lookup cache shared by the retrievals of one run
#[derive(Debug, Default)]
pub struct LookupCache {
    entries: Mutex<HashMap<LookupKey, CachedLookup>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl LookupCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached answer for `key`, counting a hit or a miss
    pub fn get(&self, key: &LookupKey) -> Option<CachedLookup> {
        let found = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned();
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store an answer
    pub fn insert(&self, key: LookupKey, value: CachedLookup) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, value);
    }

    /// Number of cached answers
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lookups answered from the cache
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that went to the store
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_and_miss_counting() {
        let cache = LookupCache::new();
        let key = LookupKey::KnowsEntity("Anna".to_string());

        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), CachedLookup::KnowsEntity(true));
        assert_eq!(cache.get(&key), Some(CachedLookup::KnowsEntity(true)));

        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_are_distinct_by_kind() {
        let cache = LookupCache::new();
        cache.insert(
            LookupKey::CharacterFact {
                entity: "Anna".to_string(),
                attribute: "occupation".to_string(),
            },
            CachedLookup::CharacterFact(None),
        );
        let other = LookupKey::EventTime {
            entity: "Anna".to_string(),
            description: "occupation".to_string(),
        };
        assert!(cache.get(&other).is_none());
        assert!(!cache.is_empty());
    }
}
