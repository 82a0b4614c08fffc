use std::sync::Arc;

use dashmap::DashMap;
use lexicon_types::{EndpointKind, Normalized};

/// Recent lookups keyed by endpoint and word.
///
/// Bounded by entry count; when full an arbitrary entry is evicted to make
/// room. Concurrent inserts may overshoot briefly, but each insert trims
/// back to `capacity` before returning. A capacity of zero stores nothing.
pub struct LookupCache {
    entries: DashMap<(EndpointKind, String), Arc<Normalized>>,
    capacity: usize,
}

impl LookupCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
            capacity,
        }
    }

    pub fn get(&self, kind: EndpointKind, word: &str) -> Option<Arc<Normalized>> {
        self.entries
            .get(&(kind, word.to_string()))
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn insert(&self, kind: EndpointKind, word: &str, value: Arc<Normalized>) {
        if self.capacity == 0 {
            return;
        }
        let key = (kind, word.to_string());
        self.entries.insert(key.clone(), value);
        while self.entries.len() > self.capacity {
            let victim = self
                .entries
                .iter()
                .map(|entry| entry.key().clone())
                .find(|candidate| *candidate != key);
            match victim {
                Some(victim) => {
                    self.entries.remove(&victim);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
