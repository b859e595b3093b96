//! Bounded LRU cache for raw provider responses.
//!
//! Keys are the canonicalized `(model, prompt, options)` tuple; the options
//! component is the sorted-key JSON form, so the caller's insertion order
//! never affects cache identity. Only raw provider output is stored —
//! handler post-processing happens after lookup.
//!
//! There is no invalidation: a cached entry outlives model-config edits as
//! long as its key tuple is unchanged. That staleness is a known, accepted
//! limitation.

use std::num::NonZeroUsize;

use lru::LruCache;
use promptdeck_core::{ProviderParams, canonical_params};

/// Identity of one memoized generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    model: String,
    prompt: String,
    options: String,
}

impl CacheKey {
    pub fn new(model: &str, prompt: &str, options: &ProviderParams) -> Self {
        Self {
            model: model.to_string(),
            prompt: prompt.to_string(),
            options: canonical_params(options),
        }
    }
}

/// LRU-bounded store of raw response text.
pub struct ResponseCache {
    entries: LruCache<CacheKey, String>,
}

impl ResponseCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Look up a response, marking the entry as recently used.
    pub fn get(&mut self, key: &CacheKey) -> Option<String> {
        self.entries.get(key).cloned()
    }

    /// Store a response, evicting the least-recently-used entry when full.
    pub fn put(&mut self, key: CacheKey, response: String) {
        self.entries.put(key, response);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn key_ignores_option_insertion_order() {
        let mut a = ProviderParams::new();
        a.insert("b".into(), serde_json::json!(2));
        a.insert("a".into(), serde_json::json!(1));

        let mut b = ProviderParams::new();
        b.insert("a".into(), serde_json::json!(1));
        b.insert("b".into(), serde_json::json!(2));

        assert_eq!(CacheKey::new("m", "p", &a), CacheKey::new("m", "p", &b));
    }

    #[test]
    fn key_distinguishes_model_prompt_and_options() {
        let empty = ProviderParams::new();
        let mut opts = ProviderParams::new();
        opts.insert("t".into(), serde_json::json!(1));

        let base = CacheKey::new("m", "p", &empty);
        assert_ne!(base, CacheKey::new("m2", "p", &empty));
        assert_ne!(base, CacheKey::new("m", "p2", &empty));
        assert_ne!(base, CacheKey::new("m", "p", &opts));
    }

    #[test]
    fn put_then_get() {
        let mut cache = ResponseCache::new(capacity(10));
        let key = CacheKey::new("m", "p", &ProviderParams::new());
        assert!(cache.get(&key).is_none());
        cache.put(key.clone(), "response".into());
        assert_eq!(cache.get(&key).as_deref(), Some("response"));
    }

    #[test]
    fn least_recently_used_entry_is_evicted() {
        let mut cache = ResponseCache::new(capacity(2));
        let empty = ProviderParams::new();
        let k1 = CacheKey::new("m", "one", &empty);
        let k2 = CacheKey::new("m", "two", &empty);
        let k3 = CacheKey::new("m", "three", &empty);

        cache.put(k1.clone(), "1".into());
        cache.put(k2.clone(), "2".into());
        // touch k1 so k2 becomes the LRU entry
        assert!(cache.get(&k1).is_some());
        cache.put(k3.clone(), "3".into());

        assert!(cache.get(&k1).is_some());
        assert!(cache.get(&k2).is_none());
        assert!(cache.get(&k3).is_some());
        assert_eq!(cache.len(), 2);
    }
}
