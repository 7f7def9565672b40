// src/cache.rs
//! Explicit per-run fetch cache with a fixed TTL.
//!
//! Replaces the original deployment's ambient per-session memoization: the
//! TTL is a configuration value handed to the orchestrator, not hidden
//! process state. A zero TTL disables caching entirely.

use metrics::gauge;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::model::{ContentItem, SourceKind};

type Key = (SourceKind, String);

pub struct FetchCache {
    ttl: Duration,
    inner: Mutex<HashMap<Key, (Instant, Vec<ContentItem>)>>,
}

impl FetchCache {
    pub fn new(ttl: Duration) -> Self {
        gauge!("fetch_cache_ttl_secs").set(ttl.as_secs_f64());
        Self {
            ttl,
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, kind: SourceKind, external_ref: &str) -> Option<Vec<ContentItem>> {
        if self.ttl.is_zero() {
            return None;
        }
        let inner = self.inner.lock().expect("cache mutex poisoned");
        let (stored_at, items) = inner.get(&(kind, external_ref.to_string()))?;
        if stored_at.elapsed() > self.ttl {
            return None;
        }
        Some(items.clone())
    }

    pub fn put(&self, kind: SourceKind, external_ref: &str, items: Vec<ContentItem>) {
        if self.ttl.is_zero() {
            return;
        }
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        inner.insert((kind, external_ref.to_string()), (Instant::now(), items));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemMeta;

    fn item(id: &str) -> ContentItem {
        ContentItem {
            id: id.into(),
            title: String::new(),
            published_at: String::new(),
            detail_url: String::new(),
            thumbnail_url: String::new(),
            source: SourceKind::Catalog,
            entity: String::new(),
            meta: ItemMeta::default(),
        }
    }

    #[test]
    fn hit_within_ttl_miss_after_disable() {
        let cache = FetchCache::new(Duration::from_secs(300));
        assert!(cache.get(SourceKind::Catalog, "42").is_none());

        cache.put(SourceKind::Catalog, "42", vec![item("a")]);
        let hit = cache.get(SourceKind::Catalog, "42").unwrap();
        assert_eq!(hit.len(), 1);

        // Distinct source kinds never share entries.
        assert!(cache.get(SourceKind::Blog, "42").is_none());
    }

    #[test]
    fn zero_ttl_disables_the_cache() {
        let cache = FetchCache::new(Duration::ZERO);
        cache.put(SourceKind::Catalog, "42", vec![item("a")]);
        assert!(cache.get(SourceKind::Catalog, "42").is_none());
    }
}
