//! In-process cache store

use crate::{CacheKey, CacheStore, CachedOutput, LazyContentTag};
use async_trait::async_trait;
use parking_lot::RwLock;
use squash_types::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Debug, Clone)]
struct MemoryEntry {
    tag: String,
    value: CachedOutput,
}

/// Counters for a [`MemoryCacheStore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryCacheStats {
    /// Entries currently held
    pub entries: usize,
    /// Lookups that returned an entry
    pub hits: u64,
    /// Lookups that returned nothing
    pub misses: u64,
    /// Store calls
    pub stores: u64,
}

/// Cache store living for the lifetime of the process.
///
/// Suited to watch-mode hosts that run many passes in one process.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<CacheKey, MemoryEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
}

impl MemoryCacheStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> MemoryCacheStats {
        MemoryCacheStats {
            entries: self.entries.read().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
        }
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    fn miss(&self) -> Option<CachedOutput> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &CacheKey, tag: &LazyContentTag) -> Result<Option<CachedOutput>> {
        let entries = self.entries.read();
        let Some(entry) = entries.get(key) else {
            return Ok(self.miss());
        };
        if entry.tag != tag.get() {
            debug!("Cache entry is stale for {}", key);
            return Ok(self.miss());
        }
        self.hits.fetch_add(1, Ordering::Relaxed);
        Ok(Some(entry.value.clone()))
    }

    async fn store(
        &self,
        key: &CacheKey,
        tag: &LazyContentTag,
        value: CachedOutput,
    ) -> Result<()> {
        let entry = MemoryEntry {
            tag: tag.get().to_string(),
            value,
        };
        self.entries.write().insert(key.clone(), entry);
        self.stores.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use squash_types::{Bytes, CompressionOptions};

    fn key(name: &str) -> CacheKey {
        CacheKey::new(name, &json!("gzip"), &CompressionOptions::new())
    }

    #[tokio::test]
    async fn test_cold_lookup_does_not_hash() {
        let store = MemoryCacheStore::new();
        let tag = LazyContentTag::new(Bytes::from_static(b"content"));

        assert!(store.get(&key("a.js"), &tag).await.unwrap().is_none());
        assert!(!tag.is_computed());
        assert_eq!(store.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_store_and_hit() {
        let store = MemoryCacheStore::new();
        let tag = LazyContentTag::new(Bytes::from_static(b"content"));
        let value = CachedOutput::accepted(Bytes::from_static(b"zz"));

        store.store(&key("a.js"), &tag, value.clone()).await.unwrap();

        let again = LazyContentTag::new(Bytes::from_static(b"content"));
        assert_eq!(store.get(&key("a.js"), &again).await.unwrap(), Some(value));
        assert_eq!(
            store.stats(),
            MemoryCacheStats {
                entries: 1,
                hits: 1,
                misses: 0,
                stores: 1
            }
        );
    }

    #[rstest]
    #[case::fresh(b"v1", true)]
    #[case::stale(b"v2", false)]
    #[case::empty(b"", false)]
    #[tokio::test]
    async fn test_content_tag_decides_hit(#[case] content: &'static [u8], #[case] hit: bool) {
        let store = MemoryCacheStore::new();
        let stored = LazyContentTag::new(Bytes::from_static(b"v1"));
        store
            .store(&key("a.js"), &stored, CachedOutput::compressed_only(Bytes::new()))
            .await
            .unwrap();

        let current = LazyContentTag::new(Bytes::from_static(content));
        let found = store.get(&key("a.js"), &current).await.unwrap();
        assert_eq!(found.is_some(), hit);
        assert!(current.is_computed());
        assert_eq!(store.stats().hits, u64::from(hit));
    }

    #[tokio::test]
    async fn test_store_overwrites() {
        let store = MemoryCacheStore::new();
        let tag = LazyContentTag::new(Bytes::from_static(b"v1"));
        store
            .store(&key("a.js"), &tag, CachedOutput::compressed_only(Bytes::from_static(b"x")))
            .await
            .unwrap();
        store
            .store(&key("a.js"), &tag, CachedOutput::accepted(Bytes::from_static(b"x")))
            .await
            .unwrap();

        let cached = store.get(&key("a.js"), &tag).await.unwrap().unwrap();
        assert!(cached.is_accepted());
        assert_eq!(store.stats().entries, 1);
    }
}
