//! Cache store abstraction and the per-asset cache handle

use crate::{CacheKey, CachedOutput, LazyContentTag};
use async_trait::async_trait;
use squash_types::{Bytes, Result};
use std::fmt;
use std::sync::Arc;

/// Persistent key/value storage for compression results.
///
/// An entry matches only if both the key and the content tag match.
/// Implementations must look up the key first and compute the tag only
/// when an entry exists under it.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the entry stored under `key` for content tagged `tag`
    async fn get(&self, key: &CacheKey, tag: &LazyContentTag) -> Result<Option<CachedOutput>>;

    /// Store `value` under `key` for content tagged `tag`
    async fn store(&self, key: &CacheKey, tag: &LazyContentTag, value: CachedOutput)
        -> Result<()>;
}

/// Cache handle bound to one asset of one pass
pub struct ItemCache {
    store: Arc<dyn CacheStore>,
    key: CacheKey,
    tag: LazyContentTag,
}

impl ItemCache {
    /// Bind `store` to the given key and asset content
    pub fn new(store: Arc<dyn CacheStore>, key: CacheKey, content: Bytes) -> Self {
        Self {
            store,
            key,
            tag: LazyContentTag::new(content),
        }
    }

    /// The bound key
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// The bound content tag
    pub fn tag(&self) -> &LazyContentTag {
        &self.tag
    }

    /// Fetch the cached result for this asset
    pub async fn get(&self) -> Result<Option<CachedOutput>> {
        self.store.get(&self.key, &self.tag).await
    }

    /// Store a result for this asset
    pub async fn store(&self, value: CachedOutput) -> Result<()> {
        self.store.store(&self.key, &self.tag, value).await
    }
}

impl fmt::Debug for ItemCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemCache")
            .field("key", &self.key)
            .field("tag", &self.tag)
            .finish()
    }
}
