//! File-backed cache store
//!
//! Entries are kept in memory during a pass and written to a single
//! bincode file by [`FileCacheStore::save`]. Expired entries are dropped on
//! load and whenever the store grows past its entry limit.

use crate::{CacheKey, CacheStore, CachedOutput, LazyContentTag};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use squash_types::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tracing::{debug, info};

/// Persisted cache entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Content tag of the asset the value was computed from
    pub tag: String,
    /// Cached result
    pub value: CachedOutput,
    /// When this entry was cached
    pub cached_at: SystemTime,
    /// Number of times this entry has been returned
    pub access_count: u64,
}

impl CacheEntry {
    /// Create a new entry stamped with the current time
    pub fn new(tag: String, value: CachedOutput) -> Self {
        Self {
            tag,
            value,
            cached_at: SystemTime::now(),
            access_count: 0,
        }
    }

    /// Age of the entry
    pub fn age(&self) -> Duration {
        SystemTime::now()
            .duration_since(self.cached_at)
            .unwrap_or_default()
    }
}

/// Configuration for [`FileCacheStore`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache file path
    pub cache_file: PathBuf,
    /// Maximum number of entries to keep
    pub max_entries: usize,
    /// Maximum age for entries
    pub max_age: Duration,
}

impl CacheConfig {
    /// Default configuration writing to `cache_file`
    pub fn at(cache_file: impl Into<PathBuf>) -> Self {
        Self {
            cache_file: cache_file.into(),
            ..Self::default()
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_file: PathBuf::from(".squash-cache"),
            max_entries: 10_000,
            max_age: Duration::from_secs(30 * 24 * 60 * 60), // 30 days
        }
    }
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, CacheEntry>,
    dirty: bool,
}

/// Cache store persisted to a file between runs
#[derive(Debug)]
pub struct FileCacheStore {
    config: CacheConfig,
    state: Mutex<State>,
}

/// Statistics for a [`FileCacheStore`]
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Total number of entries
    pub total_entries: usize,
    /// Total compressed bytes held
    pub total_size: u64,
    /// Average access count per entry
    pub avg_access_count: f64,
}

impl FileCacheStore {
    /// Open a store, loading the cache file if it exists
    pub async fn open(config: CacheConfig) -> Result<Self> {
        let entries = load_entries(&config.cache_file, config.max_age).await?;
        Ok(Self {
            config,
            state: Mutex::new(State {
                entries,
                dirty: false,
            }),
        })
    }

    /// The cache file this store persists to
    pub fn path(&self) -> &Path {
        &self.config.cache_file
    }

    /// Number of entries held
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Check if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all entries
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.dirty = true;
        info!("Cleared compression cache");
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let total_entries = state.entries.len();
        let total_size = state
            .entries
            .values()
            .map(|entry| entry.value.compressed.len() as u64)
            .sum();
        let avg_access_count = if total_entries > 0 {
            state
                .entries
                .values()
                .map(|entry| entry.access_count)
                .sum::<u64>() as f64
                / total_entries as f64
        } else {
            0.0
        };

        CacheStats {
            total_entries,
            total_size,
            avg_access_count,
        }
    }

    /// Write the entries to disk if anything changed since the last save
    pub async fn save(&self) -> Result<()> {
        let (data, count) = {
            let mut state = self.state.lock();
            if !state.dirty {
                return Ok(());
            }
            let data = bincode::serde::encode_to_vec(&state.entries, bincode::config::standard())
                .map_err(|e| Error::cache(format!("Failed to serialize cache: {}", e)))?;
            state.dirty = false;
            (data, state.entries.len())
        };

        if let Some(parent) = self.config.cache_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| Error::Io {
                    message: format!(
                        "Failed to create cache directory '{}': {}",
                        parent.display(),
                        e
                    ),
                })?;
            }
        }

        if let Err(e) = fs::write(&self.config.cache_file, data).await {
            self.state.lock().dirty = true;
            return Err(Error::Io {
                message: format!(
                    "Failed to write cache file '{}': {}",
                    self.config.cache_file.display(),
                    e
                ),
            });
        }

        debug!("Saved cache to disk with {} entries", count);
        Ok(())
    }

    /// Remove expired entries, then the least used ones beyond the limit
    fn cleanup_old_entries(&self, state: &mut State) {
        let initial_count = state.entries.len();
        let max_age = self.config.max_age;

        state.entries.retain(|_, entry| entry.age() <= max_age);

        if state.entries.len() > self.config.max_entries {
            let mut entries: Vec<_> = state.entries.drain().collect();

            // Most used first, newest first among equals
            entries.sort_by(|a, b| {
                b.1.access_count
                    .cmp(&a.1.access_count)
                    .then_with(|| b.1.cached_at.cmp(&a.1.cached_at))
            });

            entries.truncate(self.config.max_entries);
            state.entries = entries.into_iter().collect();
        }

        let removed_count = initial_count - state.entries.len();
        if removed_count > 0 {
            info!("Cleaned up {} old cache entries", removed_count);
            state.dirty = true;
        }
    }
}

async fn load_entries(path: &Path, max_age: Duration) -> Result<HashMap<String, CacheEntry>> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!("Cache file does not exist, starting with empty cache");
        return Ok(HashMap::new());
    }

    let data = fs::read(path).await.map_err(|e| Error::Io {
        message: format!("Failed to read cache file '{}': {}", path.display(), e),
    })?;

    let (entries, _): (HashMap<String, CacheEntry>, usize) =
        bincode::serde::decode_from_slice(&data, bincode::config::standard())
            .map_err(|e| Error::cache(format!("Failed to deserialize cache: {}", e)))?;

    let valid_entries: HashMap<String, CacheEntry> = entries
        .into_iter()
        .filter(|(_, entry)| entry.age() <= max_age)
        .collect();

    info!("Loaded {} cache entries from disk", valid_entries.len());
    Ok(valid_entries)
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn get(&self, key: &CacheKey, tag: &LazyContentTag) -> Result<Option<CachedOutput>> {
        let mut state = self.state.lock();
        let Some(entry) = state.entries.get_mut(key.as_str()) else {
            debug!("Cache miss for {}", key);
            return Ok(None);
        };

        if entry.tag == tag.get() {
            entry.access_count += 1;
            debug!("Cache hit for {}", key);
            return Ok(Some(entry.value.clone()));
        }

        state.entries.remove(key.as_str());
        state.dirty = true;
        debug!("Cache entry outdated for {}", key);
        Ok(None)
    }

    async fn store(
        &self,
        key: &CacheKey,
        tag: &LazyContentTag,
        value: CachedOutput,
    ) -> Result<()> {
        let entry = CacheEntry::new(tag.get().to_string(), value);
        let mut state = self.state.lock();
        state.entries.insert(key.as_str().to_string(), entry);
        state.dirty = true;

        if state.entries.len() > self.config.max_entries {
            self.cleanup_old_entries(&mut state);
        }
        Ok(())
    }
}
