//! # squash-cache
//!
//! Result cache for compression passes.
//!
//! Entries are addressed by a [`CacheKey`] built from the asset name, the
//! algorithm identity and the effective options, and are validated against
//! a [`LazyContentTag`] of the asset bytes. Two stores are provided:
//!
//! - [`MemoryCacheStore`]: process-lifetime store with hit/miss counters
//! - [`FileCacheStore`]: bincode file persisted between runs
//!
//! ## Example
//!
//! ```rust
//! use squash_cache::{CacheKey, CachedOutput, ItemCache, MemoryCacheStore};
//! use squash_types::{Bytes, CompressionOptions};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(MemoryCacheStore::new());
//! let key = CacheKey::new("app.js", &"gzip".into(), &CompressionOptions::new());
//! let item = ItemCache::new(store.clone(), key, Bytes::from_static(b"let a = 1;"));
//!
//! assert!(item.get().await?.is_none());
//! item.store(CachedOutput::accepted(Bytes::from_static(b"gz"))).await?;
//! assert!(item.get().await?.is_some());
//! # Ok::<(), squash_types::Error>(())
//! # });
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod entry;
mod key;
mod memory;
mod persistent;
mod store;
mod tag;

pub use entry::CachedOutput;
pub use key::CacheKey;
pub use memory::{MemoryCacheStats, MemoryCacheStore};
pub use persistent::{CacheConfig, CacheEntry, CacheStats, FileCacheStore};
pub use store::{CacheStore, ItemCache};
pub use tag::LazyContentTag;
