//! # squash-engine
//!
//! Runs a compression pass over a host asset store.
//!
//! ```text
//! list -> rule matcher -> relation check -> cache lookup -> threshold
//!      -> compress -> ratio policy -> cache store -> disposition -> emit
//! ```
//!
//! Every eligible asset gets its own future; all of them are joined before
//! the pass returns. A failing asset records one error in the
//! [`PassReport`] and yields no derived asset.
//!
//! # Examples
//!
//! ```rust
//! use squash_cache::MemoryCacheStore;
//! use squash_config::PluginOptions;
//! use squash_engine::{CompressionPlugin, MemoryAssetStore};
//! use squash_types::{Asset, AssetStore};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let plugin = CompressionPlugin::new(PluginOptions::default())?;
//! let store: MemoryAssetStore = [Asset::new("app.js", vec![0u8; 1024])].into_iter().collect();
//!
//! let report = plugin.run(&store, Arc::new(MemoryCacheStore::new())).await;
//! assert!(store.contains("app.js.gz"));
//! assert_eq!(store.get("app.js").unwrap().info.related("gzipped"), Some("app.js.gz"));
//! assert_eq!(report.stats.assets_emitted, 1);
//! # Ok::<(), squash_types::Error>(())
//! # });
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod display;
pub mod engine;
pub mod filename;
pub mod matcher;
pub mod policy;
pub mod relation;
pub mod report;
mod scheduler;
pub mod store;

#[cfg(test)]
mod engine_tests;

pub use display::CompressedFlag;
pub use engine::CompressionPlugin;
pub use matcher::RuleMatcher;
pub use policy::Disposition;
pub use relation::relation_name;
pub use report::{AssetError, AssetOutcome, PassReport};
pub use store::MemoryAssetStore;
