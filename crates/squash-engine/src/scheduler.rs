//! Per-asset compression tasks
//!
//! A task is prepared (relation check, cache lookup, threshold) and then
//! run (compress, ratio policy, emission). Every store and cache failure
//! inside either step belongs to that asset alone.

use crate::filename;
use crate::policy::{derived_info, detach_source_map_patch, link_patch, Disposition};
use crate::report::AssetOutcome;
use serde_json::Value;
use squash_cache::{CacheKey, CacheStore, CachedOutput, ItemCache};
use squash_compression::AlgorithmAdapter;
use squash_config::PluginOptions;
use squash_types::{
    Asset, AssetInfo, AssetInfoPatch, AssetStore, Bytes, Error, RawSource, Result,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Work item for one eligible asset, owned by its future
#[derive(Debug)]
pub(crate) struct CompressionTask {
    name: String,
    info: AssetInfo,
    original_size: usize,
    input: TaskInput,
    cache: ItemCache,
}

#[derive(Debug)]
enum TaskInput {
    /// Accepted output from an earlier pass
    Cached(RawSource),
    /// Original content, with compressed bytes from a rejected earlier pass
    Buffer {
        buffer: Bytes,
        compressed: Option<Bytes>,
    },
}

#[derive(Debug)]
pub(crate) enum Prepared {
    Skipped(AssetOutcome),
    Ready(CompressionTask),
}

#[derive(Debug, Default, Clone, Copy)]
struct Work {
    compressed: bool,
    cache_hit: bool,
}

/// Settled task, ready to be folded into a report
#[derive(Debug)]
pub(crate) struct Settled {
    pub name: String,
    pub result: Result<AssetOutcome>,
    pub compressed: bool,
    pub cache_hit: bool,
}

/// Runs the per-asset steps of one pass
pub(crate) struct Scheduler<'a> {
    pub(crate) options: &'a PluginOptions,
    pub(crate) adapter: &'a AlgorithmAdapter,
    pub(crate) algorithm_identity: &'a Value,
    pub(crate) relation_name: &'a str,
    pub(crate) store: &'a dyn AssetStore,
    pub(crate) cache: Arc<dyn CacheStore>,
}

impl Scheduler<'_> {
    /// Decide whether an eligible asset needs work and gather its inputs.
    ///
    /// The content is only measured against the threshold when the cache
    /// holds no accepted result for it.
    pub async fn prepare(&self, asset: Asset) -> Result<Prepared> {
        if let Some(related) = asset.info.related(self.relation_name) {
            debug!("Skipping {}: already linked to {}", asset.name, related);
            return Ok(Prepared::Skipped(AssetOutcome::AlreadyProcessed {
                related: related.to_string(),
            }));
        }

        let key = CacheKey::new(&asset.name, self.algorithm_identity, self.adapter.options());
        let cache = ItemCache::new(Arc::clone(&self.cache), key, asset.source.buffer());
        let original_size = asset.source.size();

        let input = match cache.get().await? {
            Some(CachedOutput {
                source: Some(source),
                ..
            }) => TaskInput::Cached(source),
            cached => {
                let buffer = asset.source.buffer();
                if buffer.len() < self.options.threshold {
                    debug!(
                        "Skipping {}: {} bytes is below the threshold of {}",
                        asset.name,
                        buffer.len(),
                        self.options.threshold
                    );
                    return Ok(Prepared::Skipped(AssetOutcome::BelowThreshold {
                        size: buffer.len(),
                    }));
                }
                TaskInput::Buffer {
                    buffer,
                    compressed: cached.map(|output| output.compressed),
                }
            }
        };

        Ok(Prepared::Ready(CompressionTask {
            name: asset.name,
            info: asset.info,
            original_size,
            input,
            cache,
        }))
    }

    /// Run a prepared task to completion
    pub async fn run(&self, task: CompressionTask) -> Settled {
        let name = task.name.clone();
        let mut work = Work::default();
        let result = self.execute(task, &mut work).await;
        if let Err(error) = &result {
            warn!("Failed to compress {}: {}", name, error);
        }
        Settled {
            name,
            result,
            compressed: work.compressed,
            cache_hit: work.cache_hit,
        }
    }

    async fn execute(&self, task: CompressionTask, work: &mut Work) -> Result<AssetOutcome> {
        let output = match task.input {
            TaskInput::Cached(source) => {
                debug!("Reusing cached output for {}", task.name);
                work.cache_hit = true;
                source
            }
            TaskInput::Buffer { buffer, compressed } => {
                let compressed = match compressed {
                    Some(compressed) => {
                        work.cache_hit = true;
                        compressed
                    }
                    None => {
                        work.compressed = true;
                        self.adapter.compress(buffer.clone()).await?
                    }
                };

                if !self.options.min_ratio.accepts(compressed.len(), buffer.len()) {
                    debug!(
                        "Not emitting {}: {} -> {} bytes exceeds ratio {}",
                        task.name,
                        buffer.len(),
                        compressed.len(),
                        self.options.min_ratio.get()
                    );
                    let compressed_size = compressed.len();
                    if work.compressed {
                        task.cache
                            .store(CachedOutput::compressed_only(compressed))
                            .await?;
                    }
                    return Ok(AssetOutcome::Rejected {
                        original_size: buffer.len(),
                        compressed_size,
                    });
                }

                let source = RawSource::from(compressed.clone());
                task.cache
                    .store(CachedOutput {
                        compressed,
                        source: Some(source.clone()),
                    })
                    .await?;
                source
            }
        };

        self.emit(&task.name, &task.info, task.original_size, output)
    }

    /// Patch the original, which a sibling's cascading delete may have removed
    fn patch_original(&self, name: &str, patch: AssetInfoPatch) -> Result<()> {
        match self.store.update(name, None, patch) {
            Err(Error::AssetNotFound { .. }) => {
                debug!("{} was deleted during the pass, emitting without a link", name);
                Ok(())
            }
            result => result,
        }
    }

    fn emit(
        &self,
        name: &str,
        info: &AssetInfo,
        original_size: usize,
        output: RawSource,
    ) -> Result<AssetOutcome> {
        let filename = filename::render(&self.options.filename, name);
        let new_info = derived_info(info, &self.options.filename);
        let disposition = Disposition::for_asset(&self.options.delete_original_assets, name);

        match disposition {
            Disposition::Link => {
                self.patch_original(name, link_patch(self.relation_name, &filename))?;
            }
            Disposition::Delete => self.store.delete(name)?,
            Disposition::DeleteKeepingSourceMap => {
                self.patch_original(name, detach_source_map_patch())?;
                self.store.delete(name)?;
            }
        }

        let compressed_size = output.size();
        self.store.emit(&filename, output, new_info)?;
        debug!(
            "Emitted {} ({} -> {} bytes)",
            filename, original_size, compressed_size
        );

        Ok(AssetOutcome::Emitted {
            filename,
            original_size,
            compressed_size,
            original_deleted: disposition.deletes(),
        })
    }
}
