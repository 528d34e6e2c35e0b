//! Compression pass orchestration

use crate::matcher::RuleMatcher;
use crate::relation::relation_name;
use crate::report::PassReport;
use crate::scheduler::{Prepared, Scheduler};
use futures::future::join_all;
use serde_json::Value;
use squash_cache::CacheStore;
use squash_compression::AlgorithmAdapter;
use squash_config::{PluginOptions, Settings};
use squash_types::{AssetStore, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Configured compression pass.
///
/// Construction resolves the algorithm and fails on an unknown name. Once
/// constructed, [`run`](Self::run) never fails as a whole: per-asset errors
/// end up in the returned [`PassReport`].
#[derive(Debug)]
pub struct CompressionPlugin {
    options: PluginOptions,
    matcher: RuleMatcher,
    adapter: AlgorithmAdapter,
    algorithm_identity: Value,
    relation_name: String,
}

impl CompressionPlugin {
    /// Resolve the options into a runnable plugin
    pub fn new(options: PluginOptions) -> Result<Self> {
        let adapter =
            AlgorithmAdapter::new(options.algorithm.clone(), options.compression_options.clone())?;
        let algorithm_identity = options.algorithm.identity();
        let relation_name = relation_name(&options.algorithm, &options.filename);

        debug!(
            "Compression plugin ready: algorithm {}, relation \"{}\"",
            algorithm_identity, relation_name
        );

        Ok(Self {
            matcher: RuleMatcher::new(&options),
            options,
            adapter,
            algorithm_identity,
            relation_name,
        })
    }

    /// Build a plugin from file settings
    pub fn from_settings(settings: Settings) -> Result<Self> {
        Self::new(settings.into_options()?)
    }

    /// The options in effect
    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    /// Relation kind linking originals to derived assets
    pub fn relation_name(&self) -> &str {
        &self.relation_name
    }

    /// The resolved algorithm
    pub fn adapter(&self) -> &AlgorithmAdapter {
        &self.adapter
    }

    /// The rule matcher
    pub fn matcher(&self) -> &RuleMatcher {
        &self.matcher
    }

    /// Run one pass over `store`.
    ///
    /// Every eligible asset is prepared concurrently, then every prepared
    /// task runs concurrently. The pass returns once all of them settled.
    pub async fn run(&self, store: &dyn AssetStore, cache: Arc<dyn CacheStore>) -> PassReport {
        let started = Instant::now();
        let scheduler = Scheduler {
            options: &self.options,
            adapter: &self.adapter,
            algorithm_identity: &self.algorithm_identity,
            relation_name: &self.relation_name,
            store,
            cache,
        };

        let candidates: Vec<_> = store
            .list()
            .into_iter()
            .filter_map(|name| store.get(&name))
            .filter(|asset| self.matcher.eligible(&asset.name, &asset.info))
            .collect();
        debug!("{} eligible assets", candidates.len());

        let prepared = join_all(candidates.into_iter().map(|asset| {
            let scheduler = &scheduler;
            async move {
                let name = asset.name.clone();
                (name, scheduler.prepare(asset).await)
            }
        }))
        .await;

        let mut report = PassReport::default();
        let mut tasks = Vec::new();
        for (name, prepared) in prepared {
            match prepared {
                Ok(Prepared::Ready(task)) => tasks.push(task),
                Ok(Prepared::Skipped(outcome)) => report.record(name, Ok(outcome), false, false),
                Err(error) => report.record(name, Err(error), false, false),
            }
        }

        let settled = join_all(tasks.into_iter().map(|task| scheduler.run(task))).await;
        for task in settled {
            report.record(task.name, task.result, task.compressed, task.cache_hit);
        }

        report.stats.duration = started.elapsed();
        info!(
            "Compression pass finished: {} emitted, {} rejected, {} skipped, {} failed in {:?}",
            report.stats.assets_emitted,
            report.stats.assets_rejected,
            report.stats.assets_skipped,
            report.stats.assets_failed,
            report.stats.duration
        );
        report
    }
}
