//! Pass-level tests for the compression plugin

use crate::{AssetOutcome, CompressionPlugin, MemoryAssetStore};
use flate2::read::GzDecoder;
use rstest::rstest;
use serde_json::json;
use squash_cache::{CacheKey, CacheStore, LazyContentTag, MemoryCacheStore};
use squash_compression::{BoxError, CustomAlgorithm};
use squash_config::{DeleteOriginalAssets, FilenameTemplate, PluginOptions, Rule};
use squash_types::{Asset, AssetInfo, AssetStore, Bytes, ErrorKind};
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Custom algorithm returning `ratio` of the input length, counting calls
fn sized(calls: &Arc<AtomicUsize>, ratio: f64) -> CustomAlgorithm {
    let calls = Arc::clone(calls);
    CustomAlgorithm::new(format!("sized-{}", ratio), move |input: Bytes, _| {
        calls.fetch_add(1, Ordering::SeqCst);
        let len = (input.len() as f64 * ratio) as usize;
        async move { Ok::<_, BoxError>(vec![b'z'; len]) }
    })
}

fn zeros(name: &str) -> Asset {
    Asset::new(name, vec![0u8; 1024])
}

fn memory_cache() -> (Arc<MemoryCacheStore>, Arc<dyn CacheStore>) {
    let cache = Arc::new(MemoryCacheStore::new());
    let handle: Arc<dyn CacheStore> = cache.clone();
    (cache, handle)
}

#[tokio::test]
async fn test_gzip_emits_and_links() {
    let plugin = CompressionPlugin::new(PluginOptions::default()).unwrap();
    let store: MemoryAssetStore = [zeros("app.js")].into_iter().collect();
    let (_, cache) = memory_cache();

    let report = plugin.run(&store, cache).await;

    let derived = store.get("app.js.gz").unwrap();
    assert!(derived.info.compressed);
    let mut decoded = Vec::new();
    GzDecoder::new(derived.source.as_bytes())
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(decoded, vec![0u8; 1024]);

    let original = store.get("app.js").unwrap();
    assert_eq!(original.info.related("gzipped"), Some("app.js.gz"));
    assert!(!report.has_errors());
    assert_eq!(report.stats.compressions, 1);
}

#[tokio::test]
async fn test_unknown_algorithm_fails_construction() {
    let options = PluginOptions::builder().algorithm("nope").build().unwrap();
    let error = CompressionPlugin::new(options).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Config);
    assert!(error.to_string().contains("nope"));
}

#[tokio::test]
async fn test_cache_hit_avoids_recompression() {
    let calls = Arc::new(AtomicUsize::new(0));
    let options = PluginOptions::builder()
        .algorithm(sized(&calls, 0.5))
        .build()
        .unwrap();
    let plugin = CompressionPlugin::new(options).unwrap();
    let (stats, cache) = memory_cache();

    for _ in 0..2 {
        let store: MemoryAssetStore = [zeros("app.js")].into_iter().collect();
        let report = plugin.run(&store, Arc::clone(&cache)).await;
        assert!(store.contains("app.js.gz"));
        assert!(report.outcome("app.js").unwrap().is_emitted());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(stats.stats().hits, 1);
}

#[tokio::test]
async fn test_rejected_result_is_cached_without_emission() {
    let calls = Arc::new(AtomicUsize::new(0));
    let options = PluginOptions::builder()
        .algorithm(sized(&calls, 0.95))
        .filename("[path][base].gz")
        .build()
        .unwrap();
    let plugin = CompressionPlugin::new(options).unwrap();
    let (stats, cache) = memory_cache();

    for _ in 0..2 {
        let store: MemoryAssetStore = [zeros("app.js")].into_iter().collect();
        let report = plugin.run(&store, Arc::clone(&cache)).await;

        assert!(!store.contains("app.js.gz"));
        assert_eq!(store.get("app.js").unwrap().info, AssetInfo::default());
        assert!(matches!(
            report.outcome("app.js"),
            Some(AssetOutcome::Rejected { .. })
        ));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(stats.stats().stores, 1);
    assert_eq!(stats.stats().hits, 1);
}

#[tokio::test]
async fn test_rejected_gzip_output_is_cached_under_asset_key() {
    // xorshift noise does not deflate below the default ratio
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let noise: Vec<u8> = (0..4096)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 32) as u8
        })
        .collect();
    let plugin = CompressionPlugin::new(PluginOptions::default()).unwrap();
    let (stats, cache) = memory_cache();
    let store: MemoryAssetStore = [Asset::new("app.js", noise.clone())].into_iter().collect();

    let report = plugin.run(&store, Arc::clone(&cache)).await;

    assert!(matches!(
        report.outcome("app.js"),
        Some(AssetOutcome::Rejected { .. })
    ));
    assert!(!store.contains("app.js.gz"));
    assert_eq!(stats.stats().stores, 1);

    let key = CacheKey::new("app.js", &json!("gzip"), plugin.adapter().options());
    let cached = cache
        .get(&key, &LazyContentTag::new(Bytes::from(noise)))
        .await
        .unwrap()
        .unwrap();
    assert!(cached.source.is_none());
    let mut decoded = Vec::new();
    GzDecoder::new(&cached.compressed[..])
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(decoded.len(), 4096);
}

#[tokio::test]
async fn test_threshold_skips_small_assets() {
    let calls = Arc::new(AtomicUsize::new(0));
    let options = PluginOptions::builder()
        .algorithm(sized(&calls, 0.1))
        .filename("[path][base].gz")
        .threshold(1025)
        .build()
        .unwrap();
    let plugin = CompressionPlugin::new(options).unwrap();
    let store: MemoryAssetStore = [zeros("app.js")].into_iter().collect();

    let report = plugin.run(&store, memory_cache().1).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.len(), 1);
    assert_eq!(
        report.outcome("app.js"),
        Some(&AssetOutcome::BelowThreshold { size: 1024 })
    );
}

#[tokio::test]
async fn test_second_pass_is_idempotent() {
    let plugin = CompressionPlugin::new(PluginOptions::default()).unwrap();
    let store: MemoryAssetStore = [zeros("app.js"), zeros("css/site.css")].into_iter().collect();
    let (_, cache) = memory_cache();

    plugin.run(&store, Arc::clone(&cache)).await;
    let first = store.assets();
    let report = plugin.run(&store, cache).await;

    assert_eq!(store.assets(), first);
    assert_eq!(report.stats.assets_emitted, 0);
    assert_eq!(
        report.outcome("app.js"),
        Some(&AssetOutcome::AlreadyProcessed {
            related: "app.js.gz".into()
        })
    );
    assert!(report.outcome("app.js.gz").is_none());
}

#[tokio::test]
async fn test_delete_policies() {
    let with_map = || -> MemoryAssetStore {
        [
            zeros("app.js").with_info(AssetInfo::default().with_related("sourceMap", "app.js.map")),
            Asset::new("app.js.map", &b"{}"[..]),
        ]
        .into_iter()
        .collect()
    };
    let only_js = PluginOptions::builder().test(Rule::regex(r"\.js$").unwrap());

    let always = CompressionPlugin::new(
        PluginOptions::builder()
            .test(Rule::regex(r"\.js$").unwrap())
            .delete_original_assets(true)
            .build()
            .unwrap(),
    )
    .unwrap();
    let store = with_map();
    let report = always.run(&store, memory_cache().1).await;
    assert!(!store.contains("app.js"));
    assert!(!store.contains("app.js.map"));
    assert!(store.contains("app.js.gz"));
    assert_eq!(report.deleted().collect::<Vec<_>>(), vec!["app.js"]);

    let keep_map = CompressionPlugin::new(
        PluginOptions::builder()
            .test(Rule::regex(r"\.js$").unwrap())
            .delete_original_assets(DeleteOriginalAssets::KeepSourceMap)
            .build()
            .unwrap(),
    )
    .unwrap();
    let store = with_map();
    keep_map.run(&store, memory_cache().1).await;
    assert!(!store.contains("app.js"));
    assert!(store.contains("app.js.map"));
    assert!(store.contains("app.js.gz"));

    let never = CompressionPlugin::new(
        only_js
            .delete_original_assets(DeleteOriginalAssets::predicate(|_| false))
            .build()
            .unwrap(),
    )
    .unwrap();
    let store = with_map();
    never.run(&store, memory_cache().1).await;
    let original = store.get("app.js").unwrap();
    assert_eq!(original.info.related("gzipped"), Some("app.js.gz"));
    assert_eq!(original.info.related("sourceMap"), Some("app.js.map"));
}

/// Deleting `app.js` cascades to its source map while the map's own task
/// may still be running; the result must not depend on which finishes first.
#[rstest]
#[case::map_finishes_last(b'{')]
#[case::script_finishes_last(b'j')]
#[tokio::test]
async fn test_cascading_delete_is_order_independent(#[case] slow_marker: u8) {
    let delayed = CustomAlgorithm::new(format!("delayed-{}", slow_marker), move |input: Bytes, _| {
        let slow = input.first() == Some(&slow_marker);
        async move {
            if slow {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Ok::<_, BoxError>(vec![b'z'; input.len() / 10])
        }
    });
    let plugin = CompressionPlugin::new(
        PluginOptions::builder()
            .algorithm(delayed)
            .filename("[path][base].gz")
            .delete_original_assets(true)
            .build()
            .unwrap(),
    )
    .unwrap();
    let store: MemoryAssetStore = [
        Asset::new("app.js", b"j".repeat(1024))
            .with_info(AssetInfo::default().with_related("sourceMap", "app.js.map")),
        Asset::new("app.js.map", b"{".repeat(1024)),
    ]
    .into_iter()
    .collect();

    let report = plugin.run(&store, memory_cache().1).await;

    assert!(!report.has_errors(), "{:?}", report.errors);
    assert_eq!(store.list(), vec!["app.js.gz", "app.js.map.gz"]);
    for name in ["app.js", "app.js.map"] {
        assert!(matches!(
            report.outcome(name),
            Some(AssetOutcome::Emitted {
                original_deleted: true,
                ..
            })
        ));
    }
}

#[tokio::test]
async fn test_linking_survives_vanished_original() {
    let plugin = CompressionPlugin::new(
        PluginOptions::builder()
            .delete_original_assets(DeleteOriginalAssets::predicate(|name| name == "app.js"))
            .build()
            .unwrap(),
    )
    .unwrap();
    let store: MemoryAssetStore = [
        zeros("app.js").with_info(AssetInfo::default().with_related("sourceMap", "app.js.map")),
        zeros("app.js.map"),
    ]
    .into_iter()
    .collect();

    let report = plugin.run(&store, memory_cache().1).await;

    assert!(!report.has_errors(), "{:?}", report.errors);
    assert!(store.contains("app.js.gz"));
    assert!(!store.contains("app.js"));
}

#[tokio::test]
async fn test_failures_are_isolated() {
    let failing = CustomAlgorithm::new("picky", |input: Bytes, _| async move {
        if input.starts_with(b"bad") {
            Err::<Bytes, BoxError>("refusing input".into())
        } else {
            Ok(Bytes::from_static(b"ok"))
        }
    });
    let options = PluginOptions::builder()
        .algorithm(failing)
        .filename("[path][base].x")
        .build()
        .unwrap();
    let plugin = CompressionPlugin::new(options).unwrap();
    let store: MemoryAssetStore = [
        Asset::new("bad.js", b"bad input that is long enough".to_vec()),
        Asset::new("good.js", b"good input that is long enough".to_vec()),
    ]
    .into_iter()
    .collect();

    let report = plugin.run(&store, memory_cache().1).await;

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].asset, "bad.js");
    assert_eq!(report.errors[0].error.kind(), ErrorKind::Compression);
    assert_eq!(report.outcome("bad.js"), Some(&AssetOutcome::Failed));
    assert!(!store.contains("bad.js.x"));
    assert!(store.contains("good.js.x"));
    assert_eq!(
        store.get("good.js").unwrap().info.related("xed"),
        Some("good.js.x")
    );
}

#[tokio::test]
async fn test_immutability_propagates_for_name_templates() {
    let plugin = CompressionPlugin::new(PluginOptions::default()).unwrap();
    let store: MemoryAssetStore = [
        zeros("app.3f2a.js").with_info(AssetInfo::default().with_immutable(true)),
        zeros("plain.js"),
    ]
    .into_iter()
    .collect();

    plugin.run(&store, memory_cache().1).await;

    assert!(store.get("app.3f2a.js.gz").unwrap().info.immutable);
    assert!(!store.get("plain.js.gz").unwrap().info.immutable);
}

#[tokio::test]
async fn test_dynamic_filename() {
    let calls = Arc::new(AtomicUsize::new(0));
    let options = PluginOptions::builder()
        .algorithm(sized(&calls, 0.5))
        .filename(FilenameTemplate::dynamic("compressed-dir", |data| {
            format!("compressed/{}[base].z", data.path)
        }))
        .build()
        .unwrap();
    let plugin = CompressionPlugin::new(options).unwrap();
    let store: MemoryAssetStore = [zeros("js/app.js")].into_iter().collect();

    plugin.run(&store, memory_cache().1).await;

    assert!(store.contains("compressed/js/app.js.z"));
    let related = plugin.relation_name().to_string();
    assert!(related.starts_with("compression-function-"));
    assert_eq!(
        store.get("js/app.js").unwrap().info.related(&related),
        Some("compressed/js/app.js.z")
    );
}

#[tokio::test]
async fn test_excluded_and_compressed_assets_are_ignored() {
    let options = PluginOptions::builder()
        .exclude(Rule::prefix("vendor/"))
        .build()
        .unwrap();
    let plugin = CompressionPlugin::new(options).unwrap();
    let store: MemoryAssetStore = [
        zeros("vendor/lib.js"),
        zeros("already.js.br").with_info(AssetInfo::compressed()),
    ]
    .into_iter()
    .collect();

    let report = plugin.run(&store, memory_cache().1).await;

    assert!(report.outcomes.is_empty());
    assert_eq!(store.len(), 2);
}
