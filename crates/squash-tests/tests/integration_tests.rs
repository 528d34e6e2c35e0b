//! Integration tests for squash
//!
//! These tests drive whole compression passes through the public API of
//! every crate: configuration, algorithms, caches and the engine.

use rstest::rstest;
use squash_cache::{CacheConfig, CacheStore, FileCacheStore, MemoryCacheStore};
use squash_config::{ConfigLoader, DeleteOriginalAssets, PluginOptions, Rule};
use squash_engine::{AssetOutcome, CompressionPlugin, MemoryAssetStore};
use squash_tests::test_utils::{
    build_output, counting_gzip, generate_test_data, gunzip, unbrotli, unzstd, TestDataPattern,
};
use squash_types::{Asset, AssetStore, ErrorKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn memory_cache() -> Arc<dyn CacheStore> {
    Arc::new(MemoryCacheStore::new())
}

#[tokio::test]
async fn test_gzip_build_output() {
    let options = PluginOptions::builder()
        .test(Rule::regex(r"\.(js|css)$").unwrap())
        .threshold(1024)
        .build()
        .unwrap();
    let plugin = CompressionPlugin::new(options).unwrap();
    let store = build_output();

    let report = plugin.run(&store, memory_cache()).await;

    assert!(!report.has_errors());
    assert_eq!(report.stats.assets_matched, 4);
    assert_eq!(report.stats.assets_emitted, 3);
    assert_eq!(
        report.outcome("tiny.js"),
        Some(&AssetOutcome::BelowThreshold { size: 2 })
    );
    assert!(report.outcome("img/logo.png").is_none());
    assert!(report.outcome("js/app.js.map").is_none());

    for name in ["js/app.js", "js/vendor.js", "css/site.css"] {
        let derived_name = format!("{}.gz", name);
        let original = store.get(name).unwrap();
        let derived = store.get(&derived_name).unwrap();
        assert_eq!(original.info.related("gzipped"), Some(derived_name.as_str()));
        assert!(derived.info.compressed);
        assert_eq!(gunzip(derived.source.as_bytes()), original.source.as_bytes());
    }
    // Existing relations survive linking
    assert_eq!(
        store.get("js/app.js").unwrap().info.related("sourceMap"),
        Some("js/app.js.map")
    );
}

#[rstest]
#[case("gzip", "gzipped", "js/app.js.gz", gunzip as fn(&[u8]) -> Vec<u8>)]
#[case("brotliCompress", "brotliCompressed", "js/app.js.br", unbrotli)]
#[case("zstdCompress", "zstdCompressed", "js/app.js.zst", unzstd)]
#[tokio::test]
async fn test_named_algorithm_defaults(
    #[case] algorithm: &str,
    #[case] relation: &str,
    #[case] derived: &str,
    #[case] decode: fn(&[u8]) -> Vec<u8>,
) {
    let plugin = CompressionPlugin::new(
        PluginOptions::builder()
            .algorithm(algorithm)
            .build()
            .unwrap(),
    )
    .unwrap();
    let store = build_output();

    plugin.run(&store, memory_cache()).await;

    let original = store.get("js/app.js").unwrap();
    assert_eq!(original.info.related(relation), Some(derived));
    assert_eq!(
        decode(store.get(derived).unwrap().source.as_bytes()),
        original.source.as_bytes()
    );
}

#[tokio::test]
async fn test_brotli_keeps_source_maps() {
    let options = PluginOptions::builder()
        .test(Rule::regex(r"\.js$").unwrap())
        .algorithm("brotliCompress")
        .threshold(1024)
        .delete_original_assets(DeleteOriginalAssets::KeepSourceMap)
        .build()
        .unwrap();
    let plugin = CompressionPlugin::new(options).unwrap();
    assert_eq!(plugin.relation_name(), "brotliCompressed");
    let store = build_output();
    let app = store.get("js/app.js").unwrap();

    let report = plugin.run(&store, memory_cache()).await;

    assert!(!report.has_errors());
    assert!(!store.contains("js/app.js"));
    assert!(!store.contains("js/vendor.js"));
    assert!(store.contains("js/app.js.map"));
    assert!(store.contains("js/vendor.js.map"));
    assert!(store.contains("tiny.js"));
    assert_eq!(
        unbrotli(store.get("js/app.js.br").unwrap().source.as_bytes()),
        app.source.as_bytes()
    );

    let mut deleted: Vec<_> = report.deleted().collect();
    deleted.sort_unstable();
    assert_eq!(deleted, vec!["js/app.js", "js/vendor.js"]);
}

#[tokio::test]
async fn test_settings_file_drives_a_pass() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("squash.yaml");
    std::fs::write(
        &path,
        r#"
algorithm: zstdCompress
test:
  - regex: "\\.js$"
threshold: 1024
delete_original_assets: true
"#,
    )
    .unwrap();

    let settings = ConfigLoader::load_from_file(&path).unwrap();
    let plugin = CompressionPlugin::from_settings(settings).unwrap();
    let store = build_output();
    let app = store.get("js/app.js").unwrap();

    let report = plugin.run(&store, memory_cache()).await;

    assert!(!report.has_errors());
    assert_eq!(
        unzstd(store.get("js/app.js.zst").unwrap().source.as_bytes()),
        app.source.as_bytes()
    );
    // Deleting the original also removes its source map
    assert!(!store.contains("js/app.js"));
    assert!(!store.contains("js/app.js.map"));
    assert!(store.contains("css/site.css"));
}

#[tokio::test]
async fn test_file_cache_survives_restart() {
    let dir = TempDir::new().unwrap();
    let config = CacheConfig::at(dir.path().join("cache.bin"));

    let first_calls = Arc::new(AtomicUsize::new(0));
    {
        let cache = Arc::new(FileCacheStore::open(config.clone()).await.unwrap());
        let options = PluginOptions::builder()
            .algorithm(counting_gzip("counting-gzip", &first_calls))
            .build()
            .unwrap();
        let plugin = CompressionPlugin::new(options).unwrap();
        let report = plugin.run(&build_output(), cache.clone()).await;
        assert!(!report.has_errors());
        cache.save().await.unwrap();
    }
    assert_eq!(first_calls.load(Ordering::SeqCst), 7);

    let second_calls = Arc::new(AtomicUsize::new(0));
    let cache = Arc::new(FileCacheStore::open(config).await.unwrap());
    assert_eq!(cache.len(), 7);
    let options = PluginOptions::builder()
        .algorithm(counting_gzip("counting-gzip", &second_calls))
        .build()
        .unwrap();
    let plugin = CompressionPlugin::new(options).unwrap();
    let store = build_output();

    let report = plugin.run(&store, cache).await;

    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    assert_eq!(report.stats.compressions, 0);
    assert_eq!(report.stats.cache_hits, 7);
    assert!(store.contains("js/app.js.gz"));
    // Incompressible content is remembered as rejected
    assert!(matches!(
        report.outcome("img/logo.png"),
        Some(AssetOutcome::Rejected { .. })
    ));
    assert!(!store.contains("img/logo.png.gz"));
}

#[tokio::test]
async fn test_algorithm_change_misses_cache() {
    let cache = memory_cache();
    let gzip = CompressionPlugin::new(PluginOptions::default()).unwrap();
    let brotli = CompressionPlugin::new(
        PluginOptions::builder()
            .algorithm("brotliCompress")
            .build()
            .unwrap(),
    )
    .unwrap();

    let first = gzip.run(&build_output(), Arc::clone(&cache)).await;
    let second = brotli.run(&build_output(), Arc::clone(&cache)).await;

    assert_eq!(first.stats.cache_hits, 0);
    assert_eq!(second.stats.cache_hits, 0);
    assert_eq!(second.stats.compressions, first.stats.compressions);
}

#[tokio::test]
async fn test_emit_conflict_is_isolated() {
    let store: MemoryAssetStore = [
        Asset::new("a.js", generate_test_data(4096, TestDataPattern::Zeros)),
        Asset::new("a.js.gz", b"stale".to_vec()),
        Asset::new("b.js", generate_test_data(4096, TestDataPattern::Zeros)),
    ]
    .into_iter()
    .collect();
    let plugin = CompressionPlugin::new(
        PluginOptions::builder()
            .test(Rule::regex(r"\.js$").unwrap())
            .build()
            .unwrap(),
    )
    .unwrap();

    let report = plugin.run(&store, memory_cache()).await;

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].asset, "a.js");
    assert_eq!(report.errors[0].error.kind(), ErrorKind::Asset);
    assert_eq!(report.outcome("a.js"), Some(&AssetOutcome::Failed));
    assert!(report.outcome("b.js").unwrap().is_emitted());
    assert_eq!(store.get("a.js.gz").unwrap().source.as_bytes(), b"stale");
}

#[tokio::test]
async fn test_many_assets_in_one_pass() {
    let store: MemoryAssetStore = (0..200)
        .map(|i| {
            Asset::new(
                format!("chunks/{}.js", i),
                generate_test_data(2048 + i, TestDataPattern::Text),
            )
        })
        .collect();
    let plugin = CompressionPlugin::new(PluginOptions::default()).unwrap();

    let report = plugin.run(&store, memory_cache()).await;

    assert!(!report.has_errors());
    assert_eq!(report.stats.assets_emitted, 200);
    assert_eq!(report.stats.compressions, 200);
    assert_eq!(store.len(), 400);
    assert!(report.stats.compression_ratio() < 0.2);

    // A second pass over the same store finds everything processed
    let again = plugin.run(&store, memory_cache()).await;
    assert_eq!(again.stats.assets_emitted, 0);
    assert_eq!(again.stats.compressions, 0);
}
