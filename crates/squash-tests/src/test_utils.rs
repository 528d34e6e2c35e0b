//! Unified test utilities for squash integration tests

use squash_compression::{BoxError, CustomAlgorithm};
use squash_engine::MemoryAssetStore;
use squash_types::{Asset, Bytes};
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Test data generation patterns
#[derive(Debug, Clone, Copy)]
pub enum TestDataPattern {
    /// All zeros - highly compressible
    Zeros,
    /// Deterministic pseudo-random bytes - incompressible
    Random,
    /// Repeated source-like text
    Text,
}

/// Generate test data with specified pattern
pub fn generate_test_data(size: usize, pattern: TestDataPattern) -> Vec<u8> {
    match pattern {
        TestDataPattern::Zeros => vec![0u8; size],
        TestDataPattern::Random => {
            // xorshift keeps the data reproducible
            let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
            (0..size)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    (state >> 24) as u8
                })
                .collect()
        }
        TestDataPattern::Text => b"export function add(a, b) { return a + b; }\n"
            .iter()
            .copied()
            .cycle()
            .take(size)
            .collect(),
    }
}

/// A typical build output: scripts with source maps, a stylesheet, an image
pub fn build_output() -> MemoryAssetStore {
    use squash_types::AssetInfo;

    let map_info = |map: &str| AssetInfo::default().with_related("sourceMap", map);
    [
        Asset::new("js/app.js", generate_test_data(8 * 1024, TestDataPattern::Text))
            .with_info(map_info("js/app.js.map")),
        Asset::new("js/app.js.map", generate_test_data(4 * 1024, TestDataPattern::Text)),
        Asset::new("js/vendor.js", generate_test_data(16 * 1024, TestDataPattern::Text))
            .with_info(map_info("js/vendor.js.map")),
        Asset::new("js/vendor.js.map", generate_test_data(4 * 1024, TestDataPattern::Text)),
        Asset::new("css/site.css", generate_test_data(2 * 1024, TestDataPattern::Text)),
        Asset::new("img/logo.png", generate_test_data(4 * 1024, TestDataPattern::Random)),
        Asset::new("tiny.js", b"1;".to_vec()),
    ]
    .into_iter()
    .collect()
}

/// Custom algorithm that gzips its input and counts invocations
pub fn counting_gzip(id: &str, calls: &Arc<AtomicUsize>) -> CustomAlgorithm {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let calls = Arc::clone(calls);
    CustomAlgorithm::new(id, move |input: Bytes, _| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
            encoder.write_all(&input)?;
            Ok::<_, BoxError>(encoder.finish()?)
        }
    })
}

/// Decode a gzip stream
pub fn gunzip(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::GzDecoder::new(data)
        .read_to_end(&mut out)
        .expect("valid gzip stream");
    out
}

/// Decode a brotli stream
pub fn unbrotli(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    brotli::Decompressor::new(data, 4096)
        .read_to_end(&mut out)
        .expect("valid brotli stream");
    out
}

/// Decode a zstd frame
pub fn unzstd(data: &[u8]) -> Vec<u8> {
    zstd::stream::decode_all(data).expect("valid zstd frame")
}
