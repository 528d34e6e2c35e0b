//! Named compression algorithm implementations
//!
//! Each well-known algorithm name maps to a codec with its own default tuning.
//! Options are read from the merged [`CompressionOptions`] map; keys a codec
//! does not understand are ignored.

use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
use flate2::Compression;
use serde_json::json;
use squash_types::{CompressionOptions, Error, Result};
use std::io::Write;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Trait for named compression algorithm implementations
pub trait Algorithm: Send + Sync {
    /// The well-known name this implementation answers to
    fn name(&self) -> &'static str;

    /// Default tuning, shallow-merged under caller options
    fn default_options(&self) -> CompressionOptions;

    /// Compress data with the given (already merged) options
    fn compress(&self, data: &[u8], options: &CompressionOptions) -> Result<Vec<u8>>;
}

/// Algorithm implementation factory
pub struct AlgorithmImpl;

impl AlgorithmImpl {
    /// Create the implementation behind a well-known name
    pub fn create(name: &str) -> Option<Arc<dyn Algorithm>> {
        let algorithm: Arc<dyn Algorithm> = match name {
            "gzip" => Arc::new(GzipAlgorithm),
            "deflate" => Arc::new(DeflateAlgorithm),
            "deflateRaw" => Arc::new(DeflateRawAlgorithm),
            "brotliCompress" => Arc::new(BrotliAlgorithm),
            "zstdCompress" => Arc::new(ZstdAlgorithm),
            _ => return None,
        };
        Some(algorithm)
    }

    /// Get all well-known names
    pub fn all_algorithms() -> &'static [&'static str] {
        &["gzip", "deflate", "deflateRaw", "brotliCompress", "zstdCompress"]
    }
}

/// Best compression level of the deflate family
const DEFLATE_BEST: i64 = 9;
/// Highest brotli quality
const BROTLI_MAX_QUALITY: i64 = 11;
/// Default brotli window size (log2)
const BROTLI_DEFAULT_LGWIN: i64 = 22;
/// Highest regular zstd level
const ZSTD_MAX_REGULAR_LEVEL: i64 = 19;

fn into_map(value: serde_json::Value) -> CompressionOptions {
    match value {
        serde_json::Value::Object(map) => map,
        _ => CompressionOptions::new(),
    }
}

/// Read an optional integer option, rejecting values outside `range`
fn integer_option(
    options: &CompressionOptions,
    key: &str,
    range: RangeInclusive<i64>,
) -> Result<Option<i64>> {
    let Some(value) = options.get(key) else {
        return Ok(None);
    };
    let number = value.as_i64().ok_or_else(|| {
        Error::compression(format!("Option \"{}\" must be an integer, got {}", key, value))
    })?;
    if !range.contains(&number) {
        return Err(Error::compression(format!(
            "Option \"{}\" is out of range: {} not in {}..={}",
            key,
            number,
            range.start(),
            range.end()
        )));
    }
    Ok(Some(number))
}

fn deflate_level(options: &CompressionOptions) -> Result<Compression> {
    // -1 selects the codec default
    Ok(match integer_option(options, "level", -1..=DEFLATE_BEST)? {
        Some(-1) | None => Compression::default(),
        Some(level) => Compression::new(level as u32),
    })
}

fn write_error(algorithm: &str, error: &std::io::Error) -> Error {
    Error::compression(format!("{} compression failed: {}", algorithm, error))
}

/// gzip framing (RFC 1952)
#[derive(Debug, Clone)]
pub struct GzipAlgorithm;

impl Algorithm for GzipAlgorithm {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn default_options(&self) -> CompressionOptions {
        into_map(json!({ "level": DEFLATE_BEST }))
    }

    fn compress(&self, data: &[u8], options: &CompressionOptions) -> Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), deflate_level(options)?);
        encoder
            .write_all(data)
            .map_err(|e| write_error(self.name(), &e))?;
        encoder.finish().map_err(|e| write_error(self.name(), &e))
    }
}

/// zlib framing (RFC 1950)
#[derive(Debug, Clone)]
pub struct DeflateAlgorithm;

impl Algorithm for DeflateAlgorithm {
    fn name(&self) -> &'static str {
        "deflate"
    }

    fn default_options(&self) -> CompressionOptions {
        into_map(json!({ "level": DEFLATE_BEST }))
    }

    fn compress(&self, data: &[u8], options: &CompressionOptions) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), deflate_level(options)?);
        encoder
            .write_all(data)
            .map_err(|e| write_error(self.name(), &e))?;
        encoder.finish().map_err(|e| write_error(self.name(), &e))
    }
}

/// Raw deflate stream (RFC 1951), no header
#[derive(Debug, Clone)]
pub struct DeflateRawAlgorithm;

impl Algorithm for DeflateRawAlgorithm {
    fn name(&self) -> &'static str {
        "deflateRaw"
    }

    fn default_options(&self) -> CompressionOptions {
        into_map(json!({ "level": DEFLATE_BEST }))
    }

    fn compress(&self, data: &[u8], options: &CompressionOptions) -> Result<Vec<u8>> {
        let mut encoder = DeflateEncoder::new(Vec::new(), deflate_level(options)?);
        encoder
            .write_all(data)
            .map_err(|e| write_error(self.name(), &e))?;
        encoder.finish().map_err(|e| write_error(self.name(), &e))
    }
}

/// Brotli, tuned through a `params` object (`quality`, `lgwin`)
#[derive(Debug, Clone)]
pub struct BrotliAlgorithm;

impl Algorithm for BrotliAlgorithm {
    fn name(&self) -> &'static str {
        "brotliCompress"
    }

    fn default_options(&self) -> CompressionOptions {
        into_map(json!({ "params": { "quality": BROTLI_MAX_QUALITY } }))
    }

    fn compress(&self, data: &[u8], options: &CompressionOptions) -> Result<Vec<u8>> {
        let params = match options.get("params") {
            None => CompressionOptions::new(),
            Some(serde_json::Value::Object(params)) => params.clone(),
            Some(other) => {
                return Err(Error::compression(format!(
                    "Option \"params\" must be an object, got {}",
                    other
                )))
            }
        };
        let quality = integer_option(&params, "quality", 0..=BROTLI_MAX_QUALITY)?
            .unwrap_or(BROTLI_MAX_QUALITY);
        let lgwin = integer_option(&params, "lgwin", 10..=24)?.unwrap_or(BROTLI_DEFAULT_LGWIN);

        let mut writer =
            brotli::CompressorWriter::new(Vec::new(), 4096, quality as u32, lgwin as u32);
        writer
            .write_all(data)
            .map_err(|e| write_error(self.name(), &e))?;
        Ok(writer.into_inner())
    }
}

/// Zstandard, tuned through `level`
#[derive(Debug, Clone)]
pub struct ZstdAlgorithm;

impl Algorithm for ZstdAlgorithm {
    fn name(&self) -> &'static str {
        "zstdCompress"
    }

    fn default_options(&self) -> CompressionOptions {
        into_map(json!({ "level": ZSTD_MAX_REGULAR_LEVEL }))
    }

    fn compress(&self, data: &[u8], options: &CompressionOptions) -> Result<Vec<u8>> {
        let range = zstd::compression_level_range();
        let level = integer_option(
            options,
            "level",
            i64::from(*range.start())..=i64::from(*range.end()),
        )?
        .unwrap_or(ZSTD_MAX_REGULAR_LEVEL);

        zstd::bulk::compress(data, level as i32).map_err(|e| write_error(self.name(), &e))
    }
}
