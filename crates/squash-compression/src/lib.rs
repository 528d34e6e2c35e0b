//! Compression algorithm adapter for squash
//!
//! This crate turns an algorithm selection into something a compression pass
//! can call without caring where the bytes come from:
//!
//! - **Named algorithms**: `gzip`, `deflate`, `deflateRaw`, `brotliCompress`, `zstdCompress`
//! - **Default tuning**: best-compression defaults, shallow-merged under caller options
//! - **Custom algorithms**: async functions with a stable identifier
//! - **Output normalization**: every result becomes a shared byte buffer
//!
//! # Examples
//!
//! ```rust
//! use squash_compression::{AlgorithmAdapter, AlgorithmSpec};
//! use squash_types::{Bytes, CompressionOptions};
//!
//! # tokio_test::block_on(async {
//! let adapter = AlgorithmAdapter::new(AlgorithmSpec::named("gzip"), CompressionOptions::new())?;
//! let compressed = adapter.compress(Bytes::from(vec![0u8; 1024])).await?;
//! assert!(compressed.len() < 1024);
//! # Ok::<(), squash_types::Error>(())
//! # });
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod adapter;
pub mod algorithms;


// Re-export main types
pub use adapter::{
    AlgorithmAdapter, AlgorithmOutput, AlgorithmSpec, BoxError, CompressFuture, CustomAlgorithm,
};
pub use algorithms::{Algorithm, AlgorithmImpl};
