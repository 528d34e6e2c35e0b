//! Core data types for squash
//!
//! Assets are owned by the host's asset store; the types here are the
//! snapshots and patches that flow between that store and a compression pass.

use bytes::Bytes;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Tuning options handed to a compression algorithm.
///
/// The map is ordered by key, so serializing it is deterministic across runs.
pub type CompressionOptions = serde_json::Map<String, serde_json::Value>;

/// Materialized output representation of an asset's content
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawSource {
    buffer: Bytes,
}

impl RawSource {
    /// Wrap a byte buffer
    pub fn new(buffer: impl Into<Bytes>) -> Self {
        Self {
            buffer: buffer.into(),
        }
    }

    /// Get a cheap handle to the underlying buffer
    pub fn buffer(&self) -> Bytes {
        self.buffer.clone()
    }

    /// Borrow the content
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Content length in bytes
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Check whether the content is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl From<Bytes> for RawSource {
    fn from(buffer: Bytes) -> Self {
        Self { buffer }
    }
}

impl From<Vec<u8>> for RawSource {
    fn from(buffer: Vec<u8>) -> Self {
        Self::new(buffer)
    }
}

impl From<&'static [u8]> for RawSource {
    fn from(buffer: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(buffer))
    }
}

/// Metadata record attached to an asset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssetInfo {
    /// The asset is the output of a compression pass
    pub compressed: bool,
    /// The asset name is content-addressed and may be cached forever
    pub immutable: bool,
    /// Relation kind to related asset name
    pub related: BTreeMap<String, String>,
}

impl AssetInfo {
    /// Info for a freshly compressed asset
    pub fn compressed() -> Self {
        Self {
            compressed: true,
            ..Self::default()
        }
    }

    /// Mark the asset immutable
    pub fn with_immutable(mut self, immutable: bool) -> Self {
        self.immutable = immutable;
        self
    }

    /// Add a relation
    pub fn with_related(mut self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        self.related.insert(kind.into(), name.into());
        self
    }

    /// Look up the asset related under `kind`
    pub fn related(&self, kind: &str) -> Option<&str> {
        self.related.get(kind).map(String::as_str)
    }

    /// Merge a patch into this record
    pub fn apply(&mut self, patch: &AssetInfoPatch) {
        for (kind, target) in &patch.related {
            match target {
                Some(name) => {
                    self.related.insert(kind.clone(), name.clone());
                }
                None => {
                    self.related.remove(kind);
                }
            }
        }
    }
}

/// Partial update for an [`AssetInfo`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetInfoPatch {
    /// Relations to set (`Some`) or clear (`None`)
    pub related: BTreeMap<String, Option<String>>,
}

impl AssetInfoPatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `kind` to `name`
    pub fn relate(mut self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        self.related.insert(kind.into(), Some(name.into()));
        self
    }

    /// Clear the relation under `kind`
    pub fn unrelate(mut self, kind: impl Into<String>) -> Self {
        self.related.insert(kind.into(), None);
        self
    }

    /// Check if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.related.is_empty()
    }
}

/// Snapshot of a named asset read from the asset store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Unique path-like name
    pub name: String,
    /// Content
    pub source: RawSource,
    /// Metadata
    pub info: AssetInfo,
}

impl Asset {
    /// Create an asset with default metadata
    pub fn new(name: impl Into<String>, source: impl Into<RawSource>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            info: AssetInfo::default(),
        }
    }

    /// Replace the metadata
    pub fn with_info(mut self, info: AssetInfo) -> Self {
        self.info = info;
        self
    }
}

/// Path components of an asset name, as seen by filename templates
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathData {
    /// The full asset name
    pub filename: String,
    /// Name without query and fragment
    pub file: String,
    /// Query including the leading `?`, or empty
    pub query: String,
    /// Fragment including the leading `#`, or empty
    pub fragment: String,
    /// Directory part with trailing `/`, or empty
    pub path: String,
    /// Last path segment
    pub base: String,
    /// Last path segment without extension
    pub name: String,
    /// Extension including the leading `.`, or empty
    pub ext: String,
}

impl PathData {
    /// Split an asset name into its path components
    pub fn from_filename(filename: &str) -> Self {
        let path_end = filename.find(&['?', '#'][..]).unwrap_or(filename.len());
        let (file, rest) = filename.split_at(path_end);
        let (query, fragment) = if rest.starts_with('?') {
            let query_end = rest.find('#').unwrap_or(rest.len());
            rest.split_at(query_end)
        } else {
            ("", rest)
        };

        let base = file.rsplit('/').next().unwrap_or(file);
        let ext = extension_of(base);
        let name = &base[..base.len() - ext.len()];
        let path = &file[..file.len() - base.len()];

        Self {
            filename: filename.to_string(),
            file: file.to_string(),
            query: query.to_string(),
            fragment: fragment.to_string(),
            path: path.to_string(),
            base: base.to_string(),
            name: name.to_string(),
            ext: ext.to_string(),
        }
    }
}

/// Extension of a path segment including the dot; a leading dot is not an extension
pub fn extension_of(base: &str) -> &str {
    match base.rfind('.') {
        Some(0) | None => "",
        Some(index) => &base[index..],
    }
}

/// Statistics for one compression pass
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PassStats {
    /// Assets that passed the rule matcher
    pub assets_matched: u64,
    /// Derived assets emitted
    pub assets_emitted: u64,
    /// Assets whose compressed form was rejected by the ratio policy
    pub assets_rejected: u64,
    /// Assets skipped (below threshold or already processed)
    pub assets_skipped: u64,
    /// Assets that failed with a recorded error
    pub assets_failed: u64,
    /// Algorithm invocations
    pub compressions: u64,
    /// Compressions avoided thanks to the cache
    pub cache_hits: u64,
    /// Original bytes of compressed assets
    pub bytes_in: u64,
    /// Compressed bytes of emitted assets
    pub bytes_out: u64,
    /// Wall time of the pass
    pub duration: Duration,
}

impl PassStats {
    /// Create a new empty statistics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Overall compressed/original ratio of emitted assets
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            1.0
        } else {
            self.bytes_out as f64 / self.bytes_in as f64
        }
    }

    /// Bytes saved by emitted assets
    pub fn bytes_saved(&self) -> u64 {
        self.bytes_in.saturating_sub(self.bytes_out)
    }

    /// Merge statistics from another instance
    pub fn merge(&mut self, other: &PassStats) {
        self.assets_matched += other.assets_matched;
        self.assets_emitted += other.assets_emitted;
        self.assets_rejected += other.assets_rejected;
        self.assets_skipped += other.assets_skipped;
        self.assets_failed += other.assets_failed;
        self.compressions += other.compressions;
        self.cache_hits += other.cache_hits;
        self.bytes_in += other.bytes_in;
        self.bytes_out += other.bytes_out;
        self.duration += other.duration;
    }
}
