//! Cached compression results

use serde::{Deserialize, Serialize};
use squash_types::{Bytes, RawSource};

/// Value stored under a cache key.
///
/// A result rejected by the ratio policy only keeps the compressed bytes.
/// The output representation is materialized once a result is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedOutput {
    /// Raw algorithm output
    pub compressed: Bytes,
    /// Output representation, present once the result was accepted
    pub source: Option<RawSource>,
}

impl CachedOutput {
    /// Entry for a result that was not emitted
    pub fn compressed_only(compressed: Bytes) -> Self {
        Self {
            compressed,
            source: None,
        }
    }

    /// Entry for an accepted result
    pub fn accepted(compressed: Bytes) -> Self {
        let source = RawSource::from(compressed.clone());
        Self {
            compressed,
            source: Some(source),
        }
    }

    /// Check if the output representation has been materialized
    pub fn is_accepted(&self) -> bool {
        self.source.is_some()
    }
}
