//! Lazily computed content fingerprints

use squash_types::Bytes;
use std::fmt;
use std::sync::OnceLock;

/// Fingerprint of an asset's bytes, hashed on first use.
///
/// A store only asks for the tag once it has found an entry under the
/// requested key, so a cold cache never hashes anything on lookup.
pub struct LazyContentTag {
    source: Bytes,
    tag: OnceLock<String>,
}

impl LazyContentTag {
    /// Wrap the bytes to fingerprint
    pub fn new(source: Bytes) -> Self {
        Self {
            source,
            tag: OnceLock::new(),
        }
    }

    /// The fingerprint, computing it if needed
    pub fn get(&self) -> &str {
        self.tag
            .get_or_init(|| blake3::hash(&self.source).to_hex().to_string())
    }

    /// Check whether the fingerprint has been computed yet
    pub fn is_computed(&self) -> bool {
        self.tag.get().is_some()
    }
}

impl fmt::Debug for LazyContentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyContentTag")
            .field("len", &self.source.len())
            .field("tag", &self.tag.get())
            .finish()
    }
}
