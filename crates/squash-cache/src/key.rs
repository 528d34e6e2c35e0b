//! Cache identities
//!
//! A key covers everything about a compression request except the content:
//! asset name, algorithm identity and the effective options. Content is
//! checked separately through the [`LazyContentTag`](crate::LazyContentTag).

use serde_json::{Map, Value};
use squash_types::CompressionOptions;
use std::fmt;

/// Deterministic identity of a (name, algorithm, options) triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build the identity.
    ///
    /// Object keys serialize in sorted order at every depth, so equal inputs
    /// give byte-identical keys across runs.
    pub fn new(name: &str, algorithm: &Value, options: &CompressionOptions) -> Self {
        let mut identity = Map::new();
        identity.insert("name".to_string(), Value::String(name.to_string()));
        identity.insert("algorithm".to_string(), algorithm.clone());
        identity.insert(
            "compressionOptions".to_string(),
            Value::Object(options.clone()),
        );
        Self(Value::Object(identity).to_string())
    }

    /// The serialized identity
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}
