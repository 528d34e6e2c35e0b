//! Collaborator traits
//!
//! The asset store belongs to the host build tool. A compression pass only
//! reads from it and requests mutations through this interface.

use crate::{Asset, AssetInfo, AssetInfoPatch, RawSource, Result};

/// Store of named assets shared by all tasks of a pass.
///
/// Implementations synchronize internally; every method takes `&self` and
/// may be called from many in-flight tasks at once.
pub trait AssetStore: Send + Sync {
    /// Names of all assets currently in the store
    fn list(&self) -> Vec<String>;

    /// Snapshot of an asset
    fn get(&self, name: &str) -> Option<Asset>;

    /// Replace an asset's content (when `source` is given) and merge a metadata patch
    fn update(&self, name: &str, source: Option<RawSource>, patch: AssetInfoPatch) -> Result<()>;

    /// Remove an asset and the related assets nothing else references;
    /// removing a missing asset is a no-op
    fn delete(&self, name: &str) -> Result<()>;

    /// Add a new asset
    fn emit(&self, name: &str, source: RawSource, info: AssetInfo) -> Result<()>;
}
