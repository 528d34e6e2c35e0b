//! Acceptance and emission decisions

use crate::filename::is_immutable_template;
use squash_config::{DeleteOriginalAssets, FilenameTemplate};
use squash_types::{AssetInfo, AssetInfoPatch};

/// Relation kind pointing from an asset to its source map
pub const SOURCE_MAP_RELATION: &str = "sourceMap";

/// What happens to an original once its compressed form is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Keep it and link it to the derived asset
    Link,
    /// Delete it
    Delete,
    /// Detach its source map, then delete it
    DeleteKeepingSourceMap,
}

impl Disposition {
    /// Disposition of the original called `name` under `policy`
    pub fn for_asset(policy: &DeleteOriginalAssets, name: &str) -> Self {
        match policy {
            DeleteOriginalAssets::Never => Self::Link,
            DeleteOriginalAssets::Always => Self::Delete,
            DeleteOriginalAssets::KeepSourceMap => Self::DeleteKeepingSourceMap,
            DeleteOriginalAssets::Predicate(predicate) if predicate(name) => Self::Delete,
            DeleteOriginalAssets::Predicate(_) => Self::Link,
        }
    }

    /// Whether the original is gone afterwards
    pub fn deletes(self) -> bool {
        !matches!(self, Self::Link)
    }
}

/// Patch linking an original to its derived asset
pub fn link_patch(relation: &str, filename: &str) -> AssetInfoPatch {
    AssetInfoPatch::new().relate(relation, filename)
}

/// Patch detaching an original's source map
pub fn detach_source_map_patch() -> AssetInfoPatch {
    AssetInfoPatch::new().unrelate(SOURCE_MAP_RELATION)
}

/// Metadata of a derived asset
pub fn derived_info(original: &AssetInfo, template: &FilenameTemplate) -> AssetInfo {
    AssetInfo::compressed().with_immutable(original.immutable && is_immutable_template(template))
}
