//! In-memory asset store

use parking_lot::RwLock;
use squash_types::{Asset, AssetInfo, AssetInfoPatch, AssetStore, Error, RawSource, Result};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredAsset {
    source: RawSource,
    info: AssetInfo,
}

/// Asset store backed by an ordered map.
///
/// Deleting an asset also deletes the assets it relates to, unless another
/// remaining asset still relates to them.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: RwLock<BTreeMap<String, StoredAsset>>,
}

impl MemoryAssetStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an asset
    pub fn insert(&self, asset: Asset) {
        self.assets.write().insert(
            asset.name,
            StoredAsset {
                source: asset.source,
                info: asset.info,
            },
        );
    }

    /// Number of assets
    pub fn len(&self) -> usize {
        self.assets.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.assets.read().is_empty()
    }

    /// Check if an asset exists
    pub fn contains(&self, name: &str) -> bool {
        self.assets.read().contains_key(name)
    }

    /// Snapshot of every asset, ordered by name
    pub fn assets(&self) -> Vec<Asset> {
        self.assets
            .read()
            .iter()
            .map(|(name, stored)| Asset {
                name: name.clone(),
                source: stored.source.clone(),
                info: stored.info.clone(),
            })
            .collect()
    }
}

impl FromIterator<Asset> for MemoryAssetStore {
    fn from_iter<I: IntoIterator<Item = Asset>>(iter: I) -> Self {
        let store = Self::new();
        for asset in iter {
            store.insert(asset);
        }
        store
    }
}

fn is_referenced(assets: &BTreeMap<String, StoredAsset>, name: &str) -> bool {
    assets
        .values()
        .any(|stored| stored.info.related.values().any(|related| related == name))
}

fn remove_cascading(assets: &mut BTreeMap<String, StoredAsset>, name: &str) -> bool {
    let Some(removed) = assets.remove(name) else {
        return false;
    };
    for related in removed.info.related.values() {
        if !is_referenced(assets, related) && remove_cascading(assets, related) {
            debug!("Deleted {} along with {}", related, name);
        }
    }
    true
}

impl AssetStore for MemoryAssetStore {
    fn list(&self) -> Vec<String> {
        self.assets.read().keys().cloned().collect()
    }

    fn get(&self, name: &str) -> Option<Asset> {
        self.assets.read().get(name).map(|stored| Asset {
            name: name.to_string(),
            source: stored.source.clone(),
            info: stored.info.clone(),
        })
    }

    fn update(&self, name: &str, source: Option<RawSource>, patch: AssetInfoPatch) -> Result<()> {
        let mut assets = self.assets.write();
        let stored = assets
            .get_mut(name)
            .ok_or_else(|| Error::asset_not_found(name))?;
        if let Some(source) = source {
            stored.source = source;
        }
        stored.info.apply(&patch);
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        if !remove_cascading(&mut self.assets.write(), name) {
            debug!("{} was already deleted", name);
        }
        Ok(())
    }

    fn emit(&self, name: &str, source: RawSource, info: AssetInfo) -> Result<()> {
        let mut assets = self.assets.write();
        match assets.get_mut(name) {
            Some(existing) if existing.source != source => Err(Error::asset_conflict(name)),
            Some(existing) => {
                existing.info.compressed |= info.compressed;
                existing.info.immutable = info.immutable;
                existing.info.related.extend(info.related);
                Ok(())
            }
            None => {
                assets.insert(name.to_string(), StoredAsset { source, info });
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squash_types::ErrorKind;

    fn store() -> MemoryAssetStore {
        [
            Asset::new("app.js", &b"console.log(1)"[..])
                .with_info(AssetInfo::default().with_related("sourceMap", "app.js.map")),
            Asset::new("app.js.map", &b"{}"[..]),
            Asset::new("site.css", &b"body{}"[..]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_list_is_ordered() {
        assert_eq!(store().list(), vec!["app.js", "app.js.map", "site.css"]);
    }

    #[test]
    fn test_delete_cascades_to_related() {
        let store = store();
        store.delete("app.js").unwrap();
        assert!(!store.contains("app.js"));
        assert!(!store.contains("app.js.map"));
        assert!(store.contains("site.css"));

        // The cascaded source map is gone already
        store.delete("app.js.map").unwrap();
        assert_eq!(store.list(), vec!["site.css"]);
    }

    #[test]
    fn test_delete_keeps_shared_relations() {
        let store = store();
        store
            .update(
                "site.css",
                None,
                AssetInfoPatch::new().relate("sourceMap", "app.js.map"),
            )
            .unwrap();
        store.delete("app.js").unwrap();
        assert!(store.contains("app.js.map"));
    }

    #[test]
    fn test_detached_relation_survives_delete() {
        let store = store();
        store
            .update("app.js", None, AssetInfoPatch::new().unrelate("sourceMap"))
            .unwrap();
        store.delete("app.js").unwrap();
        assert!(store.contains("app.js.map"));
    }

    #[test]
    fn test_cyclic_relations_terminate() {
        let store: MemoryAssetStore = [
            Asset::new("a", &b"a"[..]).with_info(AssetInfo::default().with_related("x", "b")),
            Asset::new("b", &b"b"[..]).with_info(AssetInfo::default().with_related("x", "a")),
        ]
        .into_iter()
        .collect();
        store.delete("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_assets() {
        let store = store();
        store.delete("nope.js").unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(
            store
                .update("nope.js", None, AssetInfoPatch::new())
                .unwrap_err()
                .kind(),
            ErrorKind::Asset
        );
        assert!(store.get("nope.js").is_none());
    }

    #[test]
    fn test_emit_conflict() {
        let store = store();
        let info = AssetInfo::compressed();
        store
            .emit("app.js.gz", RawSource::from(&b"gz"[..]), info.clone())
            .unwrap();
        store
            .emit("app.js.gz", RawSource::from(&b"gz"[..]), info.clone())
            .unwrap();

        let error = store
            .emit("app.js.gz", RawSource::from(&b"other"[..]), info)
            .unwrap_err();
        assert!(matches!(error, Error::AssetConflict { .. }));
        assert_eq!(store.get("app.js.gz").unwrap().source.as_bytes(), b"gz");
    }

    #[test]
    fn test_update_replaces_source() {
        let store = store();
        store
            .update("site.css", Some(RawSource::from(&b"p{}"[..])), AssetInfoPatch::new())
            .unwrap();
        assert_eq!(store.get("site.css").unwrap().source.as_bytes(), b"p{}");
    }
}
