//! Moving assets between a directory and the in-memory store

use anyhow::{Context, Result};
use squash_config::FilenameTemplate;
use squash_engine::filename::render;
use squash_engine::policy::SOURCE_MAP_RELATION;
use squash_engine::{MemoryAssetStore, PassReport};
use squash_types::{Asset, AssetInfo, AssetInfoPatch, AssetStore};
use std::collections::BTreeSet;
use std::path::Path;
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Read every file under `root` into a store, named by `/`-separated relative path.
///
/// Relations that a previous run would have recorded are restored from the
/// file names: `x.map` next to `x` is its source map, and a file named like
/// the derived asset of `x` is linked to `x` and marked compressed.
pub async fn load_directory(
    root: &Path,
    filename: &FilenameTemplate,
    relation: &str,
) -> Result<MemoryAssetStore> {
    let store = MemoryAssetStore::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root)?;
        let name = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let content = fs::read(entry.path())
            .await
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;
        store.insert(Asset::new(name, content));
    }

    let names: BTreeSet<String> = store.list().into_iter().collect();
    for name in &names {
        let source_map = format!("{}.map", name);
        if names.contains(&source_map) {
            store.update(
                name,
                None,
                AssetInfoPatch::new().relate(SOURCE_MAP_RELATION, source_map),
            )?;
        }

        let derived = render(filename, name);
        if derived != *name && names.contains(&derived) {
            debug!("{} was compressed by an earlier run", name);
            store.update(name, None, AssetInfoPatch::new().relate(relation, &derived))?;
            mark_compressed(&store, &derived);
        }
    }

    Ok(store)
}

fn mark_compressed(store: &MemoryAssetStore, name: &str) {
    if let Some(asset) = store.get(name) {
        let info = AssetInfo {
            compressed: true,
            ..asset.info
        };
        store.insert(Asset::new(name, asset.source).with_info(info));
    }
}

/// Write emitted assets under `root` and remove the ones that disappeared.
///
/// Returns the number of files written and removed.
pub async fn write_back(
    root: &Path,
    before: &BTreeSet<String>,
    store: &MemoryAssetStore,
    report: &PassReport,
) -> Result<(usize, usize)> {
    let mut written = 0;
    for (_, derived) in report.emitted() {
        let Some(asset) = store.get(derived) else {
            continue;
        };
        let path = root.join(derived);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, asset.source.as_bytes())
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written += 1;
    }

    let mut removed = 0;
    for name in before.iter().filter(|name| !store.contains(name)) {
        let path = root.join(name);
        fs::remove_file(&path)
            .await
            .with_context(|| format!("Failed to remove {}", path.display()))?;
        removed += 1;
    }

    Ok((written, removed))
}
