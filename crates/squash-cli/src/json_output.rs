//! JSON output structures for the squash CLI

use serde::Serialize;
use squash_engine::{AssetOutcome, PassReport};
use squash_types::PassStats;
use std::collections::BTreeMap;

/// Complete JSON output for a compress run
#[derive(Debug, Serialize)]
pub struct PassResultJson<'a> {
    /// Run metadata
    pub metadata: RunMetadata,
    /// Outcome per eligible asset
    pub outcomes: &'a BTreeMap<String, AssetOutcome>,
    /// Per-asset failures
    pub errors: Vec<AssetErrorJson>,
    /// Aggregated statistics
    pub stats: &'a PassStats,
    /// Files written to disk
    pub files_written: usize,
    /// Files removed from disk
    pub files_removed: usize,
}

/// Run metadata
#[derive(Debug, Serialize)]
pub struct RunMetadata {
    /// squash version
    pub version: String,
    /// Directory that was processed
    pub directory: String,
    /// Algorithm identity
    pub algorithm: serde_json::Value,
    /// Relation kind linking originals to derived assets
    pub relation: String,
    /// Whether files were left untouched
    pub dry_run: bool,
}

/// Failure of one asset
#[derive(Debug, Serialize)]
pub struct AssetErrorJson {
    /// Asset name
    pub asset: String,
    /// Error category
    pub kind: String,
    /// Error message
    pub message: String,
}

impl<'a> PassResultJson<'a> {
    /// Build the output from a report
    pub fn new(
        metadata: RunMetadata,
        report: &'a PassReport,
        files_written: usize,
        files_removed: usize,
    ) -> Self {
        let errors = report
            .errors
            .iter()
            .map(|error| AssetErrorJson {
                asset: error.asset.clone(),
                kind: format!("{:?}", error.error.kind()),
                message: error.error.to_string(),
            })
            .collect();

        Self {
            metadata,
            outcomes: &report.outcomes,
            errors,
            stats: &report.stats,
            files_written,
            files_removed,
        }
    }
}
