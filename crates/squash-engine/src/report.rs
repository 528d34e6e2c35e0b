//! Pass results

use serde::Serialize;
use squash_types::{Error, PassStats};
use std::collections::BTreeMap;
use std::fmt;

/// What a pass did with one eligible asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssetOutcome {
    /// A compressed asset was emitted
    Emitted {
        /// Name of the derived asset
        filename: String,
        /// Size of the original in bytes
        original_size: usize,
        /// Size of the derived asset in bytes
        compressed_size: usize,
        /// Whether the original was deleted
        original_deleted: bool,
    },
    /// The compressed form was larger than the ratio policy allows
    Rejected {
        /// Size of the original in bytes
        original_size: usize,
        /// Size of the compressed form in bytes
        compressed_size: usize,
    },
    /// The original was smaller than the threshold
    BelowThreshold {
        /// Size of the original in bytes
        size: usize,
    },
    /// The original already links to a derived asset
    AlreadyProcessed {
        /// The linked derived asset
        related: String,
    },
    /// The asset's task failed; the error is in [`PassReport::errors`]
    Failed,
}

impl AssetOutcome {
    /// Short label for display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Emitted { .. } => "emitted",
            Self::Rejected { .. } => "rejected",
            Self::BelowThreshold { .. } => "below threshold",
            Self::AlreadyProcessed { .. } => "already processed",
            Self::Failed => "failed",
        }
    }

    /// Check if a derived asset was emitted
    pub fn is_emitted(&self) -> bool {
        matches!(self, Self::Emitted { .. })
    }
}

/// Failure attached to a single asset
#[derive(Debug, Serialize)]
pub struct AssetError {
    /// Name of the asset
    pub asset: String,
    /// What went wrong
    pub error: Error,
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.asset, self.error)
    }
}

/// Result of one compression pass
#[derive(Debug, Default, Serialize)]
pub struct PassReport {
    /// Outcome per eligible asset
    pub outcomes: BTreeMap<String, AssetOutcome>,
    /// Per-asset failures
    pub errors: Vec<AssetError>,
    /// Aggregated statistics
    pub stats: PassStats,
}

impl PassReport {
    /// Outcome for one asset, if it was eligible
    pub fn outcome(&self, name: &str) -> Option<&AssetOutcome> {
        self.outcomes.get(name)
    }

    /// Check whether any asset failed
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Pairs of (original, derived) names emitted in this pass
    pub fn emitted(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|(name, outcome)| match outcome {
            AssetOutcome::Emitted { filename, .. } => Some((name.as_str(), filename.as_str())),
            _ => None,
        })
    }

    /// Names of originals deleted in this pass
    pub fn deleted(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(|(name, outcome)| match outcome {
            AssetOutcome::Emitted {
                original_deleted: true,
                ..
            } => Some(name.as_str()),
            _ => None,
        })
    }

    pub(crate) fn record(
        &mut self,
        name: String,
        result: Result<AssetOutcome, Error>,
        compressed: bool,
        cache_hit: bool,
    ) {
        let stats = &mut self.stats;
        stats.assets_matched += 1;
        stats.compressions += u64::from(compressed);
        stats.cache_hits += u64::from(cache_hit);

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(error) => {
                self.errors.push(AssetError {
                    asset: name.clone(),
                    error,
                });
                AssetOutcome::Failed
            }
        };

        match &outcome {
            AssetOutcome::Emitted {
                original_size,
                compressed_size,
                ..
            } => {
                stats.assets_emitted += 1;
                stats.bytes_in += *original_size as u64;
                stats.bytes_out += *compressed_size as u64;
            }
            AssetOutcome::Rejected { .. } => stats.assets_rejected += 1,
            AssetOutcome::BelowThreshold { .. } | AssetOutcome::AlreadyProcessed { .. } => {
                stats.assets_skipped += 1;
            }
            AssetOutcome::Failed => stats.assets_failed += 1,
        }

        self.outcomes.insert(name, outcome);
    }
}
