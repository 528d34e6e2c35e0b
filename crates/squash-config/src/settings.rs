//! Serializable subset of the plugin options
//!
//! Functions cannot live in a file, so custom algorithms, dynamic filenames
//! and per-name deletion predicates are only available through
//! [`PluginOptions::builder`](crate::PluginOptions::builder).

use crate::{ConfigError, ConfigResult, DeleteOriginalAssets, PluginOptions, Rule, RuleSet};
use serde::{Deserialize, Serialize};
use squash_types::{CompressionOptions, MinRatio};

/// A rule as written in a configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSetting {
    /// Name prefix
    Prefix(String),
    /// Regular expression
    Regex {
        /// The pattern
        regex: String,
    },
}

impl RuleSetting {
    fn into_rule(self) -> ConfigResult<Rule> {
        match self {
            Self::Prefix(prefix) => Ok(Rule::Prefix(prefix)),
            Self::Regex { regex } => Rule::regex(&regex),
        }
    }
}

/// Deletion policy as written in a configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeleteSetting {
    /// `true` deletes originals, `false` keeps them
    Flag(bool),
    /// Named mode; only `keep-source-map` is recognized
    Mode(String),
}

impl Default for DeleteSetting {
    fn default() -> Self {
        Self::Flag(false)
    }
}

impl DeleteSetting {
    /// Mode string selecting [`DeleteOriginalAssets::KeepSourceMap`]
    pub const KEEP_SOURCE_MAP: &'static str = "keep-source-map";

    fn into_policy(self) -> ConfigResult<DeleteOriginalAssets> {
        match self {
            Self::Flag(delete) => Ok(delete.into()),
            Self::Mode(mode) if mode == Self::KEEP_SOURCE_MAP => {
                Ok(DeleteOriginalAssets::KeepSourceMap)
            }
            Self::Mode(mode) => Err(ConfigError::invalid_value(
                "delete_original_assets",
                format!(
                    "expected true, false or \"{}\", got \"{}\"",
                    Self::KEEP_SOURCE_MAP,
                    mode
                ),
            )),
        }
    }
}

/// File and environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `test` rules
    pub test: Vec<RuleSetting>,
    /// `include` rules
    pub include: Vec<RuleSetting>,
    /// `exclude` rules
    pub exclude: Vec<RuleSetting>,
    /// Well-known algorithm name
    pub algorithm: String,
    /// Tuning merged over the algorithm defaults
    pub compression_options: CompressionOptions,
    /// Static filename template; the algorithm default when absent
    pub filename: Option<String>,
    /// Minimum original size in bytes
    pub threshold: usize,
    /// Maximum acceptable compressed/original ratio
    pub min_ratio: f64,
    /// Deletion policy
    pub delete_original_assets: DeleteSetting,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            test: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            algorithm: "gzip".to_string(),
            compression_options: CompressionOptions::new(),
            filename: None,
            threshold: 0,
            min_ratio: MinRatio::DEFAULT,
            delete_original_assets: DeleteSetting::default(),
        }
    }
}

fn rule_set(settings: Vec<RuleSetting>) -> ConfigResult<RuleSet> {
    settings
        .into_iter()
        .map(RuleSetting::into_rule)
        .collect::<ConfigResult<Vec<_>>>()
        .map(RuleSet::from)
}

impl Settings {
    /// Check every value without building options
    pub fn validate(&self) -> ConfigResult<()> {
        self.clone().into_options().map(|_| ())
    }

    /// Turn the settings into plugin options
    pub fn into_options(self) -> ConfigResult<PluginOptions> {
        let mut builder = PluginOptions::builder()
            .test(rule_set(self.test)?)
            .include(rule_set(self.include)?)
            .exclude(rule_set(self.exclude)?)
            .algorithm(self.algorithm.as_str())
            .compression_options(self.compression_options)
            .threshold(self.threshold)
            .min_ratio(self.min_ratio)
            .delete_original_assets(self.delete_original_assets.into_policy()?);
        if let Some(filename) = self.filename {
            builder = builder.filename(filename);
        }
        builder.build()
    }
}
