//! Per-run plugin options

use crate::{ConfigError, ConfigResult, NamePredicate, Rule, RuleSet};
use squash_compression::AlgorithmSpec;
use squash_types::{CompressionOptions, MinRatio, PathData};
use std::fmt;
use std::sync::Arc;

/// Function computing a derived asset name from path data
pub type FilenameFn = Arc<dyn Fn(&PathData) -> String + Send + Sync>;

/// Template for the derived asset name
#[derive(Clone)]
pub enum FilenameTemplate {
    /// String with `[placeholder]` substitutions
    Static(String),
    /// Caller-supplied function with a stable identifier
    Dynamic {
        /// Identifier used wherever the template must be named across runs
        id: String,
        /// The naming function
        func: FilenameFn,
    },
}

impl FilenameTemplate {
    /// Dynamic template
    pub fn dynamic<F>(id: impl Into<String>, func: F) -> Self
    where
        F: Fn(&PathData) -> String + Send + Sync + 'static,
    {
        Self::Dynamic {
            id: id.into(),
            func: Arc::new(func),
        }
    }

    /// The template string, if static
    pub fn as_static(&self) -> Option<&str> {
        match self {
            Self::Static(template) => Some(template),
            Self::Dynamic { .. } => None,
        }
    }

    /// Stable text naming this template
    pub fn identity(&self) -> &str {
        match self {
            Self::Static(template) => template,
            Self::Dynamic { id, .. } => id,
        }
    }
}

impl fmt::Debug for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(template) => f.debug_tuple("Static").field(template).finish(),
            Self::Dynamic { id, .. } => f.debug_struct("Dynamic").field("id", id).finish(),
        }
    }
}

impl From<&str> for FilenameTemplate {
    fn from(template: &str) -> Self {
        Self::Static(template.to_string())
    }
}

impl From<String> for FilenameTemplate {
    fn from(template: String) -> Self {
        Self::Static(template)
    }
}

/// What happens to an original once its compressed form is emitted
#[derive(Clone, Default)]
pub enum DeleteOriginalAssets {
    /// Keep the original and link it to the derived asset
    #[default]
    Never,
    /// Delete the original
    Always,
    /// Detach the source map relation, then delete the original
    KeepSourceMap,
    /// Delete the originals the predicate accepts, keep and link the rest
    Predicate(NamePredicate),
}

impl DeleteOriginalAssets {
    /// Per-name predicate policy
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }
}

impl fmt::Debug for DeleteOriginalAssets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => f.write_str("Never"),
            Self::Always => f.write_str("Always"),
            Self::KeepSourceMap => f.write_str("KeepSourceMap"),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<bool> for DeleteOriginalAssets {
    fn from(delete: bool) -> Self {
        if delete {
            Self::Always
        } else {
            Self::Never
        }
    }
}

/// Immutable configuration of one compression pass
#[derive(Debug, Clone)]
pub struct PluginOptions {
    /// Names must match one of these, when any are given
    pub test: RuleSet,
    /// Names must match one of these, when any are given
    pub include: RuleSet,
    /// Names matching one of these are never compressed
    pub exclude: RuleSet,
    /// Named or custom algorithm
    pub algorithm: AlgorithmSpec,
    /// Tuning merged over the algorithm defaults
    pub compression_options: CompressionOptions,
    /// Derived asset name template
    pub filename: FilenameTemplate,
    /// Originals shorter than this many bytes are skipped
    pub threshold: usize,
    /// Results with a larger compressed/original ratio are not emitted
    pub min_ratio: MinRatio,
    /// Disposition of compressed originals
    pub delete_original_assets: DeleteOriginalAssets,
}

impl PluginOptions {
    /// Start building options
    pub fn builder() -> PluginOptionsBuilder {
        PluginOptionsBuilder::new()
    }
}

impl Default for PluginOptions {
    fn default() -> Self {
        let algorithm = AlgorithmSpec::default();
        Self {
            test: RuleSet::new(),
            include: RuleSet::new(),
            exclude: RuleSet::new(),
            filename: FilenameTemplate::from(algorithm.default_filename()),
            algorithm,
            compression_options: CompressionOptions::new(),
            threshold: 0,
            min_ratio: MinRatio::default(),
            delete_original_assets: DeleteOriginalAssets::Never,
        }
    }
}

/// Builder for [`PluginOptions`]
#[derive(Debug, Default)]
pub struct PluginOptionsBuilder {
    test: RuleSet,
    include: RuleSet,
    exclude: RuleSet,
    algorithm: AlgorithmSpec,
    compression_options: CompressionOptions,
    filename: Option<FilenameTemplate>,
    threshold: usize,
    min_ratio: Option<f64>,
    delete_original_assets: DeleteOriginalAssets,
}

impl PluginOptionsBuilder {
    /// Create a builder holding the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the `test` rules
    pub fn test(mut self, rules: impl Into<RuleSet>) -> Self {
        self.test = rules.into();
        self
    }

    /// Replace the `include` rules
    pub fn include(mut self, rules: impl Into<RuleSet>) -> Self {
        self.include = rules.into();
        self
    }

    /// Replace the `exclude` rules
    pub fn exclude(mut self, rules: impl Into<RuleSet>) -> Self {
        self.exclude = rules.into();
        self
    }

    /// Add a single `exclude` rule
    pub fn exclude_rule(mut self, rule: impl Into<Rule>) -> Self {
        self.exclude.push(rule);
        self
    }

    /// Select the algorithm
    pub fn algorithm(mut self, algorithm: impl Into<AlgorithmSpec>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Set the tuning options
    pub fn compression_options(mut self, options: CompressionOptions) -> Self {
        self.compression_options = options;
        self
    }

    /// Set the filename template
    pub fn filename(mut self, filename: impl Into<FilenameTemplate>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the size threshold in bytes
    pub fn threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the maximum acceptable ratio
    pub fn min_ratio(mut self, min_ratio: f64) -> Self {
        self.min_ratio = Some(min_ratio);
        self
    }

    /// Set the deletion policy
    pub fn delete_original_assets(mut self, policy: impl Into<DeleteOriginalAssets>) -> Self {
        self.delete_original_assets = policy.into();
        self
    }

    /// Validate and build the options
    pub fn build(self) -> ConfigResult<PluginOptions> {
        let min_ratio = match self.min_ratio {
            Some(ratio) => {
                MinRatio::new(ratio).map_err(|e| ConfigError::invalid_value("min_ratio", e))?
            }
            None => MinRatio::default(),
        };
        let filename = self
            .filename
            .unwrap_or_else(|| FilenameTemplate::from(self.algorithm.default_filename()));

        Ok(PluginOptions {
            test: self.test,
            include: self.include,
            exclude: self.exclude,
            algorithm: self.algorithm,
            compression_options: self.compression_options,
            filename,
            threshold: self.threshold,
            min_ratio,
            delete_original_assets: self.delete_original_assets,
        })
    }
}
