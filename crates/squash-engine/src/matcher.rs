//! Asset eligibility by name

use squash_config::{PluginOptions, RuleSet};
use squash_types::AssetInfo;

/// Decides which assets a pass compresses
#[derive(Debug, Clone, Default)]
pub struct RuleMatcher {
    test: RuleSet,
    include: RuleSet,
    exclude: RuleSet,
}

impl RuleMatcher {
    /// Matcher over the rule sets of `options`
    pub fn new(options: &PluginOptions) -> Self {
        Self {
            test: options.test.clone(),
            include: options.include.clone(),
            exclude: options.exclude.clone(),
        }
    }

    /// Check the name against the rules alone.
    ///
    /// `test` and `include` must each have a matching rule unless empty, and
    /// no `exclude` rule may match.
    pub fn matches(&self, name: &str) -> bool {
        (self.test.is_empty() || self.test.matches_any(name))
            && (self.include.is_empty() || self.include.matches_any(name))
            && !self.exclude.matches_any(name)
    }

    /// Check whether an asset should be compressed
    pub fn eligible(&self, name: &str, info: &AssetInfo) -> bool {
        !info.compressed && self.matches(name)
    }
}
