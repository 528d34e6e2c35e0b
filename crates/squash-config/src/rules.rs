//! Name selection rules
//!
//! A rule is a string prefix, a regular expression or a predicate. A set
//! matches a name when any of its rules does.

use crate::{ConfigError, ConfigResult};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Predicate over asset names
pub type NamePredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A single selection rule
#[derive(Clone)]
pub enum Rule {
    /// Matches names starting with the string
    Prefix(String),
    /// Matches names the expression finds a match in
    Regex(Regex),
    /// Matches names the function accepts
    Predicate(NamePredicate),
}

impl Rule {
    /// Prefix rule
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    /// Regex rule, compiling `pattern`
    pub fn regex(pattern: &str) -> ConfigResult<Self> {
        Regex::new(pattern)
            .map(Self::Regex)
            .map_err(|e| ConfigError::invalid_value("regex", format!("{}: {}", pattern, e)))
    }

    /// Predicate rule
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }

    /// Check whether `name` satisfies this rule
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Prefix(prefix) => name.starts_with(prefix.as_str()),
            Self::Regex(regex) => regex.is_match(name),
            Self::Predicate(predicate) => predicate(name),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            Self::Regex(regex) => f.debug_tuple("Regex").field(&regex.as_str()).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for Rule {
    fn from(prefix: &str) -> Self {
        Self::prefix(prefix)
    }
}

impl From<String> for Rule {
    fn from(prefix: String) -> Self {
        Self::Prefix(prefix)
    }
}

impl From<Regex> for Rule {
    fn from(regex: Regex) -> Self {
        Self::Regex(regex)
    }
}

/// Any-of collection of rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule
    pub fn push(&mut self, rule: impl Into<Rule>) {
        self.rules.push(rule.into());
    }

    /// Check if the set has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check whether any rule matches `name`
    pub fn matches_any(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(name))
    }

    /// Iterate over the rules
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }
}

impl From<Rule> for RuleSet {
    fn from(rule: Rule) -> Self {
        Self { rules: vec![rule] }
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl From<Regex> for RuleSet {
    fn from(regex: Regex) -> Self {
        Rule::Regex(regex).into()
    }
}

impl From<&str> for RuleSet {
    fn from(prefix: &str) -> Self {
        Rule::prefix(prefix).into()
    }
}

impl<R: Into<Rule>> FromIterator<R> for RuleSet {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("js/", "js/app.js", true)]
    #[case("js/", "css/js/app.css", false)]
    #[case("app", "app.js", true)]
    #[case("", "anything", true)]
    fn test_prefix_is_anchored(#[case] prefix: &str, #[case] name: &str, #[case] expected: bool) {
        assert_eq!(Rule::prefix(prefix).matches(name), expected);
    }

    #[rstest]
    #[case(r"\.js$", "app.js", true)]
    #[case(r"\.js$", "app.json", false)]
    #[case(r"\.(css|svg)$", "img/logo.svg", true)]
    #[case(r"map", "app.js.map", true)]
    fn test_regex_rule(#[case] pattern: &str, #[case] name: &str, #[case] expected: bool) {
        assert_eq!(Rule::regex(pattern).unwrap().matches(name), expected);
    }

    #[test]
    fn test_invalid_regex() {
        let error = Rule::regex("(unclosed").unwrap_err();
        assert!(matches!(error, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_rule_set_is_any_of() {
        let set: RuleSet = vec![
            Rule::regex(r"\.css$").unwrap(),
            Rule::predicate(|name| name.ends_with(".html")),
        ]
        .into();

        assert_eq!(set.len(), 2);
        assert!(set.matches_any("site.css"));
        assert!(set.matches_any("index.html"));
        assert!(!set.matches_any("app.js"));
        assert!(!RuleSet::new().matches_any("app.js"));
    }
}
