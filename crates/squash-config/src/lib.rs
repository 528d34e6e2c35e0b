//! Options and configuration loading for squash
//!
//! [`PluginOptions`] is the immutable configuration of one compression pass.
//! It is either built in code, which allows custom algorithms, dynamic
//! filenames and deletion predicates, or loaded as [`Settings`] from
//! YAML/TOML/JSON files with `SQUASH__*` environment overrides.
//!
//! # Examples
//!
//! ```rust
//! use squash_config::{DeleteOriginalAssets, PluginOptions, Rule};
//!
//! let options = PluginOptions::builder()
//!     .test(Rule::regex(r"\.(js|css)$")?)
//!     .algorithm("brotliCompress")
//!     .threshold(1024)
//!     .delete_original_assets(DeleteOriginalAssets::KeepSourceMap)
//!     .build()?;
//!
//! assert_eq!(options.filename.as_static(), Some("[path][base].br"));
//! # Ok::<(), squash_config::ConfigError>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod builder;
pub mod error;
pub mod loader;
pub mod options;
pub mod rules;
pub mod settings;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, ENV_PREFIX};
pub use options::{
    DeleteOriginalAssets, FilenameFn, FilenameTemplate, PluginOptions, PluginOptionsBuilder,
};
pub use rules::{NamePredicate, Rule, RuleSet};
pub use settings::{DeleteSetting, RuleSetting, Settings};
