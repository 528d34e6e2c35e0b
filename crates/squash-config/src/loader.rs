//! Configuration loader utilities

use crate::{ConfigBuilder, ConfigError, ConfigResult, Settings};
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides, e.g. `SQUASH__THRESHOLD`
pub const ENV_PREFIX: &str = "SQUASH";

/// Configuration loader with common loading patterns
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from the first default file found in the working directory
    pub fn load_default() -> ConfigResult<Settings> {
        let mut builder = ConfigBuilder::new();
        if let Some(path) = Self::default_config_paths()
            .into_iter()
            .find(|path| path.exists())
        {
            builder = builder.add_source_file(path);
        }
        builder.add_env_prefix(ENV_PREFIX).build()
    }

    /// Load settings from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Settings> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Configuration file not found",
                ),
            });
        }

        ConfigBuilder::new()
            .add_source_file(path)
            .add_env_prefix(ENV_PREFIX)
            .build()
    }

    /// Save settings to a file, format taken from the extension
    pub fn save_to_file<P: AsRef<Path>>(settings: &Settings, path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = Self::render(settings, path.extension().and_then(|ext| ext.to_str()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Render settings as YAML (default), TOML or JSON
    pub fn render(settings: &Settings, format: Option<&str>) -> ConfigResult<String> {
        Ok(match format {
            Some("toml") => toml::to_string_pretty(settings)?,
            Some("json") => serde_json::to_string_pretty(settings)?,
            _ => serde_yaml::to_string(settings)?,
        })
    }

    /// Write the default settings to a file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> ConfigResult<()> {
        Self::save_to_file(&Settings::default(), path)
    }

    /// Default configuration file names in order of preference
    pub fn default_config_paths() -> Vec<PathBuf> {
        ["squash.yaml", "squash.yml", "squash.toml", "squash.json"]
            .into_iter()
            .map(PathBuf::from)
            .collect()
    }
}
