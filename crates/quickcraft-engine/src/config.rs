//! Engine configuration.
//!
//! Provides paths to the data files, the quick-craft grid size and logging
//! settings. Configuration can be loaded from and saved to a TOML file.

use quickcraft_common::QuickcraftError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog_loader::DEFAULT_RECIPE_PATH;

/// Configuration file name.
pub const CONFIG_FILE: &str = "quickcraft.toml";

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV_VAR: &str = "QUICKCRAFT_CONFIG";

/// Largest accepted grid size.
pub const MAX_GRID_SIZE: usize = 64;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the file.
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize TOML.
    #[error("Failed to serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for QuickcraftError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Serialization(other.to_string()),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Data ===
    /// Scoring tables file (`.toml` or `.ron`). `None` uses built-in tables.
    pub tables_path: Option<PathBuf>,
    /// Directory scanned for recipe catalog files.
    pub recipe_dir: PathBuf,
    /// Reload catalog files when they change on disk.
    pub hot_reload: bool,

    // === Quick Craft ===
    /// Number of slots in the quick-craft grid.
    pub grid_size: usize,

    // === Logging ===
    /// Tracing filter directives, comma separated.
    pub log_filter: String,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tables_path: None,
            recipe_dir: PathBuf::from(DEFAULT_RECIPE_PATH),
            hot_reload: cfg!(debug_assertions),

            grid_size: quickcraft_gameplay::DEFAULT_GRID_SIZE,

            log_filter: "quickcraft=info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default file location.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to load config file {}: {e}", path.display());
                Self::default()
            },
        }
    }

    /// Load configuration from a specific path, reporting failures.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let mut config: Self = toml::from_str(&contents)?;
        config.validate();
        Ok(config)
    }

    /// Save configuration to the default file location.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(Self::config_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Default configuration file path: `$QUICKCRAFT_CONFIG`, else
    /// `quickcraft.toml` in the working directory.
    #[must_use]
    pub fn config_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }

    /// Clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.grid_size = self.grid_size.clamp(1, MAX_GRID_SIZE);

        if self.log_filter.trim().is_empty() {
            self.log_filter = Self::default().log_filter;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.grid_size, 8);
        assert_eq!(config.recipe_dir, PathBuf::from("assets/recipes"));
        assert!(config.tables_path.is_none());
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();

        config.grid_size = 0;
        config.log_filter = "   ".to_string();
        config.validate();
        assert_eq!(config.grid_size, 1);
        assert_eq!(config.log_filter, "quickcraft=info");

        config.grid_size = 1000;
        config.validate();
        assert_eq!(config.grid_size, MAX_GRID_SIZE);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("quickcraft.toml");

        let mut config = EngineConfig::default();
        config.grid_size = 12;
        config.hot_reload = true;
        config.tables_path = Some(PathBuf::from("data/tables.ron"));
        config.log_format = LogFormat::Json;

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = EngineConfig::load_from("/nonexistent/path/quickcraft.toml");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_invalid_file_falls_back() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("quickcraft.toml");
        fs::write(&config_path, "grid_size = \"many\"").expect("write config");

        assert!(matches!(
            EngineConfig::try_load_from(&config_path),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(EngineConfig::load_from(&config_path), EngineConfig::default());
    }

    #[test]
    fn test_config_partial_file() {
        let config: EngineConfig =
            toml::from_str("grid_size = 4\nlog_format = \"json\"").expect("parse config");
        assert_eq!(config.grid_size, 4);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.recipe_dir, PathBuf::from(DEFAULT_RECIPE_PATH));
    }
}
