//! Scoring tables loading.
//!
//! Tables files are TOML or RON, picked by extension. Missing fields fall
//! back to the built-in tables, so a file only needs the values it
//! overrides:
//!
//! ```toml
//! version = "1.0.0"
//!
//! [tables.category_weights]
//! Tool = 30.0
//! ```

use quickcraft_common::{QuickcraftError, SchemaVersion};
use quickcraft_gameplay::{ScoringTables, TablesError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while loading scoring tables.
#[derive(Debug, Error)]
pub enum TablesLoadError {
    /// Failed to read file.
    #[error("Failed to read tables file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse tables TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Failed to parse RON.
    #[error("Failed to parse tables RON: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// Failed to serialize.
    #[error("Failed to serialize tables: {0}")]
    Serialize(String),

    /// Extension is neither `.toml` nor `.ron`.
    #[error("Unsupported tables format: {0}")]
    UnsupportedFormat(PathBuf),

    /// File written by an incompatible version.
    #[error("Tables file version {actual} is not readable (expected {expected})")]
    VersionMismatch {
        /// Version this build reads
        expected: SchemaVersion,
        /// Version found in the file
        actual: SchemaVersion,
    },

    /// Contents failed validation.
    #[error("Invalid scoring tables: {0}")]
    Invalid(#[from] TablesError),
}

/// Result type for tables loading.
pub type TablesLoadResult<T> = Result<T, TablesLoadError>;

impl From<TablesLoadError> for QuickcraftError {
    fn from(err: TablesLoadError) -> Self {
        match err {
            TablesLoadError::ReadError(e) => Self::Io(e),
            TablesLoadError::VersionMismatch { expected, actual } => {
                Self::VersionMismatch { expected, actual }
            },
            TablesLoadError::Invalid(e) => Self::Validation(e.to_string()),
            other => Self::Serialization(other.to_string()),
        }
    }
}

/// On-disk layout of a tables file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesFile {
    /// File format version.
    #[serde(default = "default_version")]
    pub version: SchemaVersion,
    /// Table contents.
    #[serde(default)]
    pub tables: ScoringTables,
}

fn default_version() -> SchemaVersion {
    SchemaVersion::SCORING_TABLES
}

impl TablesFile {
    /// Wraps tables at the current version.
    #[must_use]
    pub fn new(tables: ScoringTables) -> Self {
        Self {
            version: SchemaVersion::SCORING_TABLES,
            tables,
        }
    }

    /// Checks the version and table contents.
    pub fn validate(&self) -> TablesLoadResult<()> {
        if !SchemaVersion::SCORING_TABLES.can_read(&self.version) {
            return Err(TablesLoadError::VersionMismatch {
                expected: SchemaVersion::SCORING_TABLES,
                actual: self.version,
            });
        }
        self.tables.validate()?;
        Ok(())
    }
}

enum TablesFormat {
    Toml,
    Ron,
}

fn format_of(path: &Path) -> TablesLoadResult<TablesFormat> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(TablesFormat::Toml),
        Some("ron") => Ok(TablesFormat::Ron),
        _ => Err(TablesLoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Parses a tables file from a string.
pub fn parse_tables(content: &str, path: &Path) -> TablesLoadResult<ScoringTables> {
    let file: TablesFile = match format_of(path)? {
        TablesFormat::Toml => toml::from_str(content)?,
        TablesFormat::Ron => ron::from_str(content)?,
    };
    file.validate()?;
    Ok(file.tables)
}

/// Loads and validates scoring tables from `path`.
pub fn load_tables(path: impl AsRef<Path>) -> TablesLoadResult<ScoringTables> {
    let path = path.as_ref();
    debug!("Loading scoring tables: {:?}", path);

    let content = fs::read_to_string(path)?;
    let tables = parse_tables(&content, path)?;

    info!(
        "Loaded scoring tables from {:?} ({} category weights, {} upgrade chains, {} tiers)",
        path,
        tables.category_weights.len(),
        tables.upgrade_chains.len(),
        tables.resource_tiers.len()
    );
    Ok(tables)
}

/// Writes scoring tables to `path` in the format given by its extension.
pub fn save_tables(tables: &ScoringTables, path: impl AsRef<Path>) -> TablesLoadResult<()> {
    let path = path.as_ref();
    let file = TablesFile::new(tables.clone());

    let content = match format_of(path)? {
        TablesFormat::Toml => toml::to_string_pretty(&file)
            .map_err(|e| TablesLoadError::Serialize(e.to_string()))?,
        TablesFormat::Ron => ron::ser::to_string_pretty(&file, ron::ser::PrettyConfig::default())
            .map_err(|e| TablesLoadError::Serialize(e.to_string()))?,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;

    info!("Saved scoring tables to {:?}", path);
    Ok(())
}
