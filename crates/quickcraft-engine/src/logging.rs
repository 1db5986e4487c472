//! Tracing subscriber setup.

use thiserror::Error;
use tracing::debug;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{EngineConfig, LogFormat};

/// Logging setup errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A filter directive did not parse.
    #[error("Invalid log filter directive '{directive}': {reason}")]
    InvalidFilter {
        /// Offending directive
        directive: String,
        /// Parser message
        reason: String,
    },
}

/// Parses comma-separated filter directives on top of `RUST_LOG`.
pub fn build_filter(directives: &str) -> Result<EnvFilter, LoggingError> {
    directives
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .try_fold(EnvFilter::from_default_env(), |filter, raw| {
            let directive = raw
                .parse::<Directive>()
                .map_err(|e| LoggingError::InvalidFilter {
                    directive: raw.to_string(),
                    reason: e.to_string(),
                })?;
            Ok(filter.add_directive(directive))
        })
}

/// Installs the global tracing subscriber.
///
/// Returns `Ok(false)` if a subscriber was already installed, which leaves
/// the existing one in place.
pub fn init_logging(directives: &str, format: LogFormat) -> Result<bool, LoggingError> {
    let filter = build_filter(directives)?;

    let (text, json) = match format {
        LogFormat::Text => (Some(fmt::layer()), None),
        LogFormat::Json => (None, Some(fmt::layer().json())),
    };

    let installed = tracing_subscriber::registry()
        .with(text)
        .with(json)
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        debug!("Logging initialised with '{}'", directives);
    }
    Ok(installed)
}

/// Installs the global tracing subscriber from engine configuration.
pub fn init_from_config(config: &EngineConfig) -> Result<bool, LoggingError> {
    init_logging(&config.log_filter, config.log_format)
}
