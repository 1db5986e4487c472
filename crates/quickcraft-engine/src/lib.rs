//! # Quickcraft Engine
//!
//! Host-side plumbing around the recommendation engine.
//!
//! This crate ties the pure ranking to the outside world:
//! - Engine configuration file
//! - Scoring tables loading (TOML, RON)
//! - Recipe catalog loading (TOML, JSON) with hot reload
//! - Tracing initialisation
//! - The `RecommendationEngine` facade

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod catalog_loader;
pub mod config;
pub mod engine;
pub mod logging;
pub mod tables_loader;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::catalog_loader::*;
    pub use crate::config::*;
    pub use crate::engine::*;
    pub use crate::logging::*;
    pub use crate::tables_loader::*;
}

pub use prelude::*;
