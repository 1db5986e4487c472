//! # Quickcraft Common
//!
//! Common types shared by the Quickcraft crates.
//!
//! This crate provides:
//! - ID types (RecipeId)
//! - Version information for data files
//! - Top-level error type
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::version::*;
}

pub use prelude::*;
