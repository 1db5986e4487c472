//! # Quickcraft Gameplay
//!
//! Recipe recommendation and ranking for the quick-craft panel.
//!
//! This crate provides:
//! - Recipe data model and flexible ingredient groups
//! - Resource snapshots
//! - Scoring configuration tables
//! - Craftability evaluation
//! - Recipe scoring
//! - Filter and rank pipeline
//! - Reactive quick-craft model
//!
//! Everything here is pure and synchronous. Loading files and wiring
//! logging is left to the host.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod craftability;
pub mod inventory;
pub mod quick_craft;
pub mod ranking;
pub mod recipe;
pub mod scoring;
pub mod tables;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::craftability::*;
    pub use crate::inventory::*;
    pub use crate::quick_craft::*;
    pub use crate::ranking::*;
    pub use crate::recipe::*;
    pub use crate::scoring::*;
    pub use crate::tables::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use quickcraft_common::RecipeId;

    #[test]
    fn test_default_tables_rank_starter_tools_first() {
        let catalog = vec![
            Recipe::builder(RecipeId::new(1), "Rope")
                .category(RecipeCategory::Material)
                .material("Plant Fiber", 3)
                .output("Rope", 1)
                .build()
                .expect("valid recipe"),
            Recipe::builder(RecipeId::new(2), "Stone Hatchet")
                .category(RecipeCategory::Tool)
                .material("Wood", 3)
                .material("Stone", 2)
                .output("Stone Hatchet", 1)
                .build()
                .expect("valid recipe"),
        ];
        let tables = ScoringTables::default();
        let inventory = ResourceSnapshot::new()
            .with("Plant Fiber", 30)
            .with("Wood", 3)
            .with("Stone", 2);
        let ctx = ScoringContext::new(&inventory, &tables);

        let ranked = rank_recipes(&catalog, &RankQuery::new(), &ctx);
        assert_eq!(ranked[0].name, "Stone Hatchet");
    }

    #[test]
    fn test_breakdown_serializes() {
        let recipe = Recipe::builder(RecipeId::new(3), "Torch")
            .category("Tool")
            .material("Wood", 2)
            .output("Torch", 1)
            .build()
            .expect("valid recipe");
        let tables = ScoringTables::default();
        let inventory = ResourceSnapshot::new().with("Wood", 2);
        let ctx = ScoringContext::new(&inventory, &tables);

        let breakdown = score_breakdown(&recipe, &ctx);
        let json = serde_json::to_string(&breakdown).expect("serialize breakdown");
        let back: ScoreBreakdown = serde_json::from_str(&json).expect("deserialize breakdown");
        assert!((back.total() - breakdown.total()).abs() < 1e-9);
        assert_eq!(back.craftability.can_craft_now, breakdown.craftability.can_craft_now);
    }
}
