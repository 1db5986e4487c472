//! Static configuration tables for recipe scoring.
//!
//! The scorer carries no game content of its own; every item name and
//! weight it looks at comes from [`ScoringTables`], which hosts can load
//! from a file and override per game mode.

use quickcraft_common::QuickcraftError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::recipe::RecipeCategory;

/// Weight used for categories missing from the table.
pub const DEFAULT_CATEGORY_WEIGHT: f64 = 8.0;

/// Tier used for materials missing from the tier table.
pub const DEFAULT_RESOURCE_TIER: u8 = 1;

/// Highest valid resource tier.
pub const MAX_RESOURCE_TIER: u8 = 4;

/// Table validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum TablesError {
    /// Tier outside 1..=4
    #[error("Resource tier for '{item}' must be 1..={max}, got {tier}")]
    TierOutOfRange {
        /// Item name
        item: String,
        /// Offending tier
        tier: u8,
        /// Highest allowed tier
        max: u8,
    },
    /// Upgrade chain without upgrades
    #[error("Upgrade chain for '{0}' is empty")]
    EmptyUpgradeChain(String),
    /// Weight is negative or not finite
    #[error("Category weight for '{category}' is invalid: {weight}")]
    InvalidWeight {
        /// Category tag
        category: String,
        /// Offending weight
        weight: f64,
    },
}

/// Result type for table validation.
pub type TablesResult<T> = Result<T, TablesError>;

impl From<TablesError> for QuickcraftError {
    fn from(err: TablesError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// An ordered succession of upgrades starting from a basic tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeChain {
    /// Tool the player is expected to already own.
    pub basic_tool: String,
    /// Successive upgrades, nearest first.
    pub upgrades: Vec<String>,
}

impl UpgradeChain {
    /// Creates a new chain.
    #[must_use]
    pub fn new<I, S>(basic_tool: impl Into<String>, upgrades: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            basic_tool: basic_tool.into(),
            upgrades: upgrades.into_iter().map(Into::into).collect(),
        }
    }

    /// Position of an item within the upgrade list.
    #[must_use]
    pub fn position_of(&self, item: &str) -> Option<usize> {
        self.upgrades.iter().position(|upgrade| upgrade == item)
    }
}

/// Configuration tables consumed by the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTables {
    /// Priority weight per category.
    pub category_weights: HashMap<RecipeCategory, f64>,
    /// Weight for categories not in `category_weights`.
    pub default_category_weight: f64,
    /// Upgrade chains in declaration order; the first match wins.
    pub upgrade_chains: Vec<UpgradeChain>,
    /// Resource tier (1..=4) per material name.
    pub resource_tiers: HashMap<String, u8>,
    /// Items boosted hardest when craftable and not yet owned.
    pub critical_first_items: HashSet<String>,
    /// Tools boosted when craftable and not yet owned.
    pub survival_tools: HashSet<String>,
}

impl Default for ScoringTables {
    fn default() -> Self {
        let category_weights = [
            (RecipeCategory::Tool, 25.0),
            (RecipeCategory::Weapon, 22.0),
            (RecipeCategory::RangedWeapon, 20.0),
            (RecipeCategory::Armor, 18.0),
            (RecipeCategory::Consumable, 15.0),
            (RecipeCategory::Ammunition, 12.0),
            (RecipeCategory::Placeable, 10.0),
            (RecipeCategory::Material, 5.0),
        ]
        .into_iter()
        .collect();

        let upgrade_chains = vec![
            UpgradeChain::new(
                "Wooden Pickaxe",
                ["Stone Pickaxe", "Iron Pickaxe", "Steel Pickaxe"],
            ),
            UpgradeChain::new(
                "Wooden Hatchet",
                ["Stone Hatchet", "Iron Hatchet", "Steel Hatchet"],
            ),
            UpgradeChain::new("Rock", ["Stone Hatchet", "Stone Pickaxe"]),
            UpgradeChain::new("Wooden Spear", ["Stone Spear", "Reed Harpoon"]),
            UpgradeChain::new("Bone Knife", ["Bush Knife"]),
            UpgradeChain::new("Torch", ["Flashlight"]),
        ];

        let resource_tiers = [
            ("Wood", 1),
            ("Stone", 1),
            ("Plant Fiber", 1),
            ("Common Reed Stalk", 1),
            ("Cloth", 2),
            ("Animal Bone", 2),
            ("Animal Leather", 2),
            ("Charcoal", 2),
            ("Rope", 2),
            ("Metal Ore", 3),
            ("Metal Fragments", 3),
            ("Tallow", 3),
            ("Sulfur", 3),
            ("Gunpowder", 4),
            ("Steel Ingot", 4),
        ]
        .into_iter()
        .map(|(item, tier)| (item.to_string(), tier))
        .collect();

        let critical_first_items = [
            "Stone Hatchet",
            "Stone Pickaxe",
            "Camp Fire",
            "Torch",
            "Sleeping Bag",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let survival_tools = [
            "Wooden Spear",
            "Stone Spear",
            "Bone Knife",
            "Hunting Bow",
            "Bandage",
            "Reed Water Bottle",
            "Wooden Storage Box",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            category_weights,
            default_category_weight: DEFAULT_CATEGORY_WEIGHT,
            upgrade_chains,
            resource_tiers,
            critical_first_items,
            survival_tools,
        }
    }
}

impl ScoringTables {
    /// Tables with no content: every lookup falls back to its default.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            category_weights: HashMap::new(),
            default_category_weight: DEFAULT_CATEGORY_WEIGHT,
            upgrade_chains: Vec::new(),
            resource_tiers: HashMap::new(),
            critical_first_items: HashSet::new(),
            survival_tools: HashSet::new(),
        }
    }

    /// Priority weight for a category.
    #[must_use]
    pub fn category_weight(&self, category: &RecipeCategory) -> f64 {
        let weight = match category {
            RecipeCategory::Other(tag) => self.category_weights.get(&RecipeCategory::parse(tag)),
            known => self.category_weights.get(known),
        };
        weight.copied().unwrap_or(self.default_category_weight)
    }

    /// Resource tier of a material.
    #[must_use]
    pub fn tier(&self, item: &str) -> u8 {
        self.resource_tiers
            .get(item)
            .copied()
            .unwrap_or(DEFAULT_RESOURCE_TIER)
    }

    /// Returns true if the item is flagged as a critical first item.
    #[must_use]
    pub fn is_critical_first(&self, item: &str) -> bool {
        self.critical_first_items.contains(item)
    }

    /// Returns true if the item is flagged as a survival-essential tool.
    #[must_use]
    pub fn is_survival_tool(&self, item: &str) -> bool {
        self.survival_tools.contains(item)
    }

    /// Upgrade chains in declaration order.
    #[must_use]
    pub fn upgrade_chains(&self) -> &[UpgradeChain] {
        &self.upgrade_chains
    }

    /// Overrides one category weight.
    #[must_use]
    pub fn with_category_weight(mut self, category: RecipeCategory, weight: f64) -> Self {
        self.category_weights.insert(category.normalized(), weight);
        self
    }

    /// Appends an upgrade chain after the existing ones.
    #[must_use]
    pub fn with_upgrade_chain(mut self, chain: UpgradeChain) -> Self {
        self.upgrade_chains.push(chain);
        self
    }

    /// Sets one resource tier.
    #[must_use]
    pub fn with_tier(mut self, item: impl Into<String>, tier: u8) -> Self {
        self.resource_tiers.insert(item.into(), tier);
        self
    }

    /// Flags an item as a critical first item.
    #[must_use]
    pub fn with_critical_first(mut self, item: impl Into<String>) -> Self {
        self.critical_first_items.insert(item.into());
        self
    }

    /// Flags an item as a survival-essential tool.
    #[must_use]
    pub fn with_survival_tool(mut self, item: impl Into<String>) -> Self {
        self.survival_tools.insert(item.into());
        self
    }

    /// Checks table contents after loading.
    pub fn validate(&self) -> TablesResult<()> {
        let weights = self
            .category_weights
            .iter()
            .map(|(category, weight)| (category.to_string(), *weight))
            .chain(std::iter::once((
                "default".to_string(),
                self.default_category_weight,
            )));
        for (category, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(TablesError::InvalidWeight { category, weight });
            }
        }

        for (item, &tier) in &self.resource_tiers {
            if !(DEFAULT_RESOURCE_TIER..=MAX_RESOURCE_TIER).contains(&tier) {
                return Err(TablesError::TierOutOfRange {
                    item: item.clone(),
                    tier,
                    max: MAX_RESOURCE_TIER,
                });
            }
        }

        if let Some(chain) = self.upgrade_chains.iter().find(|c| c.upgrades.is_empty()) {
            return Err(TablesError::EmptyUpgradeChain(chain.basic_tool.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_are_valid() {
        assert_eq!(ScoringTables::default().validate(), Ok(()));
    }

    #[test]
    fn test_category_weight_defaults() {
        let tables = ScoringTables::default();
        assert_eq!(tables.category_weight(&RecipeCategory::Tool), 25.0);
        assert_eq!(tables.category_weight(&RecipeCategory::Material), 5.0);
        assert_eq!(
            tables.category_weight(&RecipeCategory::Other("Trinket".into())),
            DEFAULT_CATEGORY_WEIGHT
        );
    }

    #[test]
    fn test_category_weight_folds_known_other_tag() {
        let tables = ScoringTables::default();
        assert_eq!(
            tables.category_weight(&RecipeCategory::Other("Tool".into())),
            tables.category_weight(&RecipeCategory::Tool)
        );

        let tables = ScoringTables::empty()
            .with_category_weight(RecipeCategory::Other("armour".into()), 40.0);
        assert_eq!(tables.category_weight(&RecipeCategory::Armor), 40.0);
    }

    #[test]
    fn test_tier_default() {
        let tables = ScoringTables::default();
        assert_eq!(tables.tier("Metal Fragments"), 3);
        assert_eq!(tables.tier("Unobtainium"), DEFAULT_RESOURCE_TIER);
    }

    #[test]
    fn test_empty_tables_fall_back() {
        let tables = ScoringTables::empty();
        assert_eq!(tables.category_weight(&RecipeCategory::Tool), 8.0);
        assert!(tables.upgrade_chains().is_empty());
        assert!(!tables.is_critical_first("Torch"));
    }

    #[test]
    fn test_chain_position() {
        let chain = UpgradeChain::new("Wooden Pickaxe", ["Stone Pickaxe", "Iron Pickaxe"]);
        assert_eq!(chain.position_of("Iron Pickaxe"), Some(1));
        assert_eq!(chain.position_of("Wooden Pickaxe"), None);
    }

    #[test]
    fn test_validate_rejects_bad_tier() {
        let tables = ScoringTables::empty().with_tier("Stardust", 5);
        assert!(matches!(
            tables.validate(),
            Err(TablesError::TierOutOfRange { tier: 5, .. })
        ));

        let tables = ScoringTables::empty().with_tier("Dust", 0);
        assert!(tables.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_chain() {
        let tables = ScoringTables::empty()
            .with_upgrade_chain(UpgradeChain::new("Rock", Vec::<String>::new()));
        assert_eq!(
            tables.validate(),
            Err(TablesError::EmptyUpgradeChain("Rock".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_bad_weight() {
        let tables = ScoringTables::empty().with_category_weight(RecipeCategory::Tool, f64::NAN);
        assert!(matches!(
            tables.validate(),
            Err(TablesError::InvalidWeight { .. })
        ));

        let tables = ScoringTables::empty().with_category_weight(RecipeCategory::Tool, -1.0);
        assert!(tables.validate().is_err());
    }

    #[test]
    fn test_error_converts_to_common() {
        let err: QuickcraftError = TablesError::EmptyUpgradeChain("Rock".to_string()).into();
        assert!(matches!(err, QuickcraftError::Validation(msg) if msg.contains("Rock")));
    }

    #[test]
    fn test_builder_overrides() {
        let tables = ScoringTables::empty()
            .with_critical_first("Camp Fire")
            .with_survival_tool("Bone Knife");
        assert!(tables.is_critical_first("Camp Fire"));
        assert!(tables.is_survival_tool("Bone Knife"));
        assert!(!tables.is_survival_tool("Camp Fire"));
    }
}
