//! Recipe desirability scoring.
//!
//! The score is a pure function of the recipe, the resource snapshots and
//! the [`ScoringTables`]. Identical inputs always give a bit-identical score,
//! which the ranking relies on for stable ordering.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::trace;

use crate::craftability::{evaluate_resolved, resolve_materials, Craftability, ResolvedMaterial};
use crate::inventory::ResourceSnapshot;
use crate::recipe::{FlexibleGroupIndex, Recipe};
use crate::tables::ScoringTables;

/// Bonus for recipes craftable right now.
pub const CRAFTABLE_NOW_BONUS: f64 = 100.0;
/// Per-owned-item decay applied to the category weight.
pub const SCARCITY_DECAY: f64 = 0.6;
/// Bonus for a craftable, unowned critical first item.
pub const CRITICAL_FIRST_BONUS: f64 = 200.0;
/// Bonus for a craftable, unowned survival-essential tool.
pub const SURVIVAL_TOOL_BONUS: f64 = 150.0;
/// Upgrade bonus for the first step of a chain.
pub const UPGRADE_BASE_BONUS: f64 = 80.0;
/// Upgrade bonus lost per step further down the chain.
pub const UPGRADE_STEP_PENALTY: f64 = 15.0;
/// Per-material bonus when holding ten times the requirement.
pub const ABUNDANT_MATERIAL_BONUS: f64 = 5.0;
/// Per-material bonus when holding five times the requirement.
pub const PLENTIFUL_MATERIAL_BONUS: f64 = 2.0;
/// Bonus per resource tier level of each material.
pub const TIER_BONUS_PER_LEVEL: f64 = 3.0;
/// Bonus per output unit.
pub const OUTPUT_BONUS_PER_UNIT: u64 = 2;
/// Cap on the output bonus.
pub const OUTPUT_BONUS_CAP: u64 = 10;
/// Bonus for a blocked recipe at >= 75% craftability.
pub const ALMOST_CRAFTABLE_HIGH_BONUS: f64 = 15.0;
/// Bonus for a blocked recipe at >= 50% craftability.
pub const ALMOST_CRAFTABLE_LOW_BONUS: f64 = 8.0;
/// Bonus when a craft lands the owned count on a stack milestone.
pub const STACK_COMPLETION_BONUS: f64 = 5.0;
/// Owned counts that earn the stack completion bonus.
pub const STACK_MILESTONES: [u64; 3] = [10, 20, 50];

const ABUNDANT_FACTOR: u64 = 10;
const PLENTIFUL_FACTOR: u64 = 5;
const ALMOST_HIGH_RATIO: f64 = 0.75;
const ALMOST_LOW_RATIO: f64 = 0.5;

fn empty_snapshot() -> &'static ResourceSnapshot {
    static EMPTY: OnceLock<ResourceSnapshot> = OnceLock::new();
    EMPTY.get_or_init(ResourceSnapshot::new)
}

fn empty_groups() -> &'static FlexibleGroupIndex {
    static EMPTY: OnceLock<FlexibleGroupIndex> = OnceLock::new();
    EMPTY.get_or_init(FlexibleGroupIndex::new)
}

/// Everything a score depends on besides the recipe.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    /// Aggregated holdings; materials are checked against this.
    pub inventory: &'a ResourceSnapshot,
    /// Hotbar holdings, counted toward ownership only.
    pub hotbar: &'a ResourceSnapshot,
    /// Configuration tables.
    pub tables: &'a ScoringTables,
    /// Flexible ingredient metadata.
    pub groups: &'a FlexibleGroupIndex,
}

impl<'a> ScoringContext<'a> {
    /// Creates a context with an empty hotbar and no flexible groups.
    #[must_use]
    pub fn new(inventory: &'a ResourceSnapshot, tables: &'a ScoringTables) -> Self {
        Self {
            inventory,
            hotbar: empty_snapshot(),
            tables,
            groups: empty_groups(),
        }
    }

    /// Sets the hotbar snapshot.
    #[must_use]
    pub fn with_hotbar(mut self, hotbar: &'a ResourceSnapshot) -> Self {
        self.hotbar = hotbar;
        self
    }

    /// Sets the flexible group index.
    #[must_use]
    pub fn with_groups(mut self, groups: &'a FlexibleGroupIndex) -> Self {
        self.groups = groups;
        self
    }

    /// Inventory plus hotbar count of an item.
    #[must_use]
    pub fn owned(&self, item: &str) -> u32 {
        self.inventory
            .count(item)
            .saturating_add(self.hotbar.count(item))
    }

    /// Resolves and evaluates a recipe against this context.
    #[must_use]
    pub fn craftability(&self, recipe: &Recipe) -> Craftability {
        evaluate_resolved(&resolve_materials(recipe, self.inventory, self.groups))
    }
}

/// Every term of a recipe's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Craftability the score was computed from.
    pub craftability: Craftability,
    /// Inventory plus hotbar count of the output item.
    pub total_owned: u32,
    /// Craftable-now bonus.
    pub craftable_bonus: f64,
    /// `0.6 ^ total_owned`.
    pub scarcity_multiplier: f64,
    /// Critical-first or survival-tool bonus.
    pub survival_bonus: f64,
    /// Raw category weight before the scarcity multiplier.
    pub category_bonus: f64,
    /// Upgrade path bonus.
    pub upgrade_bonus: f64,
    /// Resource utilization bonus.
    pub utilization_bonus: f64,
    /// Material tier bonus.
    pub tier_bonus: f64,
    /// Output quantity bonus.
    pub output_bonus: f64,
    /// Almost-craftable bonus.
    pub almost_craftable_bonus: f64,
    /// Stack completion bonus.
    pub stack_completion_bonus: f64,
}

impl ScoreBreakdown {
    /// Category weight after scarcity decay.
    #[must_use]
    pub fn scaled_category_bonus(&self) -> f64 {
        self.category_bonus * self.scarcity_multiplier
    }

    /// Final score.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.craftable_bonus
            + self.survival_bonus
            + self.upgrade_bonus
            + self.scaled_category_bonus()
            + self.utilization_bonus
            + self.tier_bonus
            + self.output_bonus
            + self.almost_craftable_bonus
            + self.stack_completion_bonus
    }
}

/// Computes every score term for `recipe`.
#[must_use]
pub fn score_breakdown(recipe: &Recipe, ctx: &ScoringContext<'_>) -> ScoreBreakdown {
    let materials = resolve_materials(recipe, ctx.inventory, ctx.groups);
    let craftability = evaluate_resolved(&materials);
    let can_craft = craftability.can_craft_now;
    let output_item = recipe.output.item.as_str();
    let total_owned = ctx.owned(output_item);

    let craftable_bonus = if can_craft { CRAFTABLE_NOW_BONUS } else { 0.0 };
    let scarcity_multiplier = scarcity_multiplier(total_owned);

    let survival_bonus = if total_owned == 0 && can_craft {
        if ctx.tables.is_critical_first(output_item) {
            CRITICAL_FIRST_BONUS
        } else if ctx.tables.is_survival_tool(output_item) {
            SURVIVAL_TOOL_BONUS
        } else {
            0.0
        }
    } else {
        0.0
    };

    let category_bonus = ctx.tables.category_weight(&recipe.category);
    let upgrade_bonus = upgrade_bonus(output_item, can_craft, total_owned, ctx);

    let (utilization_bonus, tier_bonus) = if can_craft {
        (
            utilization_bonus(&materials),
            tier_bonus(&materials, ctx.tables),
        )
    } else {
        (0.0, 0.0)
    };

    let output_bonus =
        (u64::from(recipe.output.quantity) * OUTPUT_BONUS_PER_UNIT).min(OUTPUT_BONUS_CAP) as f64;

    let almost_craftable_bonus = if can_craft {
        0.0
    } else if craftability.ratio >= ALMOST_HIGH_RATIO {
        ALMOST_CRAFTABLE_HIGH_BONUS
    } else if craftability.ratio >= ALMOST_LOW_RATIO {
        ALMOST_CRAFTABLE_LOW_BONUS
    } else {
        0.0
    };

    let after_craft = u64::from(total_owned) + u64::from(recipe.output.quantity);
    let stack_completion_bonus = if can_craft && STACK_MILESTONES.contains(&after_craft) {
        STACK_COMPLETION_BONUS
    } else {
        0.0
    };

    let breakdown = ScoreBreakdown {
        craftability,
        total_owned,
        craftable_bonus,
        scarcity_multiplier,
        survival_bonus,
        category_bonus,
        upgrade_bonus,
        utilization_bonus,
        tier_bonus,
        output_bonus,
        almost_craftable_bonus,
        stack_completion_bonus,
    };

    trace!(
        recipe = %recipe.id,
        name = %recipe.name,
        can_craft,
        total_owned,
        score = breakdown.total(),
        "scored recipe"
    );

    breakdown
}

/// Computes the desirability score of `recipe`. Higher is better.
#[must_use]
pub fn score_recipe(recipe: &Recipe, ctx: &ScoringContext<'_>) -> f64 {
    score_breakdown(recipe, ctx).total()
}

/// `0.6 ^ owned`: 1.0 for nothing owned, 0.6 for one, ~0.078 for five.
#[must_use]
pub fn scarcity_multiplier(owned: u32) -> f64 {
    SCARCITY_DECAY.powi(i32::try_from(owned).unwrap_or(i32::MAX))
}

/// Bonus for the first upgrade chain whose basic tool is owned and which
/// lists the output. Only unowned, craftable outputs qualify.
fn upgrade_bonus(
    output_item: &str,
    can_craft: bool,
    total_owned: u32,
    ctx: &ScoringContext<'_>,
) -> f64 {
    if !can_craft || total_owned > 0 {
        return 0.0;
    }

    ctx.tables
        .upgrade_chains()
        .iter()
        .filter(|chain| ctx.owned(&chain.basic_tool) > 0)
        .find_map(|chain| chain.position_of(output_item))
        .map_or(0.0, |index| {
            UPGRADE_BASE_BONUS - UPGRADE_STEP_PENALTY * index as f64
        })
}

fn utilization_bonus(materials: &[ResolvedMaterial]) -> f64 {
    materials
        .iter()
        .map(|m| {
            let available = u64::from(m.available);
            let needed = u64::from(m.needed);
            if available >= needed * ABUNDANT_FACTOR {
                ABUNDANT_MATERIAL_BONUS
            } else if available >= needed * PLENTIFUL_FACTOR {
                PLENTIFUL_MATERIAL_BONUS
            } else {
                0.0
            }
        })
        .sum()
}

fn tier_bonus(materials: &[ResolvedMaterial], tables: &ScoringTables) -> f64 {
    materials
        .iter()
        .map(|m| f64::from(tables.tier(&m.item)) * TIER_BONUS_PER_LEVEL)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::{FlexibleIngredientGroup, RecipeCategory};
    use crate::tables::UpgradeChain;
    use quickcraft_common::RecipeId;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn recipe(
        id: u64,
        output: &str,
        category: RecipeCategory,
        materials: &[(&str, u32)],
    ) -> Recipe {
        materials
            .iter()
            .fold(
                Recipe::builder(RecipeId::new(id), output).category(category),
                |builder, (item, qty)| builder.material(*item, *qty),
            )
            .output(output, 1)
            .build()
            .expect("valid recipe")
    }

    fn stone_pickaxe() -> Recipe {
        recipe(
            1,
            "Stone Pickaxe",
            RecipeCategory::Tool,
            &[("Wood", 5), ("Stone", 3)],
        )
    }

    fn plain_tables() -> ScoringTables {
        ScoringTables::empty().with_category_weight(RecipeCategory::Tool, 25.0)
    }

    #[test]
    fn test_scenario_craftable_critical_first() {
        let tables = plain_tables().with_critical_first("Stone Pickaxe");
        let inventory = ResourceSnapshot::new().with("Wood", 10).with("Stone", 5);
        let ctx = ScoringContext::new(&inventory, &tables);

        let breakdown = score_breakdown(&stone_pickaxe(), &ctx);

        assert!(breakdown.craftability.can_craft_now);
        assert_eq!(breakdown.total_owned, 0);
        assert!(approx(breakdown.craftable_bonus, 100.0));
        assert!(approx(breakdown.survival_bonus, 200.0));
        assert!(approx(breakdown.scarcity_multiplier, 1.0));
        // Wood 10 >= 5*10 fails, 10 >= 5*5 fails; Stone 5 >= 15 fails
        assert!(approx(breakdown.utilization_bonus, 0.0));
        // Two tier-1 materials
        assert!(approx(breakdown.tier_bonus, 6.0));
        assert!(approx(breakdown.output_bonus, 2.0));
        assert!(approx(breakdown.total(), 100.0 + 200.0 + 25.0 + 6.0 + 2.0));
    }

    #[test]
    fn test_scenario_blocked_far_from_craftable() {
        let tables = plain_tables().with_critical_first("Stone Pickaxe");
        let inventory = ResourceSnapshot::new().with("Wood", 2).with("Stone", 1);
        let ctx = ScoringContext::new(&inventory, &tables);

        let breakdown = score_breakdown(&stone_pickaxe(), &ctx);

        assert!(!breakdown.craftability.can_craft_now);
        assert!(approx(breakdown.craftability.ratio, 2.0 / 15.0));
        assert!(approx(breakdown.almost_craftable_bonus, 0.0));
        assert!(approx(breakdown.survival_bonus, 0.0));
        assert!(approx(breakdown.total(), 25.0 + 2.0));
    }

    #[test]
    fn test_compounded_ratio_misses_almost_bonus() {
        let tables = plain_tables();
        let inventory = ResourceSnapshot::new().with("Wood", 4).with("Stone", 1);
        let ctx = ScoringContext::new(&inventory, &tables);

        let breakdown = score_breakdown(&stone_pickaxe(), &ctx);

        assert!(approx(breakdown.craftability.ratio, 0.8 / 3.0));
        assert!(approx(breakdown.almost_craftable_bonus, 0.0));
    }

    #[test]
    fn test_almost_craftable_tiers() {
        let tables = plain_tables();

        let inventory = ResourceSnapshot::new().with("Wood", 4).with("Stone", 3);
        let ctx = ScoringContext::new(&inventory, &tables);
        assert!(approx(
            score_breakdown(&stone_pickaxe(), &ctx).almost_craftable_bonus,
            15.0
        ));

        let inventory = ResourceSnapshot::new().with("Wood", 3).with("Stone", 3);
        let ctx = ScoringContext::new(&inventory, &tables);
        assert!(approx(
            score_breakdown(&stone_pickaxe(), &ctx).almost_craftable_bonus,
            8.0
        ));
    }

    #[test]
    fn test_scarcity_decay() {
        assert!(approx(scarcity_multiplier(0), 1.0));
        assert!(approx(scarcity_multiplier(1), 0.6));
        assert!(approx(scarcity_multiplier(5), 0.6_f64.powi(5)));
        assert!(scarcity_multiplier(u32::MAX) >= 0.0);
    }

    #[test]
    fn test_hotbar_counts_toward_ownership() {
        let tables = plain_tables().with_critical_first("Stone Pickaxe");
        let inventory = ResourceSnapshot::new().with("Wood", 10).with("Stone", 5);
        let hotbar = ResourceSnapshot::new().with("Stone Pickaxe", 1);
        let ctx = ScoringContext::new(&inventory, &tables).with_hotbar(&hotbar);

        let breakdown = score_breakdown(&stone_pickaxe(), &ctx);

        assert_eq!(breakdown.total_owned, 1);
        assert!(approx(breakdown.survival_bonus, 0.0));
        assert!(approx(breakdown.scaled_category_bonus(), 25.0 * 0.6));
    }

    #[test]
    fn test_survival_tool_bonus_below_critical() {
        let tables = plain_tables()
            .with_survival_tool("Stone Pickaxe")
            .with_critical_first("Stone Pickaxe");
        let inventory = ResourceSnapshot::new().with("Wood", 10).with("Stone", 5);
        let ctx = ScoringContext::new(&inventory, &tables);
        assert!(approx(
            score_breakdown(&stone_pickaxe(), &ctx).survival_bonus,
            200.0
        ));

        let tables = plain_tables().with_survival_tool("Stone Pickaxe");
        let ctx = ScoringContext::new(&inventory, &tables);
        assert!(approx(
            score_breakdown(&stone_pickaxe(), &ctx).survival_bonus,
            150.0
        ));
    }

    #[test]
    fn test_upgrade_bonus_by_chain_position() {
        let tables = plain_tables().with_upgrade_chain(UpgradeChain::new(
            "Wooden Pickaxe",
            ["Stone Pickaxe", "Iron Pickaxe", "Steel Pickaxe"],
        ));
        let inventory = ResourceSnapshot::new()
            .with("Wooden Pickaxe", 1)
            .with("Wood", 10)
            .with("Stone", 5)
            .with("Metal Fragments", 10);
        let ctx = ScoringContext::new(&inventory, &tables);

        assert!(approx(
            score_breakdown(&stone_pickaxe(), &ctx).upgrade_bonus,
            80.0
        ));

        let iron = recipe(
            2,
            "Iron Pickaxe",
            RecipeCategory::Tool,
            &[("Metal Fragments", 5)],
        );
        assert!(approx(score_breakdown(&iron, &ctx).upgrade_bonus, 65.0));
    }

    #[test]
    fn test_upgrade_first_matching_chain_wins() {
        let tables = plain_tables()
            .with_upgrade_chain(UpgradeChain::new("Rock", ["Stone Hatchet", "Stone Pickaxe"]))
            .with_upgrade_chain(UpgradeChain::new("Wooden Pickaxe", ["Stone Pickaxe"]));
        let inventory = ResourceSnapshot::new()
            .with("Rock", 1)
            .with("Wooden Pickaxe", 1)
            .with("Wood", 10)
            .with("Stone", 5);
        let ctx = ScoringContext::new(&inventory, &tables);

        // Index 1 in the first chain, not index 0 in the second.
        assert!(approx(
            score_breakdown(&stone_pickaxe(), &ctx).upgrade_bonus,
            65.0
        ));
    }

    #[test]
    fn test_upgrade_skips_chains_without_basic_tool() {
        let tables = plain_tables()
            .with_upgrade_chain(UpgradeChain::new("Rock", ["Stone Hatchet", "Stone Pickaxe"]))
            .with_upgrade_chain(UpgradeChain::new("Wooden Pickaxe", ["Stone Pickaxe"]));
        let inventory = ResourceSnapshot::new()
            .with("Wooden Pickaxe", 1)
            .with("Wood", 10)
            .with("Stone", 5);
        let ctx = ScoringContext::new(&inventory, &tables);

        assert!(approx(
            score_breakdown(&stone_pickaxe(), &ctx).upgrade_bonus,
            80.0
        ));
    }

    #[test]
    fn test_upgrade_requires_craftable_and_unowned() {
        let tables = plain_tables()
            .with_upgrade_chain(UpgradeChain::new("Wooden Pickaxe", ["Stone Pickaxe"]));

        let blocked = ResourceSnapshot::new().with("Wooden Pickaxe", 1);
        let ctx = ScoringContext::new(&blocked, &tables);
        assert!(approx(
            score_breakdown(&stone_pickaxe(), &ctx).upgrade_bonus,
            0.0
        ));

        let owned = ResourceSnapshot::new()
            .with("Wooden Pickaxe", 1)
            .with("Stone Pickaxe", 1)
            .with("Wood", 10)
            .with("Stone", 5);
        let ctx = ScoringContext::new(&owned, &tables);
        assert!(approx(
            score_breakdown(&stone_pickaxe(), &ctx).upgrade_bonus,
            0.0
        ));
    }

    #[test]
    fn test_utilization_and_tier_bonus() {
        let tables = plain_tables().with_tier("Metal Fragments", 3);
        let recipe = recipe(
            3,
            "Metal Hatchet",
            RecipeCategory::Tool,
            &[("Wood", 2), ("Metal Fragments", 4)],
        );
        // Wood 20 >= 2*10 -> 5; Metal 20 >= 4*5 -> 2
        let inventory = ResourceSnapshot::new()
            .with("Wood", 20)
            .with("Metal Fragments", 20);
        let ctx = ScoringContext::new(&inventory, &tables);
        let breakdown = score_breakdown(&recipe, &ctx);

        assert!(approx(breakdown.utilization_bonus, 7.0));
        assert!(approx(breakdown.tier_bonus, 1.0 * 3.0 + 3.0 * 3.0));
    }

    #[test]
    fn test_output_bonus_is_capped() {
        let tables = plain_tables();
        let arrows = Recipe::builder(RecipeId::new(4), "Wooden Arrow")
            .category(RecipeCategory::Ammunition)
            .material("Wood", 1)
            .output("Wooden Arrow", 12)
            .build()
            .expect("valid recipe");
        let inventory = ResourceSnapshot::new();
        let ctx = ScoringContext::new(&inventory, &tables);

        assert!(approx(score_breakdown(&arrows, &ctx).output_bonus, 10.0));
    }

    #[test]
    fn test_stack_completion_bonus() {
        let tables = plain_tables();
        let arrows = Recipe::builder(RecipeId::new(5), "Wooden Arrow")
            .category(RecipeCategory::Ammunition)
            .material("Wood", 1)
            .output("Wooden Arrow", 4)
            .build()
            .expect("valid recipe");

        let inventory = ResourceSnapshot::new()
            .with("Wood", 1)
            .with("Wooden Arrow", 16);
        let ctx = ScoringContext::new(&inventory, &tables);
        assert!(approx(
            score_breakdown(&arrows, &ctx).stack_completion_bonus,
            5.0
        ));

        let inventory = ResourceSnapshot::new()
            .with("Wood", 1)
            .with("Wooden Arrow", 15);
        let ctx = ScoringContext::new(&inventory, &tables);
        assert!(approx(
            score_breakdown(&arrows, &ctx).stack_completion_bonus,
            0.0
        ));
    }

    #[test]
    fn test_unknown_category_uses_default_weight() {
        let tables = ScoringTables::empty();
        let trinket = recipe(
            6,
            "Shell Necklace",
            RecipeCategory::Other("Trinket".into()),
            &[("Shell", 1)],
        );
        let inventory = ResourceSnapshot::new();
        let ctx = ScoringContext::new(&inventory, &tables);
        assert!(approx(score_breakdown(&trinket, &ctx).category_bonus, 8.0));
    }

    #[test]
    fn test_flexible_group_feeds_scorer_view() {
        let tables = ScoringTables::empty().with_tier("Lingonberries", 2);
        let groups = FlexibleGroupIndex::new().with(
            "Berry Mash",
            FlexibleIngredientGroup::new("Any Berry", ["Lingonberries", "Cloudberries"], 2),
        );
        let mash = recipe(
            7,
            "Berry Mash",
            RecipeCategory::Consumable,
            &[("Lingonberries", 2)],
        );
        let inventory = ResourceSnapshot::new().with("Cloudberries", 20);
        let ctx = ScoringContext::new(&inventory, &tables).with_groups(&groups);
        let breakdown = score_breakdown(&mash, &ctx);

        assert!(breakdown.craftability.can_craft_now);
        // 20 available against 2 needed
        assert!(approx(breakdown.utilization_bonus, 5.0));
        assert!(approx(breakdown.tier_bonus, 6.0));
    }

    #[test]
    fn test_score_is_deterministic() {
        let tables = ScoringTables::default();
        let inventory = ResourceSnapshot::new()
            .with("Wood", 13)
            .with("Stone", 7)
            .with("Rock", 1);
        let ctx = ScoringContext::new(&inventory, &tables);
        let first = score_recipe(&stone_pickaxe(), &ctx);
        let second = score_recipe(&stone_pickaxe(), &ctx);
        assert_eq!(first.to_bits(), second.to_bits());
    }
}
