//! Craftability evaluation.
//!
//! Evaluation runs in two steps. [`resolve_materials`] applies flexible
//! ingredient substitution and yields a flat `(item, available, needed)`
//! view; [`evaluate_resolved`] turns that view into a [`Craftability`].
//! The scorer consumes the same flat view, so substitution never leaks
//! into scoring.

use serde::{Deserialize, Serialize};

use crate::inventory::ResourceSnapshot;
use crate::recipe::{FlexibleGroupIndex, Recipe};

/// Ratio at or above which a blocked recipe counts as almost craftable.
pub const ALMOST_CRAFTABLE_RATIO: f64 = 0.75;

/// One material requirement after substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMaterial {
    /// Material item name as listed in the recipe.
    pub item: String,
    /// Holdings that count toward this requirement.
    pub available: u32,
    /// Quantity that must be held.
    pub needed: u32,
}

impl ResolvedMaterial {
    /// Returns true if holdings cover the requirement.
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        self.available >= self.needed
    }

    /// Returns how many more items are needed.
    #[must_use]
    pub const fn missing_count(&self) -> u32 {
        self.needed.saturating_sub(self.available)
    }
}

/// Result of evaluating one recipe against a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Craftability {
    /// Every requirement is covered and the recipe has materials.
    pub can_craft_now: bool,
    /// Product of `available / needed` over every short material.
    pub ratio: f64,
    /// How many times the recipe could be crafted; `None` when unbounded.
    pub max_craftable: Option<u32>,
}

impl Craftability {
    /// Returns true if blocked but at least 75% of the way there.
    #[must_use]
    pub fn is_almost_craftable(&self) -> bool {
        !self.can_craft_now && self.ratio >= ALMOST_CRAFTABLE_RATIO
    }
}

/// Resolves each material of `recipe` to a flat availability view.
///
/// A material whose item is the canonical (first) member of one of the
/// output's flexible groups is satisfied by the sum of holdings over the
/// whole group, compared against the group's `total_required`.
#[must_use]
pub fn resolve_materials(
    recipe: &Recipe,
    inventory: &ResourceSnapshot,
    groups: &FlexibleGroupIndex,
) -> Vec<ResolvedMaterial> {
    recipe
        .materials
        .iter()
        .map(|material| {
            match groups.canonical_group(&recipe.output.item, &material.item) {
                Some(group) => ResolvedMaterial {
                    item: material.item.clone(),
                    available: inventory.total_of(group.valid_items.iter().map(String::as_str)),
                    needed: group.total_required,
                },
                None => ResolvedMaterial {
                    item: material.item.clone(),
                    available: inventory.count(&material.item),
                    needed: material.quantity,
                },
            }
        })
        .collect()
}

/// Evaluates an already-resolved material list.
///
/// The ratio multiplies the shortfall of every short material, so two
/// materials at 50% give 0.25. An empty list is never craftable.
#[must_use]
pub fn evaluate_resolved(materials: &[ResolvedMaterial]) -> Craftability {
    let mut can_craft_now = true;
    let mut ratio = 1.0_f64;
    let mut max_craftable: Option<u32> = None;

    for material in materials {
        if material.available < material.needed {
            can_craft_now = false;
            // needed > available, so needed is non-zero
            ratio *= f64::from(material.available) / f64::from(material.needed);
        }

        if material.needed > 0 {
            let times = material.available / material.needed;
            max_craftable = Some(max_craftable.map_or(times, |current| current.min(times)));
        }
    }

    if materials.is_empty() {
        can_craft_now = false;
    }

    Craftability {
        can_craft_now,
        ratio,
        max_craftable,
    }
}

/// Evaluates whether `recipe` can be crafted from `inventory`.
#[must_use]
pub fn evaluate(
    recipe: &Recipe,
    inventory: &ResourceSnapshot,
    groups: &FlexibleGroupIndex,
) -> Craftability {
    evaluate_resolved(&resolve_materials(recipe, inventory, groups))
}

/// Materials the player is short on, with the missing amount.
#[must_use]
pub fn missing_materials(
    recipe: &Recipe,
    inventory: &ResourceSnapshot,
    groups: &FlexibleGroupIndex,
) -> Vec<(String, u32)> {
    resolve_materials(recipe, inventory, groups)
        .into_iter()
        .filter(|m| !m.is_satisfied())
        .map(|m| {
            let missing = m.missing_count();
            (m.item, missing)
        })
        .collect()
}
