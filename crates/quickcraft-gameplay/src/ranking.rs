//! Filter and rank pipeline.
//!
//! Ranking applies the category filter, then the text filter, then sorts
//! what survives by three tiers:
//!
//! 1. craftable now before blocked,
//! 2. with a search term only: exact name match, then name prefix match,
//! 3. score, highest first.
//!
//! The sort is stable and scores compare with [`f64::total_cmp`], so the
//! same inputs always give the same order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use crate::craftability::Craftability;
use crate::recipe::{Recipe, RecipeCategory};
use crate::scoring::{score_breakdown, score_recipe, ScoringContext};

/// Category selector with an "All" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    /// Keep every category
    #[default]
    All,
    /// Keep one category
    Only(RecipeCategory),
}

impl CategoryFilter {
    /// Returns true if this filter keeps everything.
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Returns true if a recipe of `category` passes.
    #[must_use]
    pub fn matches(&self, category: &RecipeCategory) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == category,
        }
    }
}

impl From<RecipeCategory> for CategoryFilter {
    fn from(category: RecipeCategory) -> Self {
        Self::Only(category.normalized())
    }
}

/// User input driving a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RankQuery {
    /// Free-text search, matched against names and materials.
    pub search_term: String,
    /// Category selector.
    pub category: CategoryFilter,
}

impl RankQuery {
    /// Query with no search term and every category.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search term.
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Sets the category filter.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<CategoryFilter>) -> Self {
        self.category = category.into();
        self
    }

    /// Trimmed, lower-cased search term.
    #[must_use]
    pub fn normalized_term(&self) -> String {
        self.search_term.trim().to_lowercase()
    }

    /// Returns true if the trimmed search term is non-empty.
    #[must_use]
    pub fn has_search_term(&self) -> bool {
        !self.search_term.trim().is_empty()
    }
}

/// Per-recipe values computed while ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    /// Position of the recipe in the input catalog.
    pub index: usize,
    /// Craftability against the current snapshot.
    pub craftability: Craftability,
    /// Lower-cased name equals the search term.
    pub is_exact_match: bool,
    /// Lower-cased name starts with the search term.
    pub is_starts_with: bool,
    /// Desirability score.
    pub score: f64,
}

impl RankEntry {
    /// Returns true if the recipe can be crafted now.
    #[must_use]
    pub fn can_craft(&self) -> bool {
        self.craftability.can_craft_now
    }
}

/// A ranked recipe with the values it was ranked by.
#[derive(Debug, Clone, Copy)]
pub struct RankedRecipe<'a> {
    /// The recipe.
    pub recipe: &'a Recipe,
    /// Ranking values.
    pub entry: RankEntry,
}

impl RankedRecipe<'_> {
    /// Returns true if the recipe can be crafted now.
    #[must_use]
    pub fn can_craft(&self) -> bool {
        self.entry.can_craft()
    }

    /// Desirability score.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.entry.score
    }
}

/// Tiered comparator. The search tiers apply only when `has_term`.
#[must_use]
pub fn compare_entries(a: &RankEntry, b: &RankEntry, has_term: bool) -> Ordering {
    b.can_craft()
        .cmp(&a.can_craft())
        .then_with(|| {
            if has_term {
                b.is_exact_match
                    .cmp(&a.is_exact_match)
                    .then_with(|| b.is_starts_with.cmp(&a.is_starts_with))
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| b.score.total_cmp(&a.score))
}

/// Filters and ranks `catalog`, returning positions into it with the
/// values each recipe was ranked by.
#[must_use]
pub fn rank_entries(
    catalog: &[Recipe],
    query: &RankQuery,
    ctx: &ScoringContext<'_>,
) -> Vec<RankEntry> {
    let term = query.normalized_term();
    let has_term = !term.is_empty();

    let mut entries: Vec<RankEntry> = catalog
        .iter()
        .enumerate()
        .filter(|(_, recipe)| query.category.matches(&recipe.category))
        .filter(|(_, recipe)| recipe.matches_search(&term))
        .map(|(index, recipe)| {
            let breakdown = score_breakdown(recipe, ctx);
            let name = recipe.name.to_lowercase();
            RankEntry {
                index,
                craftability: breakdown.craftability,
                is_exact_match: has_term && name == term,
                is_starts_with: has_term && name.starts_with(&term),
                score: breakdown.total(),
            }
        })
        .collect();

    entries.sort_by(|a, b| compare_entries(a, b, has_term));

    debug!(
        catalog = catalog.len(),
        kept = entries.len(),
        craftable = entries.iter().filter(|e| e.can_craft()).count(),
        search = %term,
        category = ?query.category,
        "ranked recipes"
    );

    entries
}

/// Filters and ranks `catalog`, keeping the computed values.
#[must_use]
pub fn rank_recipes_detailed<'a>(
    catalog: &'a [Recipe],
    query: &RankQuery,
    ctx: &ScoringContext<'_>,
) -> Vec<RankedRecipe<'a>> {
    rank_entries(catalog, query, ctx)
        .into_iter()
        .filter_map(|entry| {
            catalog
                .get(entry.index)
                .map(|recipe| RankedRecipe { recipe, entry })
        })
        .collect()
}

/// Filters and ranks `catalog`.
#[must_use]
pub fn rank_recipes<'a>(
    catalog: &'a [Recipe],
    query: &RankQuery,
    ctx: &ScoringContext<'_>,
) -> Vec<&'a Recipe> {
    rank_recipes_detailed(catalog, query, ctx)
        .into_iter()
        .map(|ranked| ranked.recipe)
        .collect()
}

/// Orders the whole catalog by score alone, highest first.
///
/// No filters and no craftability tier. Equal scores keep catalog order.
#[must_use]
pub fn sort_recipes_by_prediction<'a>(
    catalog: &'a [Recipe],
    ctx: &ScoringContext<'_>,
) -> Vec<&'a Recipe> {
    let mut scored: Vec<(f64, &Recipe)> = catalog
        .iter()
        .map(|recipe| (score_recipe(recipe, ctx), recipe))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, recipe)| recipe).collect()
}
