//! Quick-craft recommendation model for rendering.
//!
//! Holds every input of the ranking and recomputes it from scratch when
//! any input changes. Setters handed an identical value leave the ranking
//! untouched.

use tracing::debug;

use crate::inventory::ResourceSnapshot;
use crate::ranking::{rank_entries, CategoryFilter, RankEntry, RankQuery, RankedRecipe};
use crate::recipe::{FlexibleGroupIndex, Recipe};
use crate::scoring::ScoringContext;
use crate::tables::ScoringTables;

/// Slots in the quick-craft icon grid.
pub const DEFAULT_GRID_SIZE: usize = 8;

/// Reactive quick-craft model.
#[derive(Debug, Clone)]
pub struct QuickCraftModel {
    catalog: Vec<Recipe>,
    query: RankQuery,
    inventory: ResourceSnapshot,
    hotbar: ResourceSnapshot,
    tables: ScoringTables,
    groups: FlexibleGroupIndex,
    grid_size: usize,
    ranked: Vec<RankEntry>,
    selected_index: Option<usize>,
    generation: u64,
}

impl QuickCraftModel {
    /// Creates an empty model using `tables`.
    #[must_use]
    pub fn new(tables: ScoringTables) -> Self {
        Self {
            catalog: Vec::new(),
            query: RankQuery::new(),
            inventory: ResourceSnapshot::new(),
            hotbar: ResourceSnapshot::new(),
            tables,
            groups: FlexibleGroupIndex::new(),
            grid_size: DEFAULT_GRID_SIZE,
            ranked: Vec::new(),
            selected_index: None,
            generation: 0,
        }
    }

    /// Sets the grid size shown by [`Self::visible`].
    #[must_use]
    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Sets the flexible group metadata and ranks.
    #[must_use]
    pub fn with_groups(mut self, groups: FlexibleGroupIndex) -> Self {
        self.groups = groups;
        self.recompute();
        self
    }

    /// Sets the catalog and ranks.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Vec<Recipe>) -> Self {
        self.catalog = catalog;
        self.recompute();
        self
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Replaces the recipe catalog.
    pub fn set_catalog(&mut self, catalog: Vec<Recipe>) {
        if self.catalog != catalog {
            self.catalog = catalog;
            self.recompute();
        }
    }

    /// Sets the free-text search term.
    pub fn set_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        if self.query.search_term != term {
            self.query.search_term = term;
            self.recompute();
        }
    }

    /// Sets the category filter.
    pub fn set_category(&mut self, category: impl Into<CategoryFilter>) {
        let category = category.into();
        if self.query.category != category {
            self.query.category = category;
            self.recompute();
        }
    }

    /// Replaces the resource snapshot.
    pub fn update_inventory(&mut self, inventory: ResourceSnapshot) {
        if self.inventory != inventory {
            self.inventory = inventory;
            self.recompute();
        }
    }

    /// Replaces the hotbar snapshot.
    pub fn update_hotbar(&mut self, hotbar: ResourceSnapshot) {
        if self.hotbar != hotbar {
            self.hotbar = hotbar;
            self.recompute();
        }
    }

    /// Replaces the scoring tables.
    pub fn set_tables(&mut self, tables: ScoringTables) {
        if self.tables != tables {
            self.tables = tables;
            self.recompute();
        }
    }

    /// Replaces the flexible group metadata.
    pub fn set_groups(&mut self, groups: FlexibleGroupIndex) {
        if self.groups != groups {
            self.groups = groups;
            self.recompute();
        }
    }

    /// Recomputes the full ranking from the current inputs.
    pub fn recompute(&mut self) {
        let ctx = ScoringContext::new(&self.inventory, &self.tables)
            .with_hotbar(&self.hotbar)
            .with_groups(&self.groups);
        self.ranked = rank_entries(&self.catalog, &self.query, &ctx);
        self.generation += 1;

        // Keep selection in bounds
        if let Some(idx) = self.selected_index {
            if idx >= self.ranked.len() {
                self.selected_index = self.ranked.len().checked_sub(1);
            }
        }

        debug!(
            generation = self.generation,
            shown = self.ranked.len(),
            "quick-craft ranking updated"
        );
    }

    // ========================================================================
    // Outputs
    // ========================================================================

    /// Current query.
    #[must_use]
    pub fn query(&self) -> &RankQuery {
        &self.query
    }

    /// Recipe catalog.
    #[must_use]
    pub fn catalog(&self) -> &[Recipe] {
        &self.catalog
    }

    /// Scoring tables in use.
    #[must_use]
    pub fn tables(&self) -> &ScoringTables {
        &self.tables
    }

    /// Number of grid slots.
    #[must_use]
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Number of times the ranking has been computed.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ranked recipe at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<RankedRecipe<'_>> {
        self.ranked.get(index).and_then(|&entry| {
            self.catalog
                .get(entry.index)
                .map(|recipe| RankedRecipe { recipe, entry })
        })
    }

    /// Every ranked recipe, best first.
    pub fn ranked(&self) -> impl Iterator<Item = RankedRecipe<'_>> + '_ {
        (0..self.ranked.len()).filter_map(|i| self.get(i))
    }

    /// Ranked recipes that fit in the grid.
    pub fn visible(&self) -> impl Iterator<Item = RankedRecipe<'_>> + '_ {
        self.ranked().take(self.grid_size)
    }

    /// Number of ranked recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// Returns true if nothing passed the filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Number of ranked recipes craftable now.
    #[must_use]
    pub fn craftable_count(&self) -> usize {
        self.ranked.iter().filter(|e| e.can_craft()).count()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Selects a ranked recipe by index. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.ranked.len() {
            self.selected_index = Some(index);
        }
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selected_index = None;
    }

    /// Selected index.
    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// Selected recipe.
    #[must_use]
    pub fn selected(&self) -> Option<RankedRecipe<'_>> {
        self.selected_index.and_then(|i| self.get(i))
    }
}

impl Default for QuickCraftModel {
    fn default() -> Self {
        Self::new(ScoringTables::default())
    }
}
