//! Recommendation engine facade.
//!
//! Wires the configuration, the data loaders and the quick-craft model
//! together. The host feeds it snapshots and user input and reads the
//! ranked grid back.

use quickcraft_common::QuickcraftResult;
use quickcraft_gameplay::{
    CategoryFilter, QuickCraftModel, RankedRecipe, ResourceSnapshot, ScoringTables,
};
use tracing::info;

use crate::catalog_loader::CatalogLoader;
use crate::config::EngineConfig;
use crate::tables_loader::load_tables;

/// Loaded catalog and tables driving a [`QuickCraftModel`].
#[derive(Debug)]
pub struct RecommendationEngine {
    config: EngineConfig,
    loader: CatalogLoader,
    model: QuickCraftModel,
}

impl RecommendationEngine {
    /// Loads tables and catalog as described by `config`.
    pub fn from_config(config: &EngineConfig) -> QuickcraftResult<Self> {
        let tables = Self::load_configured_tables(config)?;

        let mut loader =
            CatalogLoader::new(config.recipe_dir.clone()).with_hot_reload(config.hot_reload);
        loader.load_all()?;

        let model = QuickCraftModel::new(tables)
            .with_grid_size(config.grid_size)
            .with_groups(loader.registry().groups().clone())
            .with_catalog(loader.registry().recipes().to_vec());

        info!(
            "Recommendation engine ready: {} recipes, {} craftable",
            model.catalog().len(),
            model.craftable_count()
        );

        Ok(Self {
            config: config.clone(),
            loader,
            model,
        })
    }

    fn load_configured_tables(config: &EngineConfig) -> QuickcraftResult<ScoringTables> {
        match &config.tables_path {
            Some(path) => Ok(load_tables(path)?),
            None => {
                info!("No scoring tables configured, using built-in tables");
                Ok(ScoringTables::default())
            },
        }
    }

    /// Configuration the engine was built from.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Catalog loader.
    #[must_use]
    pub fn loader(&self) -> &CatalogLoader {
        &self.loader
    }

    /// Quick-craft model.
    #[must_use]
    pub fn model(&self) -> &QuickCraftModel {
        &self.model
    }

    /// Mutable quick-craft model.
    pub fn model_mut(&mut self) -> &mut QuickCraftModel {
        &mut self.model
    }

    /// Sets the search term.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.model.set_search(term);
    }

    /// Sets the category filter.
    pub fn set_category(&mut self, category: impl Into<CategoryFilter>) {
        self.model.set_category(category);
    }

    /// Replaces the resource snapshot.
    pub fn update_inventory(&mut self, inventory: ResourceSnapshot) {
        self.model.update_inventory(inventory);
    }

    /// Replaces the hotbar snapshot.
    pub fn update_hotbar(&mut self, hotbar: ResourceSnapshot) {
        self.model.update_hotbar(hotbar);
    }

    /// Ranked recipes that fit in the grid.
    pub fn visible(&self) -> impl Iterator<Item = RankedRecipe<'_>> + '_ {
        self.model.visible()
    }

    /// Reloads the catalog if its files changed and re-feeds the model.
    ///
    /// Returns true if the catalog was reloaded.
    pub fn reload_if_changed(&mut self) -> bool {
        if !self.loader.check_hot_reload() {
            return false;
        }

        let registry = self.loader.registry();
        self.model.set_groups(registry.groups().clone());
        self.model.set_catalog(registry.recipes().to_vec());

        info!(
            "Recipe catalog reloaded: {} recipes",
            self.model.catalog().len()
        );
        true
    }

    /// Reloads the scoring tables from the configured path.
    pub fn reload_tables(&mut self) -> QuickcraftResult<()> {
        let tables = Self::load_configured_tables(&self.config)?;
        self.model.set_tables(tables);
        Ok(())
    }
}
