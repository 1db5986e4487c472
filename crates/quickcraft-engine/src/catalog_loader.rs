//! Recipe catalog loading and management.
//!
//! This module provides:
//! - Loading recipes from assets/recipes/*.toml and *.json
//! - Recipe validation on load
//! - Flexible ingredient group metadata
//! - Hot-reload support for development
//! - Catalog registry with lookup by ID, name, and category

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use quickcraft_common::{QuickcraftError, RecipeId, SchemaVersion};
use quickcraft_gameplay::{
    FlexibleGroupIndex, FlexibleIngredientGroup, Material, Recipe, RecipeCategory, RecipeError,
    RecipeOutput,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default asset path for recipes.
pub const DEFAULT_RECIPE_PATH: &str = "assets/recipes";

/// Errors that can occur during catalog loading.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// File not found.
    #[error("Catalog file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read catalog file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse catalog TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Failed to parse JSON.
    #[error("Failed to parse catalog JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Extension is neither `.toml` nor `.json`.
    #[error("Unsupported catalog format: {0}")]
    UnsupportedFormat(PathBuf),

    /// File written by an incompatible version.
    #[error("Catalog file version {actual} is not readable (expected {expected})")]
    VersionMismatch {
        /// Version this build reads
        expected: SchemaVersion,
        /// Version found in the file
        actual: SchemaVersion,
    },

    /// Validation error.
    #[error("Recipe validation error: {0}")]
    ValidationError(String),

    /// Duplicate recipe ID.
    #[error("Duplicate recipe ID: {0}")]
    DuplicateId(RecipeId),
}

/// Result type for catalog loading operations.
pub type CatalogLoadResult<T> = Result<T, CatalogLoadError>;

impl From<RecipeError> for CatalogLoadError {
    fn from(err: RecipeError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<CatalogLoadError> for QuickcraftError {
    fn from(err: CatalogLoadError) -> Self {
        match err {
            CatalogLoadError::ReadError(e) => Self::Io(e),
            CatalogLoadError::VersionMismatch { expected, actual } => {
                Self::VersionMismatch { expected, actual }
            },
            CatalogLoadError::ValidationError(msg) => Self::Validation(msg),
            CatalogLoadError::DuplicateId(id) => {
                Self::Validation(format!("duplicate recipe id {id}"))
            },
            other => Self::Serialization(other.to_string()),
        }
    }
}

// ============================================================================
// File Format
// ============================================================================

/// A recipe definition loaded from file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDefinition {
    /// Unique recipe identifier.
    pub id: u64,
    /// Display name, also the search key.
    pub name: String,
    /// Category tag.
    #[serde(default = "default_category")]
    pub category: RecipeCategory,
    /// Required materials, in display order.
    #[serde(default)]
    pub materials: Vec<Material>,
    /// Output item and quantity.
    pub output: RecipeOutput,
    /// Time to craft in seconds.
    #[serde(default)]
    pub crafting_time_secs: u32,
}

fn default_category() -> RecipeCategory {
    RecipeCategory::Material
}

impl RecipeDefinition {
    /// Validates the recipe definition.
    pub fn validate(&self) -> CatalogLoadResult<()> {
        if self.name.trim().is_empty() {
            return Err(CatalogLoadError::ValidationError(format!(
                "Recipe {} has empty name",
                self.id
            )));
        }

        if self.output.item.trim().is_empty() {
            return Err(CatalogLoadError::ValidationError(format!(
                "Recipe {} has empty output item",
                self.id
            )));
        }

        if self.output.quantity == 0 {
            return Err(CatalogLoadError::ValidationError(format!(
                "Recipe {} has zero output quantity",
                self.id
            )));
        }

        for (i, material) in self.materials.iter().enumerate() {
            if material.quantity == 0 {
                return Err(CatalogLoadError::ValidationError(format!(
                    "Recipe {} material {} ({}) has zero quantity",
                    self.id, i, material.item
                )));
            }
        }

        Ok(())
    }

    /// Puts the canonical material of every flexible group for this output
    /// ahead of the fixed costs.
    ///
    /// A canonical material missing from `materials` is added with the
    /// group's `total_required`. One listed with a different quantity is a
    /// validation error. A recipe left with no materials is rejected.
    pub fn with_flexible_groups<'a, I>(&self, groups: I) -> CatalogLoadResult<Self>
    where
        I: IntoIterator<Item = &'a FlexibleGroupDefinition>,
    {
        let mut fixed = self.materials.clone();
        let mut materials = Vec::with_capacity(fixed.len());

        for group in groups.into_iter().filter(|g| g.output_item == self.output.item) {
            let Some(canonical) = group.valid_items.first() else {
                return Err(CatalogLoadError::ValidationError(format!(
                    "Flexible group '{}' for {} has no valid items",
                    group.group_name, group.output_item
                )));
            };

            match fixed.iter().position(|m| &m.item == canonical) {
                Some(i) => {
                    let listed = fixed.remove(i);
                    if listed.quantity != group.total_required {
                        return Err(CatalogLoadError::ValidationError(format!(
                            "Recipe {} lists {} x{} but group '{}' requires {}",
                            self.id,
                            listed.item,
                            listed.quantity,
                            group.group_name,
                            group.total_required
                        )));
                    }
                    materials.push(listed);
                },
                None => materials.push(Material::new(canonical.clone(), group.total_required)),
            }
        }
        materials.extend(fixed);

        if materials.is_empty() {
            return Err(CatalogLoadError::ValidationError(format!(
                "Recipe {} has no materials",
                self.id
            )));
        }

        Ok(Self {
            materials,
            ..self.clone()
        })
    }

    /// Converts to a gameplay recipe.
    pub fn to_recipe(&self) -> CatalogLoadResult<Recipe> {
        let builder = self.materials.iter().fold(
            Recipe::builder(RecipeId::new(self.id), &self.name).category(self.category.clone()),
            |builder, material| builder.material(&material.item, material.quantity),
        );

        Ok(builder
            .output(&self.output.item, self.output.quantity)
            .crafting_time(self.crafting_time_secs)
            .build()?)
    }
}

/// A flexible ingredient group attached to an output item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexibleGroupDefinition {
    /// Output item the group belongs to.
    pub output_item: String,
    /// Display name like "Any Berry".
    pub group_name: String,
    /// Interchangeable items; the first one is listed in the recipe.
    pub valid_items: Vec<String>,
    /// Total quantity needed across all valid items.
    pub total_required: u32,
}

impl FlexibleGroupDefinition {
    /// Validates the group definition.
    pub fn validate(&self) -> CatalogLoadResult<()> {
        if self.valid_items.is_empty() {
            return Err(CatalogLoadError::ValidationError(format!(
                "Flexible group '{}' for {} has no valid items",
                self.group_name, self.output_item
            )));
        }

        if self.total_required == 0 {
            return Err(CatalogLoadError::ValidationError(format!(
                "Flexible group '{}' for {} requires zero items",
                self.group_name, self.output_item
            )));
        }

        Ok(())
    }

    /// Converts to a gameplay group.
    #[must_use]
    pub fn to_group(&self) -> FlexibleIngredientGroup {
        FlexibleIngredientGroup::new(
            self.group_name.clone(),
            self.valid_items.iter().cloned(),
            self.total_required,
        )
    }
}

/// A collection of recipes from a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeFile {
    /// File format version.
    #[serde(default = "default_version")]
    pub version: SchemaVersion,
    /// Recipes in this file.
    #[serde(default)]
    pub recipes: Vec<RecipeDefinition>,
    /// Flexible ingredient groups in this file.
    #[serde(default)]
    pub flexible_groups: Vec<FlexibleGroupDefinition>,
}

fn default_version() -> SchemaVersion {
    SchemaVersion::RECIPE_CATALOG
}

/// Returns true if the path has a catalog extension.
#[must_use]
pub fn is_catalog_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "toml" || ext == "json")
}

/// Parses a catalog file by extension.
pub fn parse_recipe_file(content: &str, path: &Path) -> CatalogLoadResult<RecipeFile> {
    let file: RecipeFile = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(content)?,
        Some("json") => serde_json::from_str(content)?,
        _ => return Err(CatalogLoadError::UnsupportedFormat(path.to_path_buf())),
    };

    if !SchemaVersion::RECIPE_CATALOG.can_read(&file.version) {
        return Err(CatalogLoadError::VersionMismatch {
            expected: SchemaVersion::RECIPE_CATALOG,
            actual: file.version,
        });
    }

    Ok(file)
}

// ============================================================================
// Registry
// ============================================================================

/// Catalog registry. Keeps recipes in registration order so rankings with
/// equal scores stay stable across reloads.
#[derive(Debug, Clone, Default)]
pub struct CatalogRegistry {
    /// Recipes in registration order.
    recipes: Vec<Recipe>,
    /// Positions by ID.
    by_id: HashMap<RecipeId, usize>,
    /// Positions by name (lowercase).
    by_name: HashMap<String, usize>,
    /// Positions by category.
    by_category: HashMap<RecipeCategory, Vec<usize>>,
    /// All categories, in first-seen order.
    categories: Vec<RecipeCategory>,
    /// Flexible group metadata.
    groups: FlexibleGroupIndex,
}

impl CatalogRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Returns true if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Registers a recipe.
    pub fn register(&mut self, recipe: Recipe) -> CatalogLoadResult<()> {
        if self.by_id.contains_key(&recipe.id) {
            return Err(CatalogLoadError::DuplicateId(recipe.id));
        }

        let index = self.recipes.len();
        let category = recipe.category.clone();

        self.by_category
            .entry(category.clone())
            .or_default()
            .push(index);
        if !self.categories.contains(&category) {
            self.categories.push(category);
        }

        self.by_name.insert(recipe.name.to_lowercase(), index);
        self.by_id.insert(recipe.id, index);
        self.recipes.push(recipe);

        Ok(())
    }

    /// Registers a flexible ingredient group for an output item.
    pub fn register_group(
        &mut self,
        output_item: impl Into<String>,
        group: FlexibleIngredientGroup,
    ) {
        self.groups.insert(output_item, group);
    }

    /// Gets a recipe by ID.
    #[must_use]
    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.by_id.get(&id).and_then(|&i| self.recipes.get(i))
    }

    /// Gets a recipe by name (case-insensitive).
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Recipe> {
        self.by_name
            .get(&name.to_lowercase())
            .and_then(|&i| self.recipes.get(i))
    }

    /// Gets all recipes in a category.
    #[must_use]
    pub fn get_by_category(&self, category: &RecipeCategory) -> Vec<&Recipe> {
        self.by_category
            .get(category)
            .map(|indices| indices.iter().filter_map(|&i| self.recipes.get(i)).collect())
            .unwrap_or_default()
    }

    /// Returns all categories.
    #[must_use]
    pub fn categories(&self) -> &[RecipeCategory] {
        &self.categories
    }

    /// Recipes in registration order.
    #[must_use]
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Flexible group metadata.
    #[must_use]
    pub fn groups(&self) -> &FlexibleGroupIndex {
        &self.groups
    }

    /// Returns an iterator over all recipes.
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    /// Searches recipes by name or material (case-insensitive).
    pub fn search(&self, query: &str) -> Vec<&Recipe> {
        self.recipes
            .iter()
            .filter(|r| r.matches_search(query))
            .collect()
    }

    /// Clears the registry.
    pub fn clear(&mut self) {
        self.recipes.clear();
        self.by_id.clear();
        self.by_name.clear();
        self.by_category.clear();
        self.categories.clear();
        self.groups = FlexibleGroupIndex::new();
    }
}

// ============================================================================
// Loader
// ============================================================================

/// Statistics for the catalog loader.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CatalogLoaderStats {
    /// Number of files loaded.
    pub files_loaded: u32,
    /// Number of recipes loaded.
    pub recipes_loaded: u32,
    /// Number of flexible groups loaded.
    pub groups_loaded: u32,
    /// Number of validation errors.
    pub validation_errors: u32,
    /// Number of hot-reloads performed.
    pub hot_reloads: u32,
}

/// Catalog loader with hot-reload support.
#[derive(Debug)]
pub struct CatalogLoader {
    /// Base path for catalog files.
    base_path: PathBuf,
    /// Catalog registry.
    registry: CatalogRegistry,
    /// Modification times for hot-reload detection.
    mod_times: HashMap<PathBuf, SystemTime>,
    /// Whether hot-reload is enabled.
    hot_reload_enabled: bool,
    /// Statistics.
    stats: CatalogLoaderStats,
}

impl CatalogLoader {
    /// Creates a new catalog loader.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        info!("Initializing catalog loader at: {:?}", base_path);

        Self {
            base_path,
            registry: CatalogRegistry::new(),
            mod_times: HashMap::new(),
            hot_reload_enabled: cfg!(debug_assertions),
            stats: CatalogLoaderStats::default(),
        }
    }

    /// Creates a loader with default path.
    #[must_use]
    pub fn with_default_path() -> Self {
        Self::new(DEFAULT_RECIPE_PATH)
    }

    /// Enables or disables hot-reload.
    #[must_use]
    pub fn with_hot_reload(mut self, enabled: bool) -> Self {
        self.hot_reload_enabled = enabled;
        self
    }

    /// Returns the base path.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the catalog registry.
    #[must_use]
    pub fn registry(&self) -> &CatalogRegistry {
        &self.registry
    }

    /// Returns loader statistics.
    #[must_use]
    pub fn stats(&self) -> &CatalogLoaderStats {
        &self.stats
    }

    /// Catalog files under the base path, sorted by path.
    fn catalog_files(&self) -> CatalogLoadResult<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.base_path)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_catalog_file(path))
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Loads all catalog files from the base path.
    ///
    /// Files load in path order. A broken file is logged and skipped.
    pub fn load_all(&mut self) -> CatalogLoadResult<()> {
        if !self.base_path.exists() {
            info!(
                "Recipe directory does not exist, creating: {:?}",
                self.base_path
            );
            fs::create_dir_all(&self.base_path)?;
            return Ok(());
        }

        for path in self.catalog_files()? {
            if let Err(e) = self.load_file(&path) {
                warn!("Failed to load catalog file {:?}: {}", path, e);
                self.stats.validation_errors += 1;
            }
        }

        info!(
            "Loaded {} recipes and {} flexible groups from {} files",
            self.stats.recipes_loaded, self.stats.groups_loaded, self.stats.files_loaded
        );

        Ok(())
    }

    /// Loads recipes from a single file.
    pub fn load_file(&mut self, path: &Path) -> CatalogLoadResult<()> {
        debug!("Loading catalog file: {:?}", path);

        if !path.exists() {
            return Err(CatalogLoadError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;

        // Track modification time before parsing so a broken file is
        // retried once it changes.
        if let Ok(modified) = fs::metadata(path).and_then(|m| m.modified()) {
            self.mod_times.insert(path.to_path_buf(), modified);
        }

        let recipe_file = parse_recipe_file(&content, path)?;

        let mut groups = Vec::with_capacity(recipe_file.flexible_groups.len());
        for group in recipe_file.flexible_groups {
            match group.validate() {
                Ok(()) => groups.push(group),
                Err(e) => {
                    warn!("Invalid flexible group in {:?}: {}", path, e);
                    self.stats.validation_errors += 1;
                },
            }
        }

        let mut loaded_count = 0;
        for definition in recipe_file.recipes {
            let recipe = match definition
                .validate()
                .and_then(|()| definition.with_flexible_groups(&groups))
                .and_then(|resolved| resolved.to_recipe())
            {
                Ok(recipe) => recipe,
                Err(e) => {
                    warn!("Invalid recipe in {:?}: {}", path, e);
                    self.stats.validation_errors += 1;
                    continue;
                },
            };

            match self.registry.register(recipe) {
                Ok(()) => loaded_count += 1,
                Err(e) => {
                    warn!("Failed to register recipe from {:?}: {}", path, e);
                    self.stats.validation_errors += 1;
                },
            }
        }

        let mut group_count = 0;
        for group in groups {
            self.registry
                .register_group(group.output_item.clone(), group.to_group());
            group_count += 1;
        }

        self.stats.files_loaded += 1;
        self.stats.recipes_loaded += loaded_count;
        self.stats.groups_loaded += group_count;
        debug!(
            "Loaded {} recipes and {} groups from {:?}",
            loaded_count, group_count, path
        );

        Ok(())
    }

    /// Returns true if a tracked file changed or disappeared, or a new
    /// catalog file appeared.
    fn has_changes(&self) -> bool {
        let changed = self.mod_times.iter().any(|(path, previous)| {
            match fs::metadata(path).and_then(|m| m.modified()) {
                Ok(modified) => modified > *previous,
                Err(_) => true,
            }
        });
        if changed {
            return true;
        }

        self.catalog_files()
            .map(|paths| paths.iter().any(|p| !self.mod_times.contains_key(p)))
            .unwrap_or(false)
    }

    /// Checks for modified files and reloads the whole catalog.
    ///
    /// Returns true if the catalog was reloaded.
    pub fn check_hot_reload(&mut self) -> bool {
        if !self.hot_reload_enabled || !self.has_changes() {
            return false;
        }

        info!("Hot-reloading recipe catalog from {:?}", self.base_path);

        // Load into a fresh loader; the current catalog stays until that succeeds.
        let mut fresh = Self {
            base_path: self.base_path.clone(),
            registry: CatalogRegistry::new(),
            mod_times: HashMap::new(),
            hot_reload_enabled: self.hot_reload_enabled,
            stats: CatalogLoaderStats::default(),
        };

        match fresh.load_all() {
            Ok(()) => {
                fresh.stats.hot_reloads = self.stats.hot_reloads + 1;
                *self = fresh;
                true
            },
            Err(e) => {
                warn!("Hot-reload failed, keeping previous catalog: {}", e);
                false
            },
        }
    }

    /// Gets a recipe by ID.
    #[must_use]
    pub fn get_recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.registry.get(id)
    }

    /// Gets a recipe by name.
    #[must_use]
    pub fn get_recipe_by_name(&self, name: &str) -> Option<&Recipe> {
        self.registry.get_by_name(name)
    }

    /// Searches recipes.
    pub fn search(&self, query: &str) -> Vec<&Recipe> {
        self.registry.search(query)
    }
}
