//! Recipe definitions and data structures.
//!
//! This module provides:
//! - Recipe categories with a forward-compatible fallback arm
//! - Materials and outputs keyed by item name
//! - Flexible ingredient groups (substitution metadata)
//! - A validating recipe builder

use quickcraft_common::{QuickcraftError, RecipeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Recipe Categories
// ============================================================================

/// Category tag of a recipe.
///
/// Unknown tags coming from newer catalogs are kept verbatim in
/// [`RecipeCategory::Other`] and weighted with the default category weight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecipeCategory {
    /// Pickaxes, hatchets and other gathering tools.
    Tool,
    /// Melee weapons.
    Weapon,
    /// Bows, crossbows and firearms.
    RangedWeapon,
    /// Wearable protection.
    Armor,
    /// Food, medicine and other consumables.
    Consumable,
    /// Arrows, bolts and bullets.
    Ammunition,
    /// Structures and deployables.
    Placeable,
    /// Intermediate crafting materials.
    Material,
    /// Any tag this build does not know about.
    ///
    /// Holds unknown tags only. Build it through [`RecipeCategory::parse`];
    /// [`RecipeCategory::normalized`] folds a known name back.
    Other(String),
}

impl RecipeCategory {
    /// Get the canonical tag name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Tool => "Tool",
            Self::Weapon => "Weapon",
            Self::RangedWeapon => "RangedWeapon",
            Self::Armor => "Armor",
            Self::Consumable => "Consumable",
            Self::Ammunition => "Ammunition",
            Self::Placeable => "Placeable",
            Self::Material => "Material",
            Self::Other(tag) => tag,
        }
    }

    /// Get display name for this category.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Tool => "Tools",
            Self::Weapon => "Weapons",
            Self::RangedWeapon => "Ranged Weapons",
            Self::Armor => "Armor",
            Self::Consumable => "Consumables",
            Self::Ammunition => "Ammunition",
            Self::Placeable => "Placeables",
            Self::Material => "Materials",
            Self::Other(tag) => tag,
        }
    }

    /// Get all known categories, in UI tab order.
    #[must_use]
    pub fn all() -> &'static [RecipeCategory] {
        static ALL: [RecipeCategory; 8] = [
            RecipeCategory::Tool,
            RecipeCategory::Weapon,
            RecipeCategory::RangedWeapon,
            RecipeCategory::Armor,
            RecipeCategory::Consumable,
            RecipeCategory::Ammunition,
            RecipeCategory::Placeable,
            RecipeCategory::Material,
        ];
        &ALL
    }

    /// Returns true if this is a tag outside the known set.
    #[must_use]
    pub fn is_other(&self) -> bool {
        matches!(self, Self::Other(_))
    }

    /// Folds an `Other` tag that names a known category into that category.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Other(tag) => Self::parse(&tag),
            known => known,
        }
    }

    /// Parses a category tag, accepting any casing and `_`, `-` or space
    /// separators (`"RangedWeapon"`, `"ranged_weapon"`, `"Ranged Weapon"`).
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        let normalized: String = tag
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "tool" | "tools" => Self::Tool,
            "weapon" | "weapons" => Self::Weapon,
            "rangedweapon" | "rangedweapons" => Self::RangedWeapon,
            "armor" | "armour" => Self::Armor,
            "consumable" | "consumables" => Self::Consumable,
            "ammunition" | "ammo" => Self::Ammunition,
            "placeable" | "placeables" => Self::Placeable,
            "material" | "materials" => Self::Material,
            _ => Self::Other(tag.trim().to_string()),
        }
    }
}

impl From<String> for RecipeCategory {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<&str> for RecipeCategory {
    fn from(tag: &str) -> Self {
        Self::parse(tag)
    }
}

impl From<RecipeCategory> for String {
    fn from(category: RecipeCategory) -> Self {
        match category {
            RecipeCategory::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RecipeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Materials and Outputs
// ============================================================================

/// A material requirement, keyed by the human-readable item name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    /// Item name, also the lookup key into the resource snapshot.
    pub item: String,
    /// Quantity required (always >= 1).
    pub quantity: u32,
}

impl Material {
    /// Create a new material requirement.
    #[must_use]
    pub fn new(item: impl Into<String>, quantity: u32) -> Self {
        Self {
            item: item.into(),
            quantity,
        }
    }
}

/// Recipe output definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeOutput {
    /// Output item name.
    pub item: String,
    /// Quantity produced per craft (always >= 1).
    pub quantity: u32,
}

impl RecipeOutput {
    /// Create simple output.
    #[must_use]
    pub fn new(item: impl Into<String>, quantity: u32) -> Self {
        Self {
            item: item.into(),
            quantity,
        }
    }
}

// ============================================================================
// Flexible Ingredient Groups
// ============================================================================

/// A set of interchangeable items that jointly satisfy one requirement,
/// e.g. "Any Berry" = 3 of any mix of berries.
///
/// The catalog lists the group under its canonical (first) item name; the
/// craftability evaluator sums holdings across every member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexibleIngredientGroup {
    /// Display name such as "Any Berry".
    pub group_name: String,
    /// Ordered member items; the first is the canonical one.
    pub valid_items: Vec<String>,
    /// Total quantity needed across all members.
    pub total_required: u32,
}

impl FlexibleIngredientGroup {
    /// Create a new group.
    #[must_use]
    pub fn new<I, S>(group_name: impl Into<String>, valid_items: I, total_required: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            group_name: group_name.into(),
            valid_items: valid_items.into_iter().map(Into::into).collect(),
            total_required,
        }
    }

    /// The item name the catalog uses for this group's material entry.
    #[must_use]
    pub fn canonical_item(&self) -> Option<&str> {
        self.valid_items.first().map(String::as_str)
    }

    /// Check if an item can be used for this group.
    #[must_use]
    pub fn contains(&self, item: &str) -> bool {
        self.valid_items.iter().any(|valid| valid == item)
    }
}

/// Flexible ingredient groups per output item name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlexibleGroupIndex {
    groups: HashMap<String, Vec<FlexibleIngredientGroup>>,
}

impl FlexibleGroupIndex {
    /// Create an empty index (no substitutions anywhere).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group for an output item.
    pub fn insert(&mut self, output_item: impl Into<String>, group: FlexibleIngredientGroup) {
        self.groups.entry(output_item.into()).or_default().push(group);
    }

    /// Builder-style variant of [`Self::insert`].
    #[must_use]
    pub fn with(mut self, output_item: impl Into<String>, group: FlexibleIngredientGroup) -> Self {
        self.insert(output_item, group);
        self
    }

    /// Groups registered for an output item, in declaration order.
    #[must_use]
    pub fn groups_for(&self, output_item: &str) -> &[FlexibleIngredientGroup] {
        self.groups
            .get(output_item)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Finds the group whose canonical item is `material_item`, if the
    /// output item has one.
    #[must_use]
    pub fn canonical_group(
        &self,
        output_item: &str,
        material_item: &str,
    ) -> Option<&FlexibleIngredientGroup> {
        self.groups_for(output_item)
            .iter()
            .find(|group| group.canonical_item() == Some(material_item))
    }

    /// Number of output items with at least one group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if no groups are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// ============================================================================
// Recipe Definition
// ============================================================================

/// Errors from building a recipe.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecipeError {
    /// No output was set
    #[error("Recipe {0} has no output")]
    MissingOutput(RecipeId),
    /// Output quantity is zero
    #[error("Recipe {0} has zero output quantity")]
    ZeroOutputQuantity(RecipeId),
    /// A material quantity is zero
    #[error("Recipe {id} material '{item}' has zero quantity")]
    ZeroMaterialQuantity {
        /// Recipe identifier
        id: RecipeId,
        /// Offending material
        item: String,
    },
}

/// Result type for recipe construction.
pub type RecipeResult<T> = Result<T, RecipeError>;

impl From<RecipeError> for QuickcraftError {
    fn from(err: RecipeError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// A crafting definition mapping input materials to one output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique recipe identifier.
    pub id: RecipeId,
    /// Display name, also the search key.
    pub name: String,
    /// Category tag.
    pub category: RecipeCategory,
    /// Ordered material requirements.
    pub materials: Vec<Material>,
    /// Output item and quantity.
    pub output: RecipeOutput,
    /// Time to craft in seconds.
    #[serde(default)]
    pub crafting_time_secs: u32,
}

impl Recipe {
    /// Create a new recipe builder.
    #[must_use]
    pub fn builder(id: RecipeId, name: impl Into<String>) -> RecipeBuilder {
        RecipeBuilder::new(id, name)
    }

    /// Check if recipe matches search text.
    ///
    /// Case-insensitive substring match against the recipe name or any
    /// material item name. A blank term matches everything.
    #[must_use]
    pub fn matches_search(&self, search: &str) -> bool {
        let term = search.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term)
            || self
                .materials
                .iter()
                .any(|m| m.item.to_lowercase().contains(&term))
    }
}

/// Builder for [`Recipe`].
#[derive(Debug)]
pub struct RecipeBuilder {
    id: RecipeId,
    name: String,
    category: RecipeCategory,
    materials: Vec<Material>,
    output: Option<RecipeOutput>,
    crafting_time_secs: u32,
}

impl RecipeBuilder {
    /// Create new builder.
    fn new(id: RecipeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category: RecipeCategory::Material,
            materials: Vec::new(),
            output: None,
            crafting_time_secs: 0,
        }
    }

    /// Set category.
    #[must_use]
    pub fn category(mut self, category: impl Into<RecipeCategory>) -> Self {
        self.category = category.into();
        self
    }

    /// Add a material.
    #[must_use]
    pub fn material(mut self, item: impl Into<String>, quantity: u32) -> Self {
        self.materials.push(Material::new(item, quantity));
        self
    }

    /// Set the crafting time in seconds.
    #[must_use]
    pub const fn crafting_time(mut self, secs: u32) -> Self {
        self.crafting_time_secs = secs;
        self
    }

    /// Set output.
    #[must_use]
    pub fn output(mut self, item: impl Into<String>, quantity: u32) -> Self {
        self.output = Some(RecipeOutput::new(item, quantity));
        self
    }

    /// Build the recipe.
    pub fn build(self) -> RecipeResult<Recipe> {
        let output = self.output.ok_or(RecipeError::MissingOutput(self.id))?;
        if output.quantity == 0 {
            return Err(RecipeError::ZeroOutputQuantity(self.id));
        }
        if let Some(zero) = self.materials.iter().find(|m| m.quantity == 0) {
            return Err(RecipeError::ZeroMaterialQuantity {
                id: self.id,
                item: zero.item.clone(),
            });
        }

        Ok(Recipe {
            id: self.id,
            name: self.name,
            category: self.category.normalized(),
            materials: self.materials,
            output,
            crafting_time_secs: self.crafting_time_secs,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
