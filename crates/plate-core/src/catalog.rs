//! Static ingredient catalog
//!
//! The catalog is immutable once built and keeps an id → entry index so that
//! lookups of unknown ids are an explicit `None` rather than a scan miss.

use crate::error::CatalogError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Broad food grouping, mirroring the impact service's categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Meat,
    #[default]
    Plant,
    Fruit,
    Drink,
}

/// Catalog-defined ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Stable string key
    pub id: String,
    /// Display label
    pub name: String,
    /// Sprite reference
    pub image_asset: String,
    /// Sprite centre, percent from the left of the plate canvas
    pub plate_x: f32,
    /// Sprite centre, percent from the top of the plate canvas
    pub plate_y: f32,
    /// Nominal sprite width/height in px before scaling
    pub base_size: f32,
    /// Fixed display rotation in degrees
    #[serde(default)]
    pub rotation: Option<f32>,
    /// Identifier understood by the impact service
    pub remote_id: u32,
    #[serde(default)]
    pub category: Category,
}

impl Ingredient {
    /// Create ingredient with the conventional `/images/<id>.png` asset
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        remote_id: u32,
        plate_x: f32,
        plate_y: f32,
        base_size: f32,
    ) -> Self {
        let id = id.into();
        Self {
            image_asset: format!("/images/{id}.png"),
            id,
            name: name.into(),
            plate_x,
            plate_y,
            base_size,
            rotation: None,
            remote_id,
            category: Category::default(),
        }
    }

    /// With fixed rotation
    #[inline]
    #[must_use]
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = Some(degrees);
        self
    }

    /// With category
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.id.is_empty() {
            return Err(CatalogError::EmptyId);
        }
        for (axis, value) in [("plate_x", self.plate_x), ("plate_y", self.plate_y)] {
            if !(0.0..=100.0).contains(&value) {
                return Err(CatalogError::CoordinateOutOfRange {
                    id: self.id.clone(),
                    axis,
                    value,
                });
            }
        }
        if self.base_size.is_nan() || self.base_size <= 0.0 {
            return Err(CatalogError::InvalidBaseSize {
                id: self.id.clone(),
                value: self.base_size,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(rename = "ingredient", default)]
    ingredients: Vec<Ingredient>,
}

/// Immutable, indexed ingredient catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: IndexMap<String, Ingredient>,
    by_remote: HashMap<u32, usize>,
}

impl Catalog {
    /// Build catalog, rejecting duplicates and malformed entries
    ///
    /// # Errors
    /// - `CatalogError::DuplicateId` / `DuplicateRemoteId` on repeated keys
    /// - `CatalogError::EmptyId`, `CoordinateOutOfRange`, `InvalidBaseSize` on bad entries
    pub fn new(ingredients: impl IntoIterator<Item = Ingredient>) -> Result<Self, CatalogError> {
        let mut entries: IndexMap<String, Ingredient> = IndexMap::new();
        let mut by_remote: HashMap<u32, usize> = HashMap::new();

        for ingredient in ingredients {
            ingredient.validate()?;

            if entries.contains_key(&ingredient.id) {
                return Err(CatalogError::DuplicateId(ingredient.id));
            }
            if let Some(&idx) = by_remote.get(&ingredient.remote_id) {
                let first = entries
                    .get_index(idx)
                    .map(|(id, _)| id.clone())
                    .unwrap_or_default();
                return Err(CatalogError::DuplicateRemoteId {
                    remote_id: ingredient.remote_id,
                    first,
                    second: ingredient.id,
                });
            }

            by_remote.insert(ingredient.remote_id, entries.len());
            entries.insert(ingredient.id.clone(), ingredient);
        }

        Ok(Self { entries, by_remote })
    }

    /// Parse catalog from TOML `[[ingredient]]` tables
    ///
    /// # Errors
    /// Parse failures and any validation error from [`Catalog::new`].
    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(source)?;
        Self::new(file.ingredients)
    }

    /// Load catalog from a TOML file
    ///
    /// # Errors
    /// I/O, parse and validation failures.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Plate-able subset of the impact service's catalog
    ///
    /// Remote ids follow the service's generated ordering, so e.g. chicken
    /// (poultry meat) is 13.
    #[must_use]
    pub fn builtin() -> Self {
        use Category::{Fruit, Meat};

        let ingredients = vec![
            Ingredient::new("bread", "Bread", 1, 40.0, 55.0, 110.0),
            Ingredient::new("rice", "Rice", 3, 35.0, 35.0, 115.0),
            Ingredient::new("potatoes", "Potatoes", 4, 30.0, 62.0, 100.0),
            Ingredient::new("peas", "Peas", 5, 50.0, 72.0, 80.0),
            Ingredient::new("banana", "Banana", 6, 70.0, 70.0, 105.0)
                .with_rotation(25.0)
                .with_category(Fruit),
            Ingredient::new("apple", "Apple", 7, 76.0, 52.0, 75.0).with_category(Fruit),
            Ingredient::new("beef", "Beef", 10, 58.0, 30.0, 115.0).with_category(Meat),
            Ingredient::new("lamb", "Lamb", 11, 45.0, 26.0, 110.0).with_category(Meat),
            Ingredient::new("pork", "Pork", 12, 64.0, 58.0, 110.0).with_category(Meat),
            Ingredient::new("chicken", "Chicken", 13, 62.0, 45.0, 120.0).with_category(Meat),
            Ingredient::new("cheese", "Cheese", 14, 28.0, 45.0, 80.0),
            Ingredient::new("eggs", "Eggs", 15, 50.0, 50.0, 90.0),
            Ingredient::new("fish", "Fish", 16, 52.0, 40.0, 125.0)
                .with_rotation(-15.0)
                .with_category(Meat),
        ];

        // The literal above is checked by `builtin_catalog_is_valid`.
        Self::new(ingredients).unwrap_or_else(|e| {
            tracing::error!("built-in catalog rejected: {}", e);
            Self::empty()
        })
    }

    /// Catalog with no entries
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
            by_remote: HashMap::new(),
        }
    }

    /// Look up ingredient by id
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Ingredient> {
        self.entries.get(id)
    }

    /// Look up ingredient by remote id
    #[inline]
    #[must_use]
    pub fn by_remote_id(&self, remote_id: u32) -> Option<&Ingredient> {
        self.by_remote
            .get(&remote_id)
            .and_then(|&idx| self.entries.get_index(idx))
            .map(|(_, ingredient)| ingredient)
    }

    /// Check if id is present
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Iterate in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.entries.values()
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if catalog is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
