//! Catalog

use serde::{Deserialize, Serialize};

use crate::ids::TypedId;

/// Product id
pub type ProductId = TypedId<Product>;

/// Category id
pub type CategoryId = TypedId<Category>;

/// A catalog product as seen by the pricing engine.
///
/// Variations carry the id of the product they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Parent product, for variations
    #[serde(default)]
    pub parent: Option<ProductId>,

    /// Directly assigned categories
    #[serde(default)]
    pub categories: Vec<CategoryId>,
}

impl Product {
    /// Whether this product is a variation of another product.
    pub fn is_variation(&self) -> bool {
        self.parent.is_some()
    }
}

/// A node in the category taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category id
    pub id: CategoryId,

    /// Parent category; `None` for a root
    #[serde(default)]
    pub parent: Option<CategoryId>,

    /// Category name
    #[serde(default)]
    pub name: String,
}
