//! Category hierarchy resolution.

use std::sync::Arc;

use cohort::catalog::{CategoryId, ProductId};
use rustc_hash::FxHashSet;

use crate::domain::resolution::{errors::StoreError, store::Catalog};

/// Expands a product's categories to include every ancestor.
#[derive(Clone)]
pub struct CategoryHierarchyResolver {
    catalog: Arc<dyn Catalog>,
}

impl std::fmt::Debug for CategoryHierarchyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryHierarchyResolver").finish_non_exhaustive()
    }
}

impl CategoryHierarchyResolver {
    #[must_use]
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }

    /// Categories of `product` and all their ancestors, without duplicates.
    ///
    /// Variations take their parent's categories. An unknown product or one without
    /// categories yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    pub async fn resolve(&self, product: ProductId) -> Result<Vec<CategoryId>, StoreError> {
        let parent = self.catalog.product_parent(product).await?;

        self.resolve_with_parent(product, parent).await
    }

    /// As [`Self::resolve`], for a caller that already looked up the parent.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    pub async fn resolve_with_parent(
        &self,
        product: ProductId,
        parent: Option<ProductId>,
    ) -> Result<Vec<CategoryId>, StoreError> {
        let direct = self.catalog.product_categories(parent.unwrap_or(product)).await?;

        let mut seen = FxHashSet::default();
        let mut categories = Vec::with_capacity(direct.len());

        for category in direct {
            if !seen.insert(category) {
                continue;
            }

            categories.push(category);

            for ancestor in self.catalog.category_ancestors(category).await? {
                if seen.insert(ancestor) {
                    categories.push(ancestor);
                }
            }
        }

        Ok(categories)
    }
}
