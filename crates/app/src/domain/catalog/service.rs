//! Catalog service.

use async_trait::async_trait;
use cohort::catalog::{Category, Product, ProductId};
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::catalog::{errors::CatalogServiceError, repository::SqliteCatalogRepository},
};

#[derive(Debug, Clone)]
pub struct SqliteCatalogService {
    db: Db,
    repository: SqliteCatalogRepository,
}

impl SqliteCatalogService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: SqliteCatalogRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogService for SqliteCatalogService {
    #[tracing::instrument(
        name = "catalog.service.upsert_categories",
        skip(self, categories),
        fields(category_count = categories.len()),
        err
    )]
    async fn upsert_categories(&self, categories: Vec<Category>) -> Result<(), CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        for category in &categories {
            self.repository.upsert_category(&mut tx, category).await?;
        }

        tx.commit().await?;

        info!(count = categories.len(), "synchronised catalog categories");

        Ok(())
    }

    #[tracing::instrument(
        name = "catalog.service.upsert_products",
        skip(self, products),
        fields(product_count = products.len()),
        err
    )]
    async fn upsert_products(&self, products: Vec<Product>) -> Result<(), CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        for product in &products {
            self.repository.upsert_product(&mut tx, product).await?;
        }

        tx.commit().await?;

        info!(count = products.len(), "synchronised catalog products");

        Ok(())
    }

    async fn get_product(&self, product: ProductId) -> Result<Product, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let categories = self.repository.list_categories(&mut tx).await?;

        tx.commit().await?;

        Ok(categories)
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Inserts or replaces categories.
    async fn upsert_categories(&self, categories: Vec<Category>) -> Result<(), CatalogServiceError>;

    /// Inserts or replaces products together with their category assignments.
    async fn upsert_products(&self, products: Vec<Product>) -> Result<(), CatalogServiceError>;

    /// Retrieve a single product with its directly assigned categories.
    async fn get_product(&self, product: ProductId) -> Result<Product, CatalogServiceError>;

    /// Retrieves every category in id order.
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogServiceError>;
}

#[cfg(test)]
mod tests {
    use cohort::catalog::CategoryId;
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    fn product(id: i64, parent: Option<i64>, categories: &[i64]) -> Product {
        Product {
            id: ProductId::new(id),
            parent: parent.map(ProductId::new),
            categories: categories.iter().copied().map(CategoryId::new).collect(),
        }
    }

    #[tokio::test]
    async fn upsert_products_replaces_categories() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.catalog.upsert_products(vec![product(100, None, &[10, 11])]).await?;
        ctx.catalog.upsert_products(vec![product(100, None, &[20])]).await?;

        assert_eq!(ctx.catalog.get_product(ProductId::new(100)).await?, product(100, None, &[20]));

        Ok(())
    }

    #[tokio::test]
    async fn variations_keep_their_parent() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.catalog
            .upsert_products(vec![product(110, None, &[11]), product(111, Some(110), &[])])
            .await?;

        assert_eq!(ctx.catalog.get_product(ProductId::new(111)).await?, product(111, Some(110), &[]));

        Ok(())
    }

    #[tokio::test]
    async fn upsert_categories_overwrites_parent_and_name() -> TestResult {
        let ctx = TestContext::new().await;

        let mut shirts = Category {
            id: CategoryId::new(11),
            parent: None,
            name: "Shirts".to_string(),
        };

        ctx.catalog.upsert_categories(vec![shirts.clone()]).await?;

        shirts.parent = Some(CategoryId::new(10));
        shirts.name = "T-Shirts".to_string();

        ctx.catalog.upsert_categories(vec![shirts.clone()]).await?;

        assert_eq!(ctx.catalog.list_categories().await?, vec![shirts]);

        Ok(())
    }

    #[tokio::test]
    async fn get_product_unknown_id_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.catalog.get_product(ProductId::new(404)).await;

        assert!(
            matches!(result, Err(CatalogServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
