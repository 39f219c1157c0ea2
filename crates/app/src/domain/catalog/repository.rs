//! Catalog Repository

use cohort::catalog::{Category, CategoryId, Product, ProductId};
use sqlx::{QueryBuilder, Sqlite, Transaction, query, query_as, query_scalar};

const UPSERT_CATEGORY_SQL: &str = include_str!("sql/upsert_category.sql");
const UPSERT_PRODUCT_SQL: &str = include_str!("sql/upsert_product.sql");
const DELETE_PRODUCT_CATEGORIES_SQL: &str = include_str!("sql/delete_product_categories.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const GET_PRODUCT_CATEGORIES_SQL: &str = include_str!("sql/get_product_categories.sql");
const LIST_CATEGORIES_SQL: &str = include_str!("sql/list_categories.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteCatalogRepository;

impl SqliteCatalogRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn upsert_category(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        category: &Category,
    ) -> Result<(), sqlx::Error> {
        query(UPSERT_CATEGORY_SQL)
            .bind(category.id.get())
            .bind(category.parent.map(CategoryId::get))
            .bind(category.name.as_str())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Upserts the product and replaces its category assignments.
    pub(crate) async fn upsert_product(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product: &Product,
    ) -> Result<(), sqlx::Error> {
        query(UPSERT_PRODUCT_SQL)
            .bind(product.id.get())
            .bind(product.parent.map(ProductId::get))
            .execute(&mut **tx)
            .await?;

        query(DELETE_PRODUCT_CATEGORIES_SQL)
            .bind(product.id.get())
            .execute(&mut **tx)
            .await?;

        if product.categories.is_empty() {
            return Ok(());
        }

        let mut builder =
            QueryBuilder::<Sqlite>::new("INSERT OR IGNORE INTO catalog_product_categories (product_id, category_id) ");

        builder.push_values(&product.categories, |mut row, category| {
            row.push_bind(product.id.get()).push_bind(category.get());
        });

        builder.build().execute(&mut **tx).await?;

        Ok(())
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product: ProductId,
    ) -> Result<Product, sqlx::Error> {
        let (id, parent): (i64, Option<i64>) = query_as(GET_PRODUCT_SQL)
            .bind(product.get())
            .fetch_one(&mut **tx)
            .await?;

        let categories: Vec<i64> = query_scalar(GET_PRODUCT_CATEGORIES_SQL)
            .bind(id)
            .fetch_all(&mut **tx)
            .await?;

        Ok(Product {
            id: ProductId::new(id),
            parent: parent.map(ProductId::new),
            categories: categories.into_iter().map(CategoryId::new).collect(),
        })
    }

    pub(crate) async fn list_categories(&self, tx: &mut Transaction<'_, Sqlite>) -> Result<Vec<Category>, sqlx::Error> {
        let rows: Vec<(i64, Option<i64>, String)> = query_as(LIST_CATEGORIES_SQL).fetch_all(&mut **tx).await?;

        Ok(rows
            .into_iter()
            .map(|(id, parent, name)| Category {
                id: CategoryId::new(id),
                parent: parent.map(CategoryId::new),
                name,
            })
            .collect())
    }
}
