//! Engine-facing store queries.
//!
//! The resolver only sees these traits. [`SqliteRuleStore`] answers all of them from
//! the application database; tests substitute mocks.

use async_trait::async_trait;
use cohort::{
    catalog::{CategoryId, ProductId},
    groups::{GroupId, UserId},
    precedence::select_winner,
    rules::PricingRule,
};
use jiff::Timestamp;
use mockall::automock;
use sqlx::{FromRow, Row, query_as, query_scalar, sqlite::SqliteRow};

use crate::{
    database::{Db, to_millis},
    domain::{resolution::errors::StoreError, rules::records::RuleRow},
};

const GET_USER_GROUP_SQL: &str = include_str!("sql/get_user_group.sql");
const GET_GROUP_NAME_SQL: &str = include_str!("sql/get_group_name.sql");
const ACTIVE_PRODUCT_RULES_SQL: &str = include_str!("sql/active_product_rules.sql");
const ACTIVE_CATEGORY_RULES_SQL: &str = include_str!("sql/active_category_rules.sql");
const GROUP_HAS_ACTIVE_RULES_SQL: &str = include_str!("sql/group_has_active_rules.sql");
const GET_PRODUCT_PARENT_SQL: &str = include_str!("sql/get_product_parent.sql");
const GET_PRODUCT_CATEGORIES_SQL: &str = include_str!("sql/get_product_categories.sql");
const CATEGORY_ANCESTORS_SQL: &str = include_str!("sql/category_ancestors.sql");

#[automock]
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    /// The group a user is explicitly assigned to.
    async fn user_group(&self, user: UserId) -> Result<Option<GroupId>, StoreError>;

    /// Display name of a group, `None` if it does not exist.
    async fn group_name(&self, group: GroupId) -> Result<Option<String>, StoreError>;
}

#[automock]
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// The eligible product rule of `group` for the most specific of `products`.
    ///
    /// `products` is ordered most specific first (a variation, then its parent). Only
    /// rules attached to the first id that has any are considered, and the
    /// precedence order picks one among them.
    async fn active_product_rule(
        &self,
        products: &[ProductId],
        group: GroupId,
        at: Timestamp,
    ) -> Result<Option<PricingRule>, StoreError>;

    /// Every eligible rule of `group` attached to any of `categories`, most recently
    /// created first. A rule attached to several of the categories appears once.
    async fn active_category_rules(
        &self,
        categories: &[CategoryId],
        group: GroupId,
        at: Timestamp,
    ) -> Result<Vec<PricingRule>, StoreError>;

    /// Whether `group` has at least one eligible rule at `at`.
    async fn group_has_active_rules(&self, group: GroupId, at: Timestamp) -> Result<bool, StoreError>;
}

#[automock]
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Parent of a variation; `None` for simple products and unknown ids.
    async fn product_parent(&self, product: ProductId) -> Result<Option<ProductId>, StoreError>;

    /// Directly assigned categories.
    async fn product_categories(&self, product: ProductId) -> Result<Vec<CategoryId>, StoreError>;

    /// Ancestors of a category, nearest first, excluding the category itself.
    async fn category_ancestors(&self, category: CategoryId) -> Result<Vec<CategoryId>, StoreError>;
}

/// A rule together with the candidate product id it matched.
struct ProductRuleRow {
    matched: ProductId,
    rule: PricingRule,
}

impl<'r> FromRow<'r, SqliteRow> for ProductRuleRow {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let RuleRow(rule) = RuleRow::from_row(row)?;

        Ok(Self {
            matched: ProductId::new(row.try_get("matched_product")?),
            rule,
        })
    }
}

/// Engine queries over the application database.
#[derive(Debug, Clone)]
pub struct SqliteRuleStore {
    db: Db,
}

impl SqliteRuleStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

/// Id list bound as a JSON array and expanded with `json_each`.
fn id_list(ids: impl IntoIterator<Item = i64>) -> Result<String, StoreError> {
    Ok(serde_json::to_string(&ids.into_iter().collect::<Vec<_>>())?)
}

#[async_trait]
impl GroupDirectory for SqliteRuleStore {
    async fn user_group(&self, user: UserId) -> Result<Option<GroupId>, StoreError> {
        let group: Option<i64> = query_scalar(GET_USER_GROUP_SQL)
            .bind(user.get())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(group.map(GroupId::new))
    }

    async fn group_name(&self, group: GroupId) -> Result<Option<String>, StoreError> {
        let name: Option<String> = query_scalar(GET_GROUP_NAME_SQL)
            .bind(group.get())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(name)
    }
}

#[async_trait]
impl RuleStore for SqliteRuleStore {
    #[tracing::instrument(name = "store.active_product_rule", skip(self, products), fields(group_id = %group), err)]
    async fn active_product_rule(
        &self,
        products: &[ProductId],
        group: GroupId,
        at: Timestamp,
    ) -> Result<Option<PricingRule>, StoreError> {
        if products.is_empty() {
            return Ok(None);
        }

        let at = to_millis(at);

        let rows = query_as::<_, ProductRuleRow>(ACTIVE_PRODUCT_RULES_SQL)
            .bind(group.get())
            .bind(id_list(products.iter().map(|product| product.get()))?)
            .bind(at)
            .bind(at)
            .fetch_all(self.db.pool())
            .await?;

        let winner = products.iter().find_map(|candidate| {
            select_winner(
                rows.iter()
                    .filter(|row| row.matched == *candidate)
                    .map(|row| &row.rule),
            )
        });

        Ok(winner.cloned())
    }

    #[tracing::instrument(
        name = "store.active_category_rules",
        skip(self, categories),
        fields(group_id = %group, category_count = categories.len()),
        err
    )]
    async fn active_category_rules(
        &self,
        categories: &[CategoryId],
        group: GroupId,
        at: Timestamp,
    ) -> Result<Vec<PricingRule>, StoreError> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }

        let at = to_millis(at);

        let rows = query_as::<_, RuleRow>(ACTIVE_CATEGORY_RULES_SQL)
            .bind(group.get())
            .bind(id_list(categories.iter().map(|category| category.get()))?)
            .bind(at)
            .bind(at)
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.into_iter().map(|RuleRow(rule)| rule).collect())
    }

    async fn group_has_active_rules(&self, group: GroupId, at: Timestamp) -> Result<bool, StoreError> {
        let at = to_millis(at);

        let exists: bool = query_scalar(GROUP_HAS_ACTIVE_RULES_SQL)
            .bind(group.get())
            .bind(at)
            .bind(at)
            .fetch_one(self.db.pool())
            .await?;

        Ok(exists)
    }
}

#[async_trait]
impl Catalog for SqliteRuleStore {
    async fn product_parent(&self, product: ProductId) -> Result<Option<ProductId>, StoreError> {
        let parent: Option<Option<i64>> = query_scalar(GET_PRODUCT_PARENT_SQL)
            .bind(product.get())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(parent.flatten().map(ProductId::new))
    }

    async fn product_categories(&self, product: ProductId) -> Result<Vec<CategoryId>, StoreError> {
        let categories: Vec<i64> = query_scalar(GET_PRODUCT_CATEGORIES_SQL)
            .bind(product.get())
            .fetch_all(self.db.pool())
            .await?;

        Ok(categories.into_iter().map(CategoryId::new).collect())
    }

    async fn category_ancestors(&self, category: CategoryId) -> Result<Vec<CategoryId>, StoreError> {
        let ancestors: Vec<i64> = query_scalar(CATEGORY_ANCESTORS_SQL)
            .bind(category.get())
            .fetch_all(self.db.pool())
            .await?;

        Ok(ancestors.into_iter().map(CategoryId::new).collect())
    }
}
