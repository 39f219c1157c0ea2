//! Rules Repository

use cohort::{
    catalog::{CategoryId, ProductId},
    discounts::DiscountType,
    groups::GroupId,
    rules::{PricingRule, RuleId},
    schedule::Schedule,
};
use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use sqlx::{QueryBuilder, Sqlite, Transaction, query, query_as, query_scalar};

use crate::{
    database::to_millis,
    domain::rules::records::{ConflictScope, RuleConflict, RuleRecord, RuleRow},
};

const NEXT_SORT_ORDER_SQL: &str = include_str!("sql/next_sort_order.sql");
const CREATE_RULE_SQL: &str = include_str!("sql/create_rule.sql");
const UPDATE_RULE_SQL: &str = include_str!("sql/update_rule.sql");
const UPDATE_SCHEDULE_SQL: &str = include_str!("sql/update_schedule.sql");
const SET_RULE_ACTIVE_SQL: &str = include_str!("sql/set_rule_active.sql");
const GET_RULE_ACTIVE_SQL: &str = include_str!("sql/get_rule_active.sql");
const SET_ALL_RULES_ACTIVE_SQL: &str = include_str!("sql/set_all_rules_active.sql");
const SET_SORT_ORDER_SQL: &str = include_str!("sql/set_sort_order.sql");
const DELETE_RULE_PRODUCTS_SQL: &str = include_str!("sql/delete_rule_products.sql");
const DELETE_RULE_CATEGORIES_SQL: &str = include_str!("sql/delete_rule_categories.sql");
const DELETE_RULE_SQL: &str = include_str!("sql/delete_rule.sql");
const DELETE_ALL_RULE_PRODUCTS_SQL: &str = include_str!("sql/delete_all_rule_products.sql");
const DELETE_ALL_RULE_CATEGORIES_SQL: &str = include_str!("sql/delete_all_rule_categories.sql");
const DELETE_ALL_RULES_SQL: &str = include_str!("sql/delete_all_rules.sql");
const GET_RULE_SQL: &str = include_str!("sql/get_rule.sql");
const LIST_RULES_SQL: &str = include_str!("sql/list_rules.sql");
const GET_RULE_PRODUCTS_SQL: &str = include_str!("sql/get_rule_products.sql");
const GET_RULE_CATEGORIES_SQL: &str = include_str!("sql/get_rule_categories.sql");
const LIST_RULE_PRODUCTS_SQL: &str = include_str!("sql/list_rule_products.sql");
const LIST_RULE_CATEGORIES_SQL: &str = include_str!("sql/list_rule_categories.sql");
const PRODUCT_CONFLICTS_SQL: &str = include_str!("sql/product_conflicts.sql");
const CATEGORY_CONFLICTS_SQL: &str = include_str!("sql/category_conflicts.sql");

/// Discount values are stored with two decimal places.
fn stored_value(value: Decimal) -> String {
    value.round_dp(2).to_string()
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteRulesRepository;

impl SqliteRulesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn next_sort_order(&self, tx: &mut Transaction<'_, Sqlite>) -> Result<i64, sqlx::Error> {
        query_scalar(NEXT_SORT_ORDER_SQL).fetch_one(&mut **tx).await
    }

    #[expect(clippy::too_many_arguments, reason = "one column per argument")]
    pub(crate) async fn create_rule(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        group: GroupId,
        discount_type: DiscountType,
        discount_value: Decimal,
        is_active: bool,
        schedule: Schedule,
        created_at: Timestamp,
        sort_order: i64,
    ) -> Result<RuleId, sqlx::Error> {
        let id: i64 = query_scalar(CREATE_RULE_SQL)
            .bind(group.get())
            .bind(discount_type.as_str())
            .bind(stored_value(discount_value))
            .bind(is_active)
            .bind(schedule.start().map(to_millis))
            .bind(schedule.end().map(to_millis))
            .bind(to_millis(created_at))
            .bind(sort_order)
            .fetch_one(&mut **tx)
            .await?;

        Ok(RuleId::new(id))
    }

    pub(crate) async fn update_rule(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        rule: RuleId,
        group: GroupId,
        discount_type: DiscountType,
        discount_value: Decimal,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_RULE_SQL)
            .bind(group.get())
            .bind(discount_type.as_str())
            .bind(stored_value(discount_value))
            .bind(rule.get())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn update_schedule(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        rule: RuleId,
        schedule: Schedule,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_SCHEDULE_SQL)
            .bind(schedule.start().map(to_millis))
            .bind(schedule.end().map(to_millis))
            .bind(rule.get())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn set_rule_active(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        rule: RuleId,
        active: bool,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_RULE_ACTIVE_SQL)
            .bind(active)
            .bind(rule.get())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn get_rule_active(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        rule: RuleId,
    ) -> Result<bool, sqlx::Error> {
        query_scalar(GET_RULE_ACTIVE_SQL)
            .bind(rule.get())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_all_rules_active(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        active: bool,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_ALL_RULES_ACTIVE_SQL)
            .bind(active)
            .bind(active)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn set_sort_order(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        rule: RuleId,
        sort_order: i64,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_SORT_ORDER_SQL)
            .bind(sort_order)
            .bind(rule.get())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn replace_products(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        rule: RuleId,
        products: &[ProductId],
    ) -> Result<(), sqlx::Error> {
        query(DELETE_RULE_PRODUCTS_SQL)
            .bind(rule.get())
            .execute(&mut **tx)
            .await?;

        if products.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<Sqlite>::new("INSERT INTO rule_products (rule_id, product_id) ");

        builder.push_values(products, |mut row, product| {
            row.push_bind(rule.get()).push_bind(product.get());
        });

        builder.build().execute(&mut **tx).await?;

        Ok(())
    }

    pub(crate) async fn replace_categories(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        rule: RuleId,
        categories: &[CategoryId],
    ) -> Result<(), sqlx::Error> {
        query(DELETE_RULE_CATEGORIES_SQL)
            .bind(rule.get())
            .execute(&mut **tx)
            .await?;

        if categories.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<Sqlite>::new("INSERT INTO rule_categories (rule_id, category_id) ");

        builder.push_values(categories, |mut row, category| {
            row.push_bind(rule.get()).push_bind(category.get());
        });

        builder.build().execute(&mut **tx).await?;

        Ok(())
    }

    pub(crate) async fn delete_rule(&self, tx: &mut Transaction<'_, Sqlite>, rule: RuleId) -> Result<u64, sqlx::Error> {
        query(DELETE_RULE_PRODUCTS_SQL)
            .bind(rule.get())
            .execute(&mut **tx)
            .await?;

        query(DELETE_RULE_CATEGORIES_SQL)
            .bind(rule.get())
            .execute(&mut **tx)
            .await?;

        let rows_affected = query(DELETE_RULE_SQL)
            .bind(rule.get())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_all_rules(&self, tx: &mut Transaction<'_, Sqlite>) -> Result<u64, sqlx::Error> {
        query(DELETE_ALL_RULE_PRODUCTS_SQL).execute(&mut **tx).await?;
        query(DELETE_ALL_RULE_CATEGORIES_SQL).execute(&mut **tx).await?;

        let rows_affected = query(DELETE_ALL_RULES_SQL).execute(&mut **tx).await?.rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn get_rule(&self, tx: &mut Transaction<'_, Sqlite>, rule: RuleId) -> Result<RuleRecord, sqlx::Error> {
        let RuleRow(found) = query_as::<Sqlite, RuleRow>(GET_RULE_SQL)
            .bind(rule.get())
            .fetch_one(&mut **tx)
            .await?;

        let products: Vec<i64> = query_scalar(GET_RULE_PRODUCTS_SQL)
            .bind(rule.get())
            .fetch_all(&mut **tx)
            .await?;

        let categories: Vec<i64> = query_scalar(GET_RULE_CATEGORIES_SQL)
            .bind(rule.get())
            .fetch_all(&mut **tx)
            .await?;

        Ok(RuleRecord {
            rule: found,
            products: products.into_iter().map(ProductId::new).collect(),
            categories: categories.into_iter().map(CategoryId::new).collect(),
        })
    }

    pub(crate) async fn list_rules(&self, tx: &mut Transaction<'_, Sqlite>) -> Result<Vec<RuleRecord>, sqlx::Error> {
        let rules: Vec<PricingRule> = query_as::<Sqlite, RuleRow>(LIST_RULES_SQL)
            .fetch_all(&mut **tx)
            .await?
            .into_iter()
            .map(|RuleRow(rule)| rule)
            .collect();

        let product_links: Vec<(i64, i64)> = query_as(LIST_RULE_PRODUCTS_SQL).fetch_all(&mut **tx).await?;
        let category_links: Vec<(i64, i64)> = query_as(LIST_RULE_CATEGORIES_SQL).fetch_all(&mut **tx).await?;

        let mut products: FxHashMap<i64, Vec<ProductId>> = FxHashMap::default();
        let mut categories: FxHashMap<i64, Vec<CategoryId>> = FxHashMap::default();

        for (rule, product) in product_links {
            products.entry(rule).or_default().push(ProductId::new(product));
        }

        for (rule, category) in category_links {
            categories.entry(rule).or_default().push(CategoryId::new(category));
        }

        Ok(rules
            .into_iter()
            .map(|rule| RuleRecord {
                products: products.remove(&rule.id.get()).unwrap_or_default(),
                categories: categories.remove(&rule.id.get()).unwrap_or_default(),
                rule,
            })
            .collect())
    }

    pub(crate) async fn rule_conflicts(&self, tx: &mut Transaction<'_, Sqlite>) -> Result<Vec<RuleConflict>, sqlx::Error> {
        let product_rows: Vec<(i64, i64, i64)> = query_as(PRODUCT_CONFLICTS_SQL).fetch_all(&mut **tx).await?;
        let category_rows: Vec<(i64, i64, i64)> = query_as(CATEGORY_CONFLICTS_SQL).fetch_all(&mut **tx).await?;

        let mut conflicts = group_conflicts(product_rows, |id| ConflictScope::Product(ProductId::new(id)));

        conflicts.extend(group_conflicts(category_rows, |id| {
            ConflictScope::Category(CategoryId::new(id))
        }));

        Ok(conflicts)
    }
}

/// Fold `(group, target, rule)` rows, already sorted by group and target, into one
/// conflict per target.
fn group_conflicts(rows: Vec<(i64, i64, i64)>, scope: impl Fn(i64) -> ConflictScope) -> Vec<RuleConflict> {
    let mut conflicts: Vec<RuleConflict> = Vec::new();

    for (group, target, rule) in rows {
        let group = GroupId::new(group);
        let target = scope(target);

        match conflicts.last_mut() {
            Some(last) if last.group == group && last.scope == target => last.rules.push(RuleId::new(rule)),
            _ => conflicts.push(RuleConflict {
                group,
                scope: target,
                rules: vec![RuleId::new(rule)],
            }),
        }
    }

    conflicts
}
