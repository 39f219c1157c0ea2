//! Maintenance Repository

use sqlx::{Sqlite, Transaction, query};

use crate::domain::maintenance::records::OrphanCleanup;

const DELETE_ORPHAN_ASSIGNMENTS_SQL: &str = include_str!("sql/delete_orphan_assignments.sql");
const DELETE_ORPHAN_RULE_PRODUCTS_SQL: &str = include_str!("sql/delete_orphan_rule_products.sql");
const DELETE_ORPHAN_RULE_CATEGORIES_SQL: &str = include_str!("sql/delete_orphan_rule_categories.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteMaintenanceRepository;

impl SqliteMaintenanceRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn delete_orphans(&self, tx: &mut Transaction<'_, Sqlite>) -> Result<OrphanCleanup, sqlx::Error> {
        let assignments = query(DELETE_ORPHAN_ASSIGNMENTS_SQL)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        let product_links = query(DELETE_ORPHAN_RULE_PRODUCTS_SQL)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        let category_links = query(DELETE_ORPHAN_RULE_CATEGORIES_SQL)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(OrphanCleanup {
            assignments,
            product_links,
            category_links,
        })
    }
}
