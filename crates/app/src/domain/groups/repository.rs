//! Groups Repository

use cohort::groups::{CustomerGroup, GroupId};
use sqlx::{Sqlite, Transaction, query, query_as};

use crate::domain::groups::records::{GroupDeletion, GroupRow};

const CREATE_GROUP_SQL: &str = include_str!("sql/create_group.sql");
const LIST_GROUPS_SQL: &str = include_str!("sql/list_groups.sql");
const GET_GROUP_SQL: &str = include_str!("sql/get_group.sql");
const DELETE_GROUP_RULE_PRODUCTS_SQL: &str = include_str!("sql/delete_group_rule_products.sql");
const DELETE_GROUP_RULE_CATEGORIES_SQL: &str = include_str!("sql/delete_group_rule_categories.sql");
const DELETE_GROUP_RULES_SQL: &str = include_str!("sql/delete_group_rules.sql");
const DELETE_GROUP_ASSIGNMENTS_SQL: &str = include_str!("sql/delete_group_assignments.sql");
const DELETE_GROUP_SQL: &str = include_str!("sql/delete_group.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteGroupsRepository;

impl SqliteGroupsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_group(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        name: &str,
        description: &str,
    ) -> Result<CustomerGroup, sqlx::Error> {
        let GroupRow(group) = query_as::<Sqlite, GroupRow>(CREATE_GROUP_SQL)
            .bind(name)
            .bind(description)
            .fetch_one(&mut **tx)
            .await?;

        Ok(group)
    }

    pub(crate) async fn list_groups(&self, tx: &mut Transaction<'_, Sqlite>) -> Result<Vec<CustomerGroup>, sqlx::Error> {
        let rows = query_as::<Sqlite, GroupRow>(LIST_GROUPS_SQL)
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|GroupRow(group)| group).collect())
    }

    pub(crate) async fn get_group(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        group: GroupId,
    ) -> Result<CustomerGroup, sqlx::Error> {
        let GroupRow(group) = query_as::<Sqlite, GroupRow>(GET_GROUP_SQL)
            .bind(group.get())
            .fetch_one(&mut **tx)
            .await?;

        Ok(group)
    }

    /// Removes the group's rules, their associations and its user assignments, then
    /// the group itself. `None` when the group does not exist.
    pub(crate) async fn delete_group(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        group: GroupId,
    ) -> Result<Option<GroupDeletion>, sqlx::Error> {
        for sql in [DELETE_GROUP_RULE_PRODUCTS_SQL, DELETE_GROUP_RULE_CATEGORIES_SQL] {
            query(sql).bind(group.get()).execute(&mut **tx).await?;
        }

        let rules = query(DELETE_GROUP_RULES_SQL)
            .bind(group.get())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        let assignments = query(DELETE_GROUP_ASSIGNMENTS_SQL)
            .bind(group.get())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        let deleted = query(DELETE_GROUP_SQL)
            .bind(group.get())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok((deleted > 0).then_some(GroupDeletion { rules, assignments }))
    }
}
