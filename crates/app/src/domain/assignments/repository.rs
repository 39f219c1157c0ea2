//! Assignments Repository

use cohort::groups::{GroupId, UserId};
use sqlx::{QueryBuilder, Sqlite, Transaction, query_scalar};

const GET_USER_GROUP_SQL: &str = include_str!("sql/get_user_group.sql");
const LIST_GROUP_USERS_SQL: &str = include_str!("sql/list_group_users.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteAssignmentsRepository;

impl SqliteAssignmentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Upserts one chunk of assignments. An existing assignment is moved to `group`.
    pub(crate) async fn assign_users(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        users: &[UserId],
        group: GroupId,
    ) -> Result<u64, sqlx::Error> {
        if users.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::<Sqlite>::new("INSERT INTO user_groups (user_id, group_id) ");

        builder.push_values(users, |mut row, user| {
            row.push_bind(user.get()).push_bind(group.get());
        });

        builder.push(" ON CONFLICT (user_id) DO UPDATE SET group_id = excluded.group_id");

        Ok(builder.build().execute(&mut **tx).await?.rows_affected())
    }

    pub(crate) async fn unassign_users(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        users: &[UserId],
    ) -> Result<u64, sqlx::Error> {
        if users.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::<Sqlite>::new("DELETE FROM user_groups WHERE user_id IN (");
        let mut ids = builder.separated(", ");

        for user in users {
            ids.push_bind(user.get());
        }

        builder.push(")");

        Ok(builder.build().execute(&mut **tx).await?.rows_affected())
    }

    pub(crate) async fn user_group(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        user: UserId,
    ) -> Result<Option<GroupId>, sqlx::Error> {
        let group: Option<i64> = query_scalar(GET_USER_GROUP_SQL)
            .bind(user.get())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(group.map(GroupId::new))
    }

    pub(crate) async fn users_in_group(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        group: GroupId,
    ) -> Result<Vec<UserId>, sqlx::Error> {
        let users: Vec<i64> = query_scalar(LIST_GROUP_USERS_SQL)
            .bind(group.get())
            .fetch_all(&mut **tx)
            .await?;

        Ok(users.into_iter().map(UserId::new).collect())
    }
}
