//! Assignments service.

use async_trait::async_trait;
use cohort::groups::{GroupId, UserId};
use mockall::automock;
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::assignments::{errors::AssignmentsServiceError, repository::SqliteAssignmentsRepository},
};

/// Upper bound on users written by a single statement.
pub const ASSIGNMENT_CHUNK_SIZE: usize = 1000;

#[derive(Debug, Clone)]
pub struct SqliteAssignmentsService {
    db: Db,
    repository: SqliteAssignmentsRepository,
}

impl SqliteAssignmentsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: SqliteAssignmentsRepository::new(),
        }
    }
}

/// Sorted, de-duplicated user ids. Fails on the first id that cannot belong to a
/// registered shopper.
fn checked_users(users: &[UserId]) -> Result<Vec<UserId>, AssignmentsServiceError> {
    if users.is_empty() {
        return Err(AssignmentsServiceError::NoUsers);
    }

    if let Some(user) = users.iter().find(|user| user.get() <= 0) {
        return Err(AssignmentsServiceError::InvalidUser(*user));
    }

    let mut users = users.to_vec();

    users.sort_unstable();
    users.dedup();

    Ok(users)
}

#[async_trait]
impl AssignmentsService for SqliteAssignmentsService {
    #[tracing::instrument(
        name = "assignments.service.assign_users",
        skip(self, users),
        fields(group_id = %group, user_count = users.len()),
        err
    )]
    async fn assign_users(&self, users: Vec<UserId>, group: GroupId) -> Result<u64, AssignmentsServiceError> {
        let users = checked_users(&users)?;
        let mut tx = self.db.begin().await?;
        let mut assigned = 0;

        for (index, chunk) in users.chunks(ASSIGNMENT_CHUNK_SIZE).enumerate() {
            assigned += self.repository.assign_users(&mut tx, chunk, group).await?;

            debug!(chunk = index, size = chunk.len(), "assigned user chunk");
        }

        tx.commit().await?;

        info!(group_id = %group, assigned, "assigned users to group");

        Ok(assigned)
    }

    #[tracing::instrument(
        name = "assignments.service.unassign_users",
        skip(self, users),
        fields(user_count = users.len()),
        err
    )]
    async fn unassign_users(&self, users: Vec<UserId>) -> Result<u64, AssignmentsServiceError> {
        let users = checked_users(&users)?;
        let mut tx = self.db.begin().await?;
        let mut removed = 0;

        for chunk in users.chunks(ASSIGNMENT_CHUNK_SIZE) {
            removed += self.repository.unassign_users(&mut tx, chunk).await?;
        }

        tx.commit().await?;

        info!(removed, "removed user group assignments");

        Ok(removed)
    }

    async fn user_group(&self, user: UserId) -> Result<Option<GroupId>, AssignmentsServiceError> {
        let mut tx = self.db.begin().await?;

        let group = self.repository.user_group(&mut tx, user).await?;

        tx.commit().await?;

        Ok(group)
    }

    async fn users_in_group(&self, group: GroupId) -> Result<Vec<UserId>, AssignmentsServiceError> {
        let mut tx = self.db.begin().await?;

        let users = self.repository.users_in_group(&mut tx, group).await?;

        tx.commit().await?;

        Ok(users)
    }
}

#[automock]
#[async_trait]
pub trait AssignmentsService: Send + Sync {
    /// Places every user in `group`, replacing any existing assignment. Users are
    /// written in chunks inside one transaction: either all are assigned or none.
    async fn assign_users(&self, users: Vec<UserId>, group: GroupId) -> Result<u64, AssignmentsServiceError>;

    /// Removes the users' assignments, returning how many existed.
    async fn unassign_users(&self, users: Vec<UserId>) -> Result<u64, AssignmentsServiceError>;

    /// The group a user is explicitly assigned to.
    async fn user_group(&self, user: UserId) -> Result<Option<GroupId>, AssignmentsServiceError>;

    /// Users assigned to a group, in id order.
    async fn users_in_group(&self, group: GroupId) -> Result<Vec<UserId>, AssignmentsServiceError>;
}
