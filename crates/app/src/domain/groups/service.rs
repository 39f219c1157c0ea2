//! Groups service.

use async_trait::async_trait;
use cohort::groups::{CustomerGroup, GroupId};
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::groups::{
        data::NewGroup, errors::GroupsServiceError, records::GroupDeletion, repository::SqliteGroupsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct SqliteGroupsService {
    db: Db,
    repository: SqliteGroupsRepository,
    default_group: Option<GroupId>,
}

impl SqliteGroupsService {
    /// `default_group` is refused by [`GroupsService::delete_group`].
    #[must_use]
    pub fn new(db: Db, default_group: Option<GroupId>) -> Self {
        Self {
            db,
            repository: SqliteGroupsRepository::new(),
            default_group,
        }
    }
}

#[async_trait]
impl GroupsService for SqliteGroupsService {
    #[tracing::instrument(name = "groups.service.create_group", skip(self, group), err)]
    async fn create_group(&self, group: NewGroup) -> Result<CustomerGroup, GroupsServiceError> {
        let name = group.name.trim();

        if name.is_empty() {
            return Err(GroupsServiceError::EmptyName);
        }

        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_group(&mut tx, name, group.description.trim())
            .await?;

        tx.commit().await?;

        info!(group_id = %created.id, "created customer group");

        Ok(created)
    }

    async fn list_groups(&self) -> Result<Vec<CustomerGroup>, GroupsServiceError> {
        let mut tx = self.db.begin().await?;

        let groups = self.repository.list_groups(&mut tx).await?;

        tx.commit().await?;

        Ok(groups)
    }

    async fn get_group(&self, group: GroupId) -> Result<CustomerGroup, GroupsServiceError> {
        let mut tx = self.db.begin().await?;

        let group = self.repository.get_group(&mut tx, group).await?;

        tx.commit().await?;

        Ok(group)
    }

    #[tracing::instrument(name = "groups.service.delete_group", skip(self), err)]
    async fn delete_group(&self, group: GroupId) -> Result<GroupDeletion, GroupsServiceError> {
        if self.default_group == Some(group) {
            return Err(GroupsServiceError::DefaultGroupProtected);
        }

        let mut tx = self.db.begin().await?;

        let deletion = self
            .repository
            .delete_group(&mut tx, group)
            .await?
            .ok_or(GroupsServiceError::NotFound)?;

        tx.commit().await?;

        info!(
            group_id = %group,
            rules = deletion.rules,
            assignments = deletion.assignments,
            "deleted customer group"
        );

        Ok(deletion)
    }
}

#[automock]
#[async_trait]
pub trait GroupsService: Send + Sync {
    /// Creates a group; the name is trimmed and must not be empty.
    async fn create_group(&self, group: NewGroup) -> Result<CustomerGroup, GroupsServiceError>;

    /// Retrieves all groups ordered by name.
    async fn list_groups(&self) -> Result<Vec<CustomerGroup>, GroupsServiceError>;

    /// Retrieve a single group.
    async fn get_group(&self, group: GroupId) -> Result<CustomerGroup, GroupsServiceError>;

    /// Deletes a group together with its rules, their associations and its user
    /// assignments. The configured default group cannot be deleted.
    async fn delete_group(&self, group: GroupId) -> Result<GroupDeletion, GroupsServiceError>;
}

#[cfg(test)]
mod tests {
    use cohort::{
        catalog::ProductId, discounts::DiscountType, groups::UserId,
    };
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        domain::{assignments::AssignmentsService, rules::RulesService},
        test::TestContext,
    };

    use super::*;

    #[tokio::test]
    async fn create_group_trims_name() -> TestResult {
        let ctx = TestContext::new().await;

        let group = ctx
            .groups
            .create_group(NewGroup {
                name: "  Wholesale ".to_string(),
                description: "Trade".to_string(),
            })
            .await?;

        assert_eq!(group.name, "Wholesale");
        assert_eq!(ctx.groups.get_group(group.id).await?, group);

        Ok(())
    }

    #[tokio::test]
    async fn create_group_rejects_blank_name() {
        let ctx = TestContext::new().await;

        let result = ctx
            .groups
            .create_group(NewGroup {
                name: "   ".to_string(),
                description: String::new(),
            })
            .await;

        assert!(
            matches!(result, Err(GroupsServiceError::EmptyName)),
            "expected EmptyName, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_groups_is_ordered_by_name() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.create_group("Wholesale").await;
        ctx.create_group("Retail").await;

        let names: Vec<String> = ctx.groups.list_groups().await?.into_iter().map(|g| g.name).collect();

        assert_eq!(names, vec!["Retail".to_string(), "Wholesale".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn get_group_unknown_id_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.groups.get_group(GroupId::new(404)).await;

        assert!(
            matches!(result, Err(GroupsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn delete_group_cascades_rules_and_assignments() -> TestResult {
        let ctx = TestContext::new().await;
        let group = ctx.create_group("Wholesale").await;
        let other = ctx.create_group("Retail").await;

        ctx.create_rule(group, DiscountType::Fixed, Decimal::new(5, 0), vec![ProductId::new(1)], vec![])
            .await?;

        let kept = ctx
            .create_rule(other, DiscountType::Fixed, Decimal::new(5, 0), vec![ProductId::new(1)], vec![])
            .await?;

        ctx.assignments.assign_users(vec![UserId::new(7)], group).await?;

        let deletion = ctx.groups.delete_group(group).await?;

        assert_eq!(deletion, GroupDeletion { rules: 1, assignments: 1 });
        assert_eq!(ctx.assignments.user_group(UserId::new(7)).await?, None);

        let remaining: Vec<_> = ctx.rules.list_rules().await?.into_iter().map(|r| r.rule.id).collect();

        assert_eq!(remaining, vec![kept.rule.id]);
        assert!(matches!(
            ctx.groups.get_group(group).await,
            Err(GroupsServiceError::NotFound)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn delete_group_refuses_default_group() {
        let ctx = TestContext::new().await;
        let group = ctx.create_group("Retail").await;
        let service = SqliteGroupsService::new(ctx.db.clone(), Some(group));

        let result = service.delete_group(group).await;

        assert!(
            matches!(result, Err(GroupsServiceError::DefaultGroupProtected)),
            "expected DefaultGroupProtected, got {result:?}"
        );
    }

    #[tokio::test]
    async fn delete_group_unknown_id_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.groups.delete_group(GroupId::new(404)).await;

        assert!(
            matches!(result, Err(GroupsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
