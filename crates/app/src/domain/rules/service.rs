//! Rules service.

use async_trait::async_trait;
use cohort::{
    catalog::{CategoryId, ProductId},
    rules::RuleId,
    schedule::{ScheduleStatus, to_millisecond_precision},
    validation::RuleValidator,
};
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::FxHashSet;
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::rules::{
        data::{NewRule, RuleUpdate},
        errors::RulesServiceError,
        records::{RuleConflict, RuleRecord},
        repository::SqliteRulesRepository,
    },
};

/// Sorted, de-duplicated copy of an id list.
fn unique<T: Ord + Copy>(ids: &[T]) -> Vec<T> {
    let mut ids = ids.to_vec();

    ids.sort_unstable();
    ids.dedup();

    ids
}

#[derive(Debug, Clone)]
pub struct SqliteRulesService {
    db: Db,
    repository: SqliteRulesRepository,
    validator: RuleValidator,
}

impl SqliteRulesService {
    #[must_use]
    pub fn new(db: Db, validator: RuleValidator) -> Self {
        Self {
            db,
            repository: SqliteRulesRepository::new(),
            validator,
        }
    }
}

#[async_trait]
impl RulesService for SqliteRulesService {
    #[tracing::instrument(
        name = "rules.service.create_rule",
        skip(self, rule),
        fields(
            group_id = %rule.group,
            discount_type = %rule.discount_type,
            rule_id = tracing::field::Empty
        ),
        err
    )]
    async fn create_rule(&self, rule: NewRule, point_in_time: Timestamp) -> Result<RuleRecord, RulesServiceError> {
        self.validator.check_rule(
            rule.discount_type,
            rule.discount_value,
            rule.products.len(),
            rule.categories.len(),
        )?;

        let schedule = RuleValidator::check_schedule(rule.start, rule.end)?;
        let created_at = to_millisecond_precision(point_in_time);
        let products: Vec<ProductId> = unique(&rule.products);
        let categories: Vec<CategoryId> = unique(&rule.categories);

        let mut tx = self.db.begin().await?;

        let sort_order = self.repository.next_sort_order(&mut tx).await?;

        let id = self
            .repository
            .create_rule(
                &mut tx,
                rule.group,
                rule.discount_type,
                rule.discount_value,
                rule.is_active,
                schedule,
                created_at,
                sort_order,
            )
            .await?;

        Span::current().record("rule_id", tracing::field::display(id));

        self.repository.replace_products(&mut tx, id, &products).await?;
        self.repository.replace_categories(&mut tx, id, &categories).await?;

        let record = self.repository.get_rule(&mut tx, id).await?;

        tx.commit().await?;

        info!(rule_id = %id, "created pricing rule");

        Ok(record)
    }

    #[tracing::instrument(name = "rules.service.update_rule", skip(self, update), fields(rule_id = %rule), err)]
    async fn update_rule(&self, rule: RuleId, update: RuleUpdate) -> Result<RuleRecord, RulesServiceError> {
        self.validator.check_rule(
            update.discount_type,
            update.discount_value,
            update.products.len(),
            update.categories.len(),
        )?;

        let mut tx = self.db.begin().await?;

        let rows_affected = self
            .repository
            .update_rule(&mut tx, rule, update.group, update.discount_type, update.discount_value)
            .await?;

        if rows_affected == 0 {
            return Err(RulesServiceError::NotFound);
        }

        self.repository
            .replace_products(&mut tx, rule, &unique(&update.products))
            .await?;

        self.repository
            .replace_categories(&mut tx, rule, &unique(&update.categories))
            .await?;

        let record = self.repository.get_rule(&mut tx, rule).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(name = "rules.service.update_schedule", skip(self), err)]
    async fn update_schedule(
        &self,
        rule: RuleId,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
        point_in_time: Timestamp,
    ) -> Result<ScheduleStatus, RulesServiceError> {
        let schedule = RuleValidator::check_schedule(start, end)?;

        let mut tx = self.db.begin().await?;

        if self.repository.update_schedule(&mut tx, rule, schedule).await? == 0 {
            return Err(RulesServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(schedule.status(point_in_time))
    }

    #[tracing::instrument(name = "rules.service.set_rule_active", skip(self), err)]
    async fn set_rule_active(&self, rule: RuleId, active: bool) -> Result<(), RulesServiceError> {
        let mut tx = self.db.begin().await?;

        if self.repository.set_rule_active(&mut tx, rule, active).await? == 0 {
            return Err(RulesServiceError::NotFound);
        }

        tx.commit().await?;

        // Read back in a fresh transaction: a concurrent toggle may have landed after ours.
        let mut tx = self.db.begin().await?;

        let actual = self.repository.get_rule_active(&mut tx, rule).await?;

        tx.commit().await?;

        if actual != active {
            return Err(RulesServiceError::VerificationFailed {
                expected: active,
                actual,
            });
        }

        Ok(())
    }

    #[tracing::instrument(name = "rules.service.set_all_rules_active", skip(self), err)]
    async fn set_all_rules_active(&self, active: bool) -> Result<u64, RulesServiceError> {
        let mut tx = self.db.begin().await?;

        let changed = self.repository.set_all_rules_active(&mut tx, active).await?;

        tx.commit().await?;

        info!(changed, active, "toggled all pricing rules");

        Ok(changed)
    }

    #[tracing::instrument(name = "rules.service.reorder_rules", skip(self, order), fields(rule_count = order.len()), err)]
    async fn reorder_rules(&self, order: Vec<RuleId>) -> Result<(), RulesServiceError> {
        if order.is_empty() {
            return Err(RulesServiceError::EmptyOrder);
        }

        let mut seen = FxHashSet::default();
        let mut tx = self.db.begin().await?;

        for (position, rule) in (1_i64..).zip(order.into_iter().filter(|rule| seen.insert(*rule))) {
            if self.repository.set_sort_order(&mut tx, rule, position).await? == 0 {
                return Err(RulesServiceError::NotFound);
            }
        }

        tx.commit().await?;

        Ok(())
    }

    #[tracing::instrument(name = "rules.service.delete_rule", skip(self), err)]
    async fn delete_rule(&self, rule: RuleId) -> Result<(), RulesServiceError> {
        let mut tx = self.db.begin().await?;

        if self.repository.delete_rule(&mut tx, rule).await? == 0 {
            return Err(RulesServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    #[tracing::instrument(name = "rules.service.delete_all_rules", skip(self), err)]
    async fn delete_all_rules(&self) -> Result<u64, RulesServiceError> {
        let mut tx = self.db.begin().await?;

        let deleted = self.repository.delete_all_rules(&mut tx).await?;

        tx.commit().await?;

        info!(deleted, "deleted all pricing rules");

        Ok(deleted)
    }

    async fn get_rule(&self, rule: RuleId) -> Result<RuleRecord, RulesServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.get_rule(&mut tx, rule).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_rules(&self) -> Result<Vec<RuleRecord>, RulesServiceError> {
        let mut tx = self.db.begin().await?;

        let records = self.repository.list_rules(&mut tx).await?;

        tx.commit().await?;

        Ok(records)
    }

    async fn rule_conflicts(&self) -> Result<Vec<RuleConflict>, RulesServiceError> {
        let mut tx = self.db.begin().await?;

        let conflicts = self.repository.rule_conflicts(&mut tx).await?;

        tx.commit().await?;

        Ok(conflicts)
    }
}

#[automock]
#[async_trait]
pub trait RulesService: Send + Sync {
    /// Validates and stores a new rule, active or not as given, with its product and category
    /// associations. `point_in_time` becomes its creation instant.
    async fn create_rule(&self, rule: NewRule, point_in_time: Timestamp) -> Result<RuleRecord, RulesServiceError>;

    /// Replaces a rule's group, discount and associations.
    async fn update_rule(&self, rule: RuleId, update: RuleUpdate) -> Result<RuleRecord, RulesServiceError>;

    /// Replaces a rule's schedule and reports its status at `point_in_time`.
    async fn update_schedule(
        &self,
        rule: RuleId,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
        point_in_time: Timestamp,
    ) -> Result<ScheduleStatus, RulesServiceError>;

    /// Switches a rule on or off, then confirms the stored flag matches.
    async fn set_rule_active(&self, rule: RuleId, active: bool) -> Result<(), RulesServiceError>;

    /// Switches every rule on or off, returning how many changed.
    async fn set_all_rules_active(&self, active: bool) -> Result<u64, RulesServiceError>;

    /// Assigns display positions `1..=n` in the given order.
    async fn reorder_rules(&self, order: Vec<RuleId>) -> Result<(), RulesServiceError>;

    /// Deletes a rule and its associations.
    async fn delete_rule(&self, rule: RuleId) -> Result<(), RulesServiceError>;

    /// Deletes every rule and association, returning the number of rules removed.
    async fn delete_all_rules(&self) -> Result<u64, RulesServiceError>;

    /// Retrieve a single rule with its associations.
    async fn get_rule(&self, rule: RuleId) -> Result<RuleRecord, RulesServiceError>;

    /// Retrieves all rules in display order.
    async fn list_rules(&self) -> Result<Vec<RuleRecord>, RulesServiceError>;

    /// Products and categories carrying more than one rule of the same group.
    async fn rule_conflicts(&self) -> Result<Vec<RuleConflict>, RulesServiceError>;
}
