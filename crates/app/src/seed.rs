//! Fixture seeding.

use cohort::{
    fixtures::{Fixture, FixtureError},
    groups::GroupId,
    rules::RuleId,
};
use jiff::Timestamp;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::info;

use crate::domain::{
    assignments::{AssignmentsService, AssignmentsServiceError},
    catalog::{CatalogService, CatalogServiceError},
    groups::{GroupsService, GroupsServiceError, data::NewGroup},
    rules::{RulesService, RulesServiceError, data::NewRule},
};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error("failed to seed catalog: {0}")]
    Catalog(#[from] CatalogServiceError),

    #[error("failed to seed groups: {0}")]
    Groups(#[from] GroupsServiceError),

    #[error("failed to seed assignments: {0}")]
    Assignments(#[from] AssignmentsServiceError),

    #[error("failed to seed rules: {0}")]
    Rules(#[from] RulesServiceError),

    #[error("fixture group not seeded: {0}")]
    UnknownGroup(String),
}

/// Store ids assigned to the fixture's groups and rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Group ids by fixture key
    pub groups: FxHashMap<String, GroupId>,

    /// Rule ids in fixture order
    pub rules: Vec<RuleId>,
}

impl SeedReport {
    /// Store id of a fixture group.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::UnknownGroup`] if the key was not seeded.
    pub fn group(&self, key: &str) -> Result<GroupId, SeedError> {
        self.groups
            .get(key)
            .copied()
            .ok_or_else(|| SeedError::UnknownGroup(key.to_string()))
    }
}

/// Writes a fixture through the administrative services.
#[derive(Clone, Copy)]
pub struct Seeder<'a> {
    pub groups: &'a dyn GroupsService,
    pub assignments: &'a dyn AssignmentsService,
    pub rules: &'a dyn RulesService,
    pub catalog: &'a dyn CatalogService,
}

impl std::fmt::Debug for Seeder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seeder").finish_non_exhaustive()
    }
}

impl Seeder<'_> {
    /// Seed the catalog, then groups in key order, then assignments, then rules in
    /// document order. Rules without a creation instant are stamped with `now`.
    ///
    /// # Errors
    ///
    /// Returns the first fixture or service error. Earlier steps stay committed.
    #[tracing::instrument(name = "seed.fixture", skip(self, fixture), err)]
    pub async fn seed(&self, fixture: &Fixture, now: Timestamp) -> Result<SeedReport, SeedError> {
        self.catalog.upsert_categories(fixture.catalog_categories()?).await?;
        self.catalog.upsert_products(fixture.catalog_products()?).await?;

        let mut keys: Vec<&String> = fixture.groups.keys().collect();

        keys.sort();

        let mut report = SeedReport::default();

        for key in keys {
            let Some(group) = fixture.groups.get(key) else {
                continue;
            };

            let created = self
                .groups
                .create_group(NewGroup {
                    name: group.name.clone(),
                    description: group.description.clone(),
                })
                .await?;

            report.groups.insert(key.clone(), created.id);
        }

        for (key, users) in fixture.user_assignments() {
            if users.is_empty() {
                continue;
            }

            self.assignments.assign_users(users, report.group(key)?).await?;
        }

        for definition in fixture.rule_definitions()? {
            let record = self
                .rules
                .create_rule(
                    NewRule {
                        group: report.group(&definition.group)?,
                        discount_type: definition.discount_type,
                        discount_value: definition.discount_value,
                        products: definition.products,
                        categories: definition.categories,
                        is_active: definition.is_active,
                        start: definition.schedule.start(),
                        end: definition.schedule.end(),
                    },
                    definition.created_at.unwrap_or(now),
                )
                .await?;

            report.rules.push(record.rule.id);
        }

        info!(
            groups = report.groups.len(),
            rules = report.rules.len(),
            "seeded fixture"
        );

        Ok(report)
    }
}
