//! App Context

use std::sync::Arc;

use cohort::pricing::UnknownCurrency;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    config::AppConfig,
    database::{self, Db},
    domain::{
        assignments::{AssignmentsService, SqliteAssignmentsService},
        catalog::{CatalogService, SqliteCatalogService},
        groups::{GroupsService, SqliteGroupsService},
        maintenance::{MaintenanceService, SqliteMaintenanceService},
        resolution::{PricingResolver, SqliteRuleStore},
        rules::{RulesService, SqliteRulesService},
    },
    seed::Seeder,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database schema")]
    Migration(#[source] sqlx::Error),

    #[error(transparent)]
    Currency(#[from] UnknownCurrency),
}

#[derive(Clone)]
pub struct AppContext {
    pub db: Db,
    pub groups: Arc<dyn GroupsService>,
    pub assignments: Arc<dyn AssignmentsService>,
    pub rules: Arc<dyn RulesService>,
    pub catalog: Arc<dyn CatalogService>,
    pub maintenance: Arc<dyn MaintenanceService>,
    pub resolver: PricingResolver,
    pub currency: &'static Currency,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("db", &self.db)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Connect to the rule store, apply the schema and wire up every service.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be opened or migrated, or the store
    /// currency is not supported.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let settings = config.pricing.settings()?;

        let pool = database::connect(&config.database.database_url)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool).await.map_err(AppInitError::Migration)?;

        let db = Db::new(pool);
        let store = Arc::new(SqliteRuleStore::new(db.clone()));

        Ok(Self {
            groups: Arc::new(SqliteGroupsService::new(db.clone(), settings.default_group)),
            assignments: Arc::new(SqliteAssignmentsService::new(db.clone())),
            rules: Arc::new(SqliteRulesService::new(db.clone(), config.pricing.validator())),
            catalog: Arc::new(SqliteCatalogService::new(db.clone())),
            maintenance: Arc::new(SqliteMaintenanceService::new(db.clone())),
            currency: settings.currency,
            resolver: PricingResolver::new(store.clone(), store.clone(), store, settings),
            db,
        })
    }

    pub fn seeder(&self) -> Seeder<'_> {
        Seeder {
            groups: self.groups.as_ref(),
            assignments: self.assignments.as_ref(),
            rules: self.rules.as_ref(),
            catalog: self.catalog.as_ref(),
        }
    }
}
