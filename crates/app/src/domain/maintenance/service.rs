//! Maintenance service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::maintenance::{
        errors::MaintenanceServiceError, records::OrphanCleanup, repository::SqliteMaintenanceRepository,
    },
};

#[derive(Debug, Clone)]
pub struct SqliteMaintenanceService {
    db: Db,
    repository: SqliteMaintenanceRepository,
}

impl SqliteMaintenanceService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: SqliteMaintenanceRepository::new(),
        }
    }
}

#[async_trait]
impl MaintenanceService for SqliteMaintenanceService {
    #[tracing::instrument(name = "maintenance.service.cleanup_orphans", skip(self), err)]
    async fn cleanup_orphans(&self) -> Result<OrphanCleanup, MaintenanceServiceError> {
        let mut tx = self.db.begin().await?;

        let cleanup = self.repository.delete_orphans(&mut tx).await?;

        tx.commit().await?;

        if cleanup.total() > 0 {
            info!(
                assignments = cleanup.assignments,
                product_links = cleanup.product_links,
                category_links = cleanup.category_links,
                "removed orphaned rows"
            );
        }

        Ok(cleanup)
    }
}

#[automock]
#[async_trait]
pub trait MaintenanceService: Send + Sync {
    /// Deletes assignments to missing groups and associations of missing rules.
    async fn cleanup_orphans(&self) -> Result<OrphanCleanup, MaintenanceServiceError>;
}
