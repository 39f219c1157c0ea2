//! Maintenance service errors.

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaintenanceServiceError {
    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for MaintenanceServiceError {
    fn from(error: Error) -> Self {
        Self::Sql(error)
    }
}
