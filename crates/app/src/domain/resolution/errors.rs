//! Resolution errors.

use cohort::pricing::PricingError;
use thiserror::Error;

/// Failure reading from the rule store or catalog.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error")]
    Sql(#[source] sqlx::Error),

    #[error("failed to encode query parameters")]
    Encode(#[source] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        Self::Sql(error)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Encode(error)
    }
}

/// Failure resolving a rule or price.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}
