//! Application configuration
//!
//! Every setting can be given as a flag or through the environment; a `.env` file
//! is loaded first when present.

use clap::Args;

pub mod db;
pub mod logging;
pub mod pricing;

pub use db::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use pricing::PricingConfig;

/// Settings shared by every command.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Rule store settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Pricing behaviour settings.
    #[command(flatten)]
    pub pricing: PricingConfig,
}
