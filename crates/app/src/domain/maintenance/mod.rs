//! Store Maintenance

pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::MaintenanceServiceError;
pub use service::*;
