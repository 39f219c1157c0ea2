//! User Group Assignments

pub mod errors;
mod repository;
pub mod service;

pub use errors::AssignmentsServiceError;
pub use service::*;
