//! Catalog Mirror
//!
//! The products and category taxonomy the engine reads. The store only mirrors what
//! it needs: product parents, category assignments and category parents.

pub mod errors;
mod repository;
pub mod service;

pub use errors::CatalogServiceError;
pub use service::*;
