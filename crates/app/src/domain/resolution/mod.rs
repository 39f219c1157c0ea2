//! Pricing Rule Resolution
//!
//! Picks the one rule that applies to a shopper and product and prices the product
//! with it. Product rules beat category rules; among category rules gathered from
//! the product's categories and their ancestors the precedence order decides.

pub mod candidates;
pub mod errors;
pub mod hierarchy;
pub mod request;
pub mod service;
pub mod store;

#[cfg(test)]
mod scenarios;

pub use errors::{ResolutionError, StoreError};
pub use request::PricingRequest;
pub use service::*;
pub use store::{Catalog, GroupDirectory, RuleStore, SqliteRuleStore};
