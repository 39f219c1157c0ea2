//! Cohort
//!
//! Cohort resolves customer-group pricing rules: for a shopper and a product it picks
//! the single discount rule that applies and prices the product with it.

pub mod catalog;
pub mod discounts;
pub mod fixtures;
pub mod groups;
pub mod ids;
pub mod memo;
pub mod precedence;
pub mod prelude;
pub mod pricing;
pub mod rules;
pub mod schedule;
pub mod validation;
