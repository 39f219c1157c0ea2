//! Cohort Domain Concerns

pub mod assignments;
pub mod catalog;
pub mod groups;
pub mod maintenance;
pub mod resolution;
pub mod rules;
