//! Cohort application: the rule store, administrative services and pricing
//! resolution over `SQLite`.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod logging;
pub mod seed;

#[cfg(test)]
mod test;
