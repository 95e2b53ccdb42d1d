//! CLI command implementations.

pub mod config;
pub mod reconcile;
pub mod worker;
