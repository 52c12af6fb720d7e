//! Subcommand implementations

pub mod address;
pub mod config;
pub mod hash;
pub mod scenario;
