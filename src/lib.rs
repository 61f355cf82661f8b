//! Bulk onboarding of servers into a PAM vault: reads a CSV of hosts and
//! admin credentials and emits an import JSON plus command lists for the
//! vault's command-line client.

pub mod app;
pub mod cli;
pub mod command;
pub mod config;
pub mod csv_loader;
pub mod error;
pub mod logging;
pub mod models;
pub mod probe;
pub mod records;
pub mod writers;

pub use error::Error;
