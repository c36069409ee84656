//! CLI subcommand implementations.

pub mod edit;
pub mod employees;
pub mod events;
pub mod register;
pub mod report;
pub mod scan;

use std::path::Path;

use anyhow::{Context, Result};
use att_db::Database;

/// Opens the configured database, creating its parent directory.
pub(crate) fn open_database(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    Database::open(path).with_context(|| format!("failed to open {}", path.display()))
}
