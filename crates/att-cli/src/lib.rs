//! Attendance tracker CLI library.
//!
//! This crate provides the CLI interface for the attendance tracker.
//! Commands are thin adapters: badge resolution, aggregation, and edit
//! validation all live in `att-core`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
