//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{edit, employees, events, register, report, scan};

/// Employee check-in/check-out tracker.
///
/// Resolves badge scans into attendance events and aggregates them into
/// per-session and daily worked time.
#[derive(Debug, Parser)]
#[command(name = "att", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Register a new employee and bind their badge.
    Register(register::RegisterArgs),

    /// Record a badge scan as a check-in or check-out.
    Scan(scan::ScanArgs),

    /// List registered employees.
    Employees(employees::EmployeesArgs),

    /// List attendance events for an employee-day.
    Events(events::EventsArgs),

    /// Manually correct the attendance log.
    Event {
        #[command(subcommand)]
        action: edit::EventAction,
    },

    /// Report worked time over a date range.
    Report(report::ReportArgs),
}
