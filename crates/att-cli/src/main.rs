use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use att_cli::commands::{edit, employees, events, register, report, scan};
use att_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = std::io::stdout();
    match &cli.command {
        Some(Commands::Register(args)) => register::run(&mut stdout, args, &config)?,
        Some(Commands::Scan(args)) => scan::run(&mut stdout, args, &config, Utc::now())?,
        Some(Commands::Employees(args)) => employees::run(&mut stdout, args, &config)?,
        Some(Commands::Events(args)) => events::run(&mut stdout, args, &config)?,
        Some(Commands::Event { action }) => edit::run(&mut stdout, action, &config)?,
        Some(Commands::Report(args)) => {
            report::run(&mut stdout, args, &config, Utc::now().date_naive())?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
