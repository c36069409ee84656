//! Employees command for listing registered employees.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use att_core::EventStore;

use crate::Config;

#[derive(Debug, Args)]
pub struct EmployeesArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &EmployeesArgs, config: &Config) -> Result<()> {
    let db = super::open_database(&config.database_path)?;
    let employees = db.list_employees()?;

    if args.json {
        serde_json::to_writer_pretty(&mut *writer, &employees)?;
        writeln!(writer)?;
        return Ok(());
    }

    if employees.is_empty() {
        writeln!(writer, "No employees registered.")?;
        return Ok(());
    }
    for employee in employees {
        writeln!(writer, "{}\t{}", employee.name, employee.badge_id)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    fn config(temp: &tempfile::TempDir) -> Config {
        Config {
            database_path: temp.path().join("att.db"),
        }
    }

    fn register(config: &Config, name: &str, badge: &str) {
        let args = crate::commands::register::RegisterArgs {
            name: name.to_string(),
            badge: badge.to_string(),
        };
        crate::commands::register::run(&mut Vec::new(), &args, config).unwrap();
    }

    #[test]
    fn lists_employees_sorted_by_name() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        register(&config, "Grace", "B-2");
        register(&config, "Ada", "B-1");

        let mut output = Vec::new();
        run(&mut output, &EmployeesArgs { json: false }, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Ada	B-1
        Grace	B-2
        ");
    }

    #[test]
    fn empty_registry_prints_hint() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);

        let mut output = Vec::new();
        run(&mut output, &EmployeesArgs { json: false }, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @"No employees registered.");
    }

    #[test]
    fn json_output_is_parseable() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        register(&config, "Ada", "B-1");

        let mut output = Vec::new();
        run(&mut output, &EmployeesArgs { json: true }, &config).unwrap();

        let parsed: Vec<att_core::Employee> = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name.as_str(), "Ada");
    }
}
