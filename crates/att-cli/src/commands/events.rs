//! Events command for listing the raw attendance log of an employee-day.
//!
//! Prints event IDs so that corrections can target a specific row with
//! `att event update` / `att event delete`.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use att_core::{DateRange, EmployeeName, EventStore};

use crate::Config;

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Employee name.
    pub employee: String,
    /// Calendar date (YYYY-MM-DD).
    pub date: NaiveDate,
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &EventsArgs, config: &Config) -> Result<()> {
    let employee = EmployeeName::new(args.employee.trim())?;
    let db = super::open_database(&config.database_path)?;
    let events = db.query_events(&employee, DateRange::single(args.date), None)?;

    if args.json {
        serde_json::to_writer_pretty(&mut *writer, &events)?;
        writeln!(writer)?;
        return Ok(());
    }

    if events.is_empty() {
        writeln!(writer, "No events for {} on {}.", employee, args.date)?;
        return Ok(());
    }
    for event in events {
        writeln!(
            writer,
            "{}\t{}\t{}",
            event.id,
            event.kind.label(),
            event.time
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use att_core::{EventKind, insert_event};
    use insta::assert_snapshot;

    fn config(temp: &tempfile::TempDir) -> Config {
        Config {
            database_path: temp.path().join("att.db"),
        }
    }

    #[test]
    fn lists_events_with_ids_in_time_order() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        let employee = EmployeeName::new("Ada").unwrap();
        let date: NaiveDate = "2025-03-01".parse().unwrap();

        let mut db = crate::commands::open_database(&config.database_path).unwrap();
        insert_event(
            &mut db,
            &employee,
            date,
            EventKind::CheckIn,
            "08:00:00".parse().unwrap(),
        )
        .unwrap();
        insert_event(
            &mut db,
            &employee,
            date,
            EventKind::CheckOut,
            "12:00:00".parse().unwrap(),
        )
        .unwrap();

        let mut output = Vec::new();
        let args = EventsArgs {
            employee: "Ada".to_string(),
            date,
            json: false,
        };
        run(&mut output, &args, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("Check In\t08:00:00"));
        assert!(lines[1].ends_with("Check Out\t12:00:00"));
    }

    #[test]
    fn empty_day_prints_hint() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);

        let mut output = Vec::new();
        let args = EventsArgs {
            employee: "Ada".to_string(),
            date: "2025-03-01".parse().unwrap(),
            json: false,
        };
        run(&mut output, &args, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @"No events for Ada on 2025-03-01.");
    }
}
