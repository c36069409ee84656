//! Event subcommands for manual correction of the attendance log.
//!
//! These are thin adapters over the editor in `att-core`; validation
//! (unknown IDs, inverted sessions) happens there.

use std::io::Write;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Subcommand, ValueEnum};

use att_core::{EditOutcome, EmployeeName, EventId, EventKind, delete_event, insert_event,
    update_event};

use crate::Config;

/// Manual corrections to the attendance log.
#[derive(Debug, Subcommand)]
pub enum EventAction {
    /// Insert a missing event.
    Insert(InsertArgs),
    /// Correct the time of an event.
    Update(UpdateArgs),
    /// Delete an event.
    Delete(DeleteArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    CheckIn,
    CheckOut,
}

impl From<KindArg> for EventKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::CheckIn => Self::CheckIn,
            KindArg::CheckOut => Self::CheckOut,
        }
    }
}

#[derive(Debug, Args)]
pub struct InsertArgs {
    /// Employee name.
    pub employee: String,
    /// Calendar date (YYYY-MM-DD).
    pub date: NaiveDate,
    /// Event kind.
    #[arg(value_enum)]
    pub kind: KindArg,
    /// Time of day (HH:MM:SS).
    pub time: NaiveTime,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Event ID, as shown by `att events`.
    pub event_id: String,
    /// Corrected time of day (HH:MM:SS).
    pub time: NaiveTime,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Event ID, as shown by `att events`.
    pub event_id: String,
}

pub fn run<W: Write>(writer: &mut W, action: &EventAction, config: &Config) -> Result<()> {
    let mut db = super::open_database(&config.database_path)?;

    let (verb, outcome) = match action {
        EventAction::Insert(args) => {
            let employee = EmployeeName::new(args.employee.trim())?;
            let outcome = insert_event(
                &mut db,
                &employee,
                args.date,
                args.kind.into(),
                args.time,
            )?;
            ("Inserted", outcome)
        }
        EventAction::Update(args) => {
            let id = EventId::new(args.event_id.trim())?;
            ("Updated", update_event(&mut db, &id, args.time)?)
        }
        EventAction::Delete(args) => {
            let id = EventId::new(args.event_id.trim())?;
            ("Deleted", delete_event(&mut db, &id)?)
        }
    };

    report_outcome(writer, verb, &outcome)
}

fn report_outcome<W: Write>(writer: &mut W, verb: &str, outcome: &EditOutcome) -> Result<()> {
    writeln!(
        writer,
        "{verb} event; total for {} on {} is now {}",
        outcome.summary.employee,
        outcome.summary.date,
        super::report::format_hms(outcome.summary.total)
    )?;
    if !outcome.aggregate.unmatched.is_empty() {
        writeln!(
            writer,
            "Warning: {} unmatched event(s) on this day",
            outcome.aggregate.unmatched.len()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use att_core::{DateRange, EventStore};
    use insta::assert_snapshot;

    fn config(temp: &tempfile::TempDir) -> Config {
        Config {
            database_path: temp.path().join("att.db"),
        }
    }

    fn insert(config: &Config, kind: KindArg, time: &str) -> String {
        let mut output = Vec::new();
        let action = EventAction::Insert(InsertArgs {
            employee: "Ada".to_string(),
            date: "2025-03-01".parse().unwrap(),
            kind,
            time: time.parse().unwrap(),
        });
        run(&mut output, &action, config).unwrap();
        String::from_utf8(output).unwrap()
    }

    fn first_event_id(config: &Config) -> String {
        let db = crate::commands::open_database(&config.database_path).unwrap();
        let employee = EmployeeName::new("Ada").unwrap();
        let events = db
            .query_events(
                &employee,
                DateRange::single("2025-03-01".parse().unwrap()),
                None,
            )
            .unwrap();
        events[0].id.to_string()
    }

    #[test]
    fn insert_pair_reports_new_total() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);

        insert(&config, KindArg::CheckIn, "08:00:00");
        let output = insert(&config, KindArg::CheckOut, "12:00:00");

        assert_snapshot!(output, @"Inserted event; total for Ada on 2025-03-01 is now 04:00:00");
    }

    #[test]
    fn lone_check_in_warns_about_unmatched() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);

        let output = insert(&config, KindArg::CheckIn, "08:00:00");

        assert_snapshot!(output, @r"
        Inserted event; total for Ada on 2025-03-01 is now 00:00:00
        Warning: 1 unmatched event(s) on this day
        ");
    }

    #[test]
    fn update_that_inverts_a_session_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        insert(&config, KindArg::CheckIn, "08:00:00");
        insert(&config, KindArg::CheckOut, "12:00:00");

        // Find the check-out and try to drag it before the check-in.
        let db = crate::commands::open_database(&config.database_path).unwrap();
        let employee = EmployeeName::new("Ada").unwrap();
        let events = db
            .query_events(
                &employee,
                DateRange::single("2025-03-01".parse().unwrap()),
                None,
            )
            .unwrap();
        let check_out = events
            .iter()
            .find(|e| e.kind == EventKind::CheckOut)
            .unwrap();
        drop(db);

        let mut output = Vec::new();
        let action = EventAction::Update(UpdateArgs {
            event_id: check_out.id.to_string(),
            time: "07:00:00".parse().unwrap(),
        });
        let err = run(&mut output, &action, &config).unwrap_err();
        assert!(err.to_string().contains("invalid time range"));
    }

    #[test]
    fn delete_recomputes_total() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        insert(&config, KindArg::CheckIn, "08:00:00");
        insert(&config, KindArg::CheckOut, "12:00:00");
        let id = first_event_id(&config);

        let mut output = Vec::new();
        let action = EventAction::Delete(DeleteArgs { event_id: id });
        run(&mut output, &action, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Deleted event; total for Ada on 2025-03-01 is now 00:00:00
        Warning: 1 unmatched event(s) on this day
        ");
    }

    #[test]
    fn update_unknown_event_fails() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);

        let mut output = Vec::new();
        let action = EventAction::Update(UpdateArgs {
            event_id: "evt-404".to_string(),
            time: "09:00:00".parse().unwrap(),
        });
        let err = run(&mut output, &action, &config).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
