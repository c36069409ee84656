//! Report command: total worked time per day over a date range.

use std::io::Write;

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use clap::Args;
use serde::Serialize;

use att_core::{DateRange, DayAggregate, EmployeeName, Session, UnmatchedReason, aggregate_range};

use crate::Config;

/// Default report window when no range is given, in days ending today.
const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Employee name.
    pub employee: String,
    /// First day of the range (YYYY-MM-DD); defaults to 30 days ago.
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Last day of the range (YYYY-MM-DD), inclusive; defaults to today.
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct DayReport<'a> {
    date: NaiveDate,
    sessions: &'a [Session],
    unmatched: Vec<UnmatchedReport>,
    total: String,
}

#[derive(Debug, Serialize)]
struct UnmatchedReport {
    event_id: String,
    kind: String,
    time: String,
    reason: UnmatchedReason,
}

#[derive(Debug, Serialize)]
struct RangeReport<'a> {
    employee: &'a str,
    start: NaiveDate,
    end: NaiveDate,
    days: Vec<DayReport<'a>>,
    total: String,
}

/// Formats a duration as `HH:MM:SS` with unbounded hours.
pub(crate) fn format_hms(total: Duration) -> String {
    let seconds = total.num_seconds();
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        seconds % 3600 / 60,
        seconds % 60
    )
}

fn day_report(day: &DayAggregate) -> DayReport<'_> {
    DayReport {
        date: day.date,
        sessions: &day.sessions,
        unmatched: day
            .unmatched
            .iter()
            .map(|u| UnmatchedReport {
                event_id: u.event.id.to_string(),
                kind: u.event.kind.to_string(),
                time: u.event.time.to_string(),
                reason: u.reason,
            })
            .collect(),
        total: format_hms(day.total()),
    }
}

pub fn run<W: Write>(
    writer: &mut W,
    args: &ReportArgs,
    config: &Config,
    today: NaiveDate,
) -> Result<()> {
    let employee = EmployeeName::new(args.employee.trim())?;
    let end = args.end.unwrap_or(today);
    let start = args
        .start
        .unwrap_or_else(|| end - Duration::days(DEFAULT_WINDOW_DAYS));
    let range = DateRange { start, end };

    let db = super::open_database(&config.database_path)?;
    let aggregate = aggregate_range(&db, &employee, range)?;

    if args.json {
        let report = RangeReport {
            employee: employee.as_str(),
            start,
            end,
            days: aggregate.days.iter().map(day_report).collect(),
            total: format_hms(aggregate.total()),
        };
        serde_json::to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)?;
        return Ok(());
    }

    for day in &aggregate.days {
        writeln!(writer, "{}\t{}", day.date, format_hms(day.total()))?;
        for unmatched in &day.unmatched {
            writeln!(
                writer,
                "\twarning: unmatched {} at {}",
                unmatched.event.kind.label(),
                unmatched.event.time
            )?;
        }
    }
    writeln!(
        writer,
        "Total hours worked by {employee} from {start} to {end}: {}",
        format_hms(aggregate.total())
    )?;
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

    fn seed(config: &Config, date: &str, kind: EventKind, time: &str) {
        let mut db = crate::commands::open_database(&config.database_path).unwrap();
        let employee = EmployeeName::new("Ada").unwrap();
        insert_event(
            &mut db,
            &employee,
            date.parse().unwrap(),
            kind,
            time.parse().unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn format_hms_is_zero_padded_and_unbounded() {
        assert_eq!(format_hms(Duration::zero()), "00:00:00");
        assert_eq!(
            format_hms(Duration::hours(4) + Duration::minutes(30)),
            "04:30:00"
        );
        assert_eq!(format_hms(Duration::hours(123) + Duration::seconds(5)), "123:00:05");
    }

    #[test]
    fn report_sums_days_and_prints_range_total() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        seed(&config, "2025-03-01", EventKind::CheckIn, "08:00:00");
        seed(&config, "2025-03-01", EventKind::CheckOut, "12:00:00");
        seed(&config, "2025-03-03", EventKind::CheckIn, "09:00:00");
        seed(&config, "2025-03-03", EventKind::CheckOut, "10:30:00");

        let mut output = Vec::new();
        let args = ReportArgs {
            employee: "Ada".to_string(),
            start: Some("2025-03-01".parse().unwrap()),
            end: Some("2025-03-04".parse().unwrap()),
            json: false,
        };
        run(&mut output, &args, &config, "2025-03-10".parse().unwrap()).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        2025-03-01	04:00:00
        2025-03-03	01:30:00
        Total hours worked by Ada from 2025-03-01 to 2025-03-04: 05:30:00
        ");
    }

    #[test]
    fn report_warns_about_unmatched_events() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        seed(&config, "2025-03-01", EventKind::CheckIn, "08:00:00");

        let mut output = Vec::new();
        let args = ReportArgs {
            employee: "Ada".to_string(),
            start: Some("2025-03-01".parse().unwrap()),
            end: Some("2025-03-01".parse().unwrap()),
            json: false,
        };
        run(&mut output, &args, &config, "2025-03-10".parse().unwrap()).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        2025-03-01	00:00:00
        	warning: unmatched Check In at 08:00:00
        Total hours worked by Ada from 2025-03-01 to 2025-03-01: 00:00:00
        ");
    }

    #[test]
    fn default_range_ends_today() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        let today: NaiveDate = "2025-03-10".parse().unwrap();
        seed(&config, "2025-03-10", EventKind::CheckIn, "08:00:00");
        seed(&config, "2025-03-10", EventKind::CheckOut, "09:00:00");
        // Outside the default window.
        seed(&config, "2024-12-01", EventKind::CheckIn, "08:00:00");
        seed(&config, "2024-12-01", EventKind::CheckOut, "09:00:00");

        let mut output = Vec::new();
        let args = ReportArgs {
            employee: "Ada".to_string(),
            start: None,
            end: None,
            json: false,
        };
        run(&mut output, &args, &config, today).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("2025-03-10\t01:00:00"));
        assert!(!output.contains("2024-12-01"));
        assert!(output.contains("from 2025-02-08 to 2025-03-10: 01:00:00"));
    }

    #[test]
    fn json_report_is_parseable() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        seed(&config, "2025-03-01", EventKind::CheckIn, "08:00:00");
        seed(&config, "2025-03-01", EventKind::CheckOut, "12:00:00");

        let mut output = Vec::new();
        let args = ReportArgs {
            employee: "Ada".to_string(),
            start: Some("2025-03-01".parse().unwrap()),
            end: Some("2025-03-01".parse().unwrap()),
            json: true,
        };
        run(&mut output, &args, &config, "2025-03-10".parse().unwrap()).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed["employee"], "Ada");
        assert_eq!(parsed["total"], "04:00:00");
        assert_eq!(parsed["days"][0]["sessions"][0]["start"], "08:00:00");
    }
}
