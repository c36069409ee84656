//! Scan command: resolve a badge scan into a check-in or check-out.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use clap::Args;

use att_core::{BadgeId, Error, record_scan};

use crate::Config;

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Badge ID as read by the scanner.
    pub badge: String,
}

pub fn run<W: Write>(
    writer: &mut W,
    args: &ScanArgs,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<()> {
    let badge = BadgeId::new(args.badge.trim())?;
    let mut db = super::open_database(&config.database_path)?;

    let outcome = match record_scan(&mut db, &badge, now) {
        Ok(outcome) => outcome,
        Err(Error::UnknownBadge(badge)) => {
            bail!("no employee registered for badge {badge}; scan again or register first")
        }
        Err(err) if err.is_retryable() => bail!("{err}; please rescan"),
        Err(err) => return Err(err.into()),
    };

    writeln!(
        writer,
        "Attendance recorded for {}: {} at {}",
        outcome.employee.name,
        outcome.event.kind.label(),
        outcome.event.time
    )?;
    if let Some(summary) = outcome.summary {
        writeln!(
            writer,
            "Total worked on {}: {}",
            summary.date,
            super::report::format_hms(summary.total)
        )?;
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

    fn register_ada(config: &Config) {
        let args = crate::commands::register::RegisterArgs {
            name: "Ada".to_string(),
            badge: "B-1".to_string(),
        };
        crate::commands::register::run(&mut Vec::new(), &args, config).unwrap();
    }

    fn instant(s: &str) -> DateTime<Utc> {
        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    #[test]
    fn scan_toggles_between_check_in_and_check_out() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        register_ada(&config);
        let args = ScanArgs {
            badge: "B-1".to_string(),
        };

        let mut output = Vec::new();
        run(&mut output, &args, &config, instant("2025-03-01 08:00:00")).unwrap();
        run(&mut output, &args, &config, instant("2025-03-01 12:30:00")).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Attendance recorded for Ada: Check In at 08:00:00
        Attendance recorded for Ada: Check Out at 12:30:00
        Total worked on 2025-03-01: 04:30:00
        ");
    }

    #[test]
    fn scan_unknown_badge_fails_without_recording() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        register_ada(&config);
        let args = ScanArgs {
            badge: "B-404".to_string(),
        };

        let mut output = Vec::new();
        let err = run(&mut output, &args, &config, instant("2025-03-01 08:00:00")).unwrap_err();
        assert!(err.to_string().contains("no employee registered"));
        assert!(output.is_empty());
    }
}
