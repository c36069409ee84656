//! Register command for binding a badge to a new employee.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;

use att_core::{BadgeId, EmployeeName, Error, EventStore};

use crate::Config;

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Employee name (unique).
    pub name: String,
    /// Badge ID as printed on the barcode.
    pub badge: String,
}

pub fn run<W: Write>(writer: &mut W, args: &RegisterArgs, config: &Config) -> Result<()> {
    let name = EmployeeName::new(args.name.trim())?;
    let badge = BadgeId::new(args.badge.trim())?;

    let mut db = super::open_database(&config.database_path)?;
    match db.register_employee(name, badge) {
        Ok(employee) => {
            writeln!(
                writer,
                "Registered {} with badge {}",
                employee.name, employee.badge_id
            )?;
            Ok(())
        }
        Err(Error::DuplicateBadge(badge)) => {
            bail!("badge {badge} is already registered to another employee")
        }
        Err(err) => Err(err.into()),
    }
}
