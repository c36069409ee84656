//! Attendance events recorded by badge scans and manual edits.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::types::{EmployeeName, EventId};

/// The direction of an attendance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CheckIn,
    CheckOut,
}

impl EventKind {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CheckIn => "check_in",
            Self::CheckOut => "check_out",
        }
    }

    /// Human-readable label used in CLI output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CheckIn => "Check In",
            Self::CheckOut => "Check Out",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "check_in" => Ok(Self::CheckIn),
            "check_out" => Ok(Self::CheckOut),
            _ => Err(format!("invalid event kind: {s}")),
        }
    }
}

/// One row of the attendance log: a single check-in or check-out.
///
/// Events carry an opaque ID assigned at append time. The log has no
/// session identifier; pairing into sessions is inferred by the
/// aggregator from the time ordering within a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub id: EventId,
    pub employee: EmployeeName,
    pub date: NaiveDate,
    pub kind: EventKind,
    /// Time of day, whole seconds.
    pub time: NaiveTime,
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// A range covering a single date.
    #[must_use]
    pub const fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Whether the range contains no dates (`start > end`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Iterates the dates in the range, inclusive on both ends.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let mut current = self.start;
        let end = self.end;
        std::iter::from_fn(move || {
            if current > end {
                return None;
            }
            let date = current;
            current = current.succ_opt()?;
            Some(date)
        })
    }
}
