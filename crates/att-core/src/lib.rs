//! Core domain logic for the attendance tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Check resolution: turning a badge scan into the right event
//! - Session aggregation: pairing check-ins with check-outs into
//!   sessions and daily totals, with unmatched-event reporting
//! - Attendance editing: validated manual corrections
//!
//! Storage is a capability ([`EventStore`]) injected by the caller; the
//! SQLite implementation lives in `att-db`.

pub mod aggregator;
pub mod editor;
mod error;
pub mod event;
pub mod resolver;
pub mod store;
pub mod types;

pub use aggregator::{
    DayAggregate, RangeAggregate, Session, UnmatchedEvent, UnmatchedReason, aggregate_day,
    aggregate_range,
};
pub use editor::{EditOutcome, delete_event, insert_event, update_event};
pub use error::Error;
pub use event::{AttendanceEvent, DateRange, EventKind};
pub use resolver::{ScanOutcome, next_kind, record_scan};
pub use store::{DailySummary, EventStore, NewEvent, Revision};
pub use types::{BadgeId, Employee, EmployeeName, EventId, ValidationError};
