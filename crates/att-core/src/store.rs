//! The event store capability consumed by the resolver and editor.
//!
//! The attendance log is an append-only collection owned by an external
//! store (SQLite in this workspace, but anything queryable works). The
//! core never reaches for a database directly; it receives an
//! [`EventStore`] and stays pure otherwise.

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::error::Error;
use crate::event::{AttendanceEvent, DateRange, EventKind};
use crate::types::{BadgeId, Employee, EmployeeName, EventId};

/// Monotonic per-employee-day write counter.
///
/// The resolver reads the revision before deciding what to append and
/// hands it back with the append. A store that sees a stale revision
/// fails with [`Error::ConcurrentModification`] instead of interleaving
/// two read-decide-append sequences for the same badge.
pub type Revision = i64;

/// An event about to be appended. The store assigns the ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub employee: EmployeeName,
    pub date: NaiveDate,
    pub kind: EventKind,
    pub time: NaiveTime,
}

/// Derived total worked time for one employee-day.
///
/// Always a cache of the aggregator's output, refreshed on every
/// check-out and after every edit. Never an input to aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySummary {
    pub employee: EmployeeName,
    pub date: NaiveDate,
    pub total: Duration,
}

/// Storage capability for attendance data.
///
/// Errors surface through the shared [`Error`] taxonomy: backends wrap
/// their own failures in [`Error::Storage`] and reserve the remaining
/// variants for the conditions they name.
pub trait EventStore {
    /// Binds a badge to a new employee.
    ///
    /// Fails with [`Error::DuplicateBadge`] if the badge is already
    /// bound; no employee record is created in that case.
    fn register_employee(
        &mut self,
        name: EmployeeName,
        badge_id: BadgeId,
    ) -> Result<Employee, Error>;

    /// Looks up the employee bound to a badge.
    fn find_employee(&self, badge_id: &BadgeId) -> Result<Option<Employee>, Error>;

    /// Lists all registered employees, ordered by name.
    fn list_employees(&self) -> Result<Vec<Employee>, Error>;

    /// Current write revision for an employee-day. Starts at zero.
    fn day_revision(&self, employee: &EmployeeName, date: NaiveDate) -> Result<Revision, Error>;

    /// Appends one event and returns its freshly assigned ID.
    ///
    /// When `expected_revision` is given, the append only succeeds if the
    /// employee-day has not been written since that revision was read;
    /// otherwise it fails with [`Error::ConcurrentModification`].
    fn append_event(
        &mut self,
        event: NewEvent,
        expected_revision: Option<Revision>,
    ) -> Result<EventId, Error>;

    /// Fetches events for an employee over an inclusive date range,
    /// optionally filtered by kind. Ordering is not guaranteed; the
    /// aggregator sorts for itself.
    fn query_events(
        &self,
        employee: &EmployeeName,
        range: DateRange,
        kind: Option<EventKind>,
    ) -> Result<Vec<AttendanceEvent>, Error>;

    /// Fetches a single event by ID.
    fn get_event(&self, id: &EventId) -> Result<Option<AttendanceEvent>, Error>;

    /// Corrects the time of an existing event.
    ///
    /// Fails with [`Error::NotFound`] if no event has this ID. Bumps the
    /// day revision of the affected employee-day.
    fn update_event(&mut self, id: &EventId, new_time: NaiveTime) -> Result<(), Error>;

    /// Removes an event. Fails with [`Error::NotFound`] if no event has
    /// this ID. Bumps the day revision of the affected employee-day.
    fn delete_event(&mut self, id: &EventId) -> Result<(), Error>;

    /// Inserts or replaces the daily summary for an employee-day.
    fn upsert_daily_summary(&mut self, summary: &DailySummary) -> Result<(), Error>;

    /// Fetches the stored daily summary for an employee-day, if any.
    fn daily_summary(
        &self,
        employee: &EmployeeName,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>, Error>;
}
