//! Manual correction of attendance events.
//!
//! Inserts and time corrections are validated against the day they land
//! in: the edit is applied to an in-memory copy of the day's events and
//! re-paired, and any session that would end at or before its start is
//! rejected with [`Error::InvalidTimeRange`] before anything is
//! committed. Summaries are never patched incrementally; every mutation
//! re-runs the aggregator for the affected day and rewrites the summary.

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::aggregator::{DayAggregate, aggregate_day};
use crate::error::Error;
use crate::event::{AttendanceEvent, DateRange, EventKind};
use crate::store::{DailySummary, EventStore, NewEvent};
use crate::types::{EmployeeName, EventId};

/// The state of an employee-day after an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// ID of the touched event. Absent for deletions.
    pub event_id: Option<EventId>,
    /// Recomputed pairing for the affected day.
    pub aggregate: DayAggregate,
    /// The rewritten daily summary.
    pub summary: DailySummary,
}

/// Rejects a hypothetical day in which some session would end at or
/// before its start.
fn validate_sessions(date: NaiveDate, events: &[AttendanceEvent]) -> Result<(), Error> {
    let day = aggregate_day(date, events);
    for session in &day.sessions {
        if session.duration() <= Duration::zero() {
            return Err(Error::InvalidTimeRange {
                start: session.start,
                end: session.end,
            });
        }
    }
    Ok(())
}

/// Re-aggregates the day and rewrites its summary.
fn refresh_day<S: EventStore>(
    store: &mut S,
    employee: &EmployeeName,
    date: NaiveDate,
) -> Result<(DayAggregate, DailySummary), Error> {
    let events = store.query_events(employee, DateRange::single(date), None)?;
    let aggregate = aggregate_day(date, &events);
    let summary = DailySummary {
        employee: employee.clone(),
        date,
        total: aggregate.total(),
    };
    store.upsert_daily_summary(&summary)?;
    Ok((aggregate, summary))
}

/// Inserts a manual event for an employee-day.
pub fn insert_event<S: EventStore>(
    store: &mut S,
    employee: &EmployeeName,
    date: NaiveDate,
    kind: EventKind,
    time: NaiveTime,
) -> Result<EditOutcome, Error> {
    let mut hypothetical = store.query_events(employee, DateRange::single(date), None)?;
    hypothetical.push(AttendanceEvent {
        // Placeholder ID for the validation pass; the store assigns the
        // real one on append.
        id: EventId::new("pending").map_err(Error::storage)?,
        employee: employee.clone(),
        date,
        kind,
        time,
    });
    validate_sessions(date, &hypothetical)?;

    let id = store.append_event(
        NewEvent {
            employee: employee.clone(),
            date,
            kind,
            time,
        },
        None,
    )?;
    tracing::debug!(%employee, %date, %kind, %time, "inserted event");

    let (aggregate, summary) = refresh_day(store, employee, date)?;
    Ok(EditOutcome {
        event_id: Some(id),
        aggregate,
        summary,
    })
}

/// Corrects the time of an existing event.
///
/// Fails with [`Error::NotFound`] for an unknown ID and with
/// [`Error::InvalidTimeRange`] when the correction would produce a
/// session ending at or before its start; the stored event is unchanged
/// in both cases.
pub fn update_event<S: EventStore>(
    store: &mut S,
    id: &EventId,
    new_time: NaiveTime,
) -> Result<EditOutcome, Error> {
    let event = store
        .get_event(id)?
        .ok_or_else(|| Error::NotFound(id.clone()))?;

    let mut hypothetical = store.query_events(
        &event.employee,
        DateRange::single(event.date),
        None,
    )?;
    for candidate in &mut hypothetical {
        if candidate.id == *id {
            candidate.time = new_time;
        }
    }
    validate_sessions(event.date, &hypothetical)?;

    store.update_event(id, new_time)?;
    tracing::debug!(event = %id, %new_time, "corrected event time");

    let (aggregate, summary) = refresh_day(store, &event.employee, event.date)?;
    Ok(EditOutcome {
        event_id: Some(id.clone()),
        aggregate,
        summary,
    })
}

/// Deletes an event.
///
/// Deletion needs no time validation: removing an event can only turn
/// its former partner into an unmatched event, which the aggregator
/// reports rather than rejects.
pub fn delete_event<S: EventStore>(store: &mut S, id: &EventId) -> Result<EditOutcome, Error> {
    let event = store
        .get_event(id)?
        .ok_or_else(|| Error::NotFound(id.clone()))?;

    store.delete_event(id)?;
    tracing::debug!(event = %id, "deleted event");

    let (aggregate, summary) = refresh_day(store, &event.employee, event.date)?;
    Ok(EditOutcome {
        event_id: None,
        aggregate,
        summary,
    })
}
