//! Check-state resolution for badge scans.
//!
//! # Time policy
//!
//! The current instant is an explicit parameter, never an ambient clock,
//! and the calendar day of a scan is the **UTC date** of that instant.
//! One policy for the whole system; callers that want local-day
//! semantics convert before calling.

use chrono::{DateTime, Timelike, Utc};

use crate::aggregator::aggregate_day;
use crate::error::Error;
use crate::event::{AttendanceEvent, DateRange, EventKind};
use crate::store::{DailySummary, EventStore, NewEvent};
use crate::types::{BadgeId, Employee};

/// The result of a processed scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub employee: Employee,
    pub event: AttendanceEvent,
    /// Refreshed daily summary; present only when the scan checked the
    /// employee out.
    pub summary: Option<DailySummary>,
}

/// Decides what the next event for a day should be.
///
/// Check in when the day has no check-in yet, or when the most recent
/// check-out is strictly later than the most recent check-in (the
/// employee is currently out). Otherwise check out.
#[must_use]
pub fn next_kind(events: &[AttendanceEvent]) -> EventKind {
    let last_in = events
        .iter()
        .filter(|e| e.kind == EventKind::CheckIn)
        .map(|e| e.time)
        .max();
    let last_out = events
        .iter()
        .filter(|e| e.kind == EventKind::CheckOut)
        .map(|e| e.time)
        .max();

    match (last_in, last_out) {
        (None, _) => EventKind::CheckIn,
        (Some(check_in), Some(check_out)) if check_out > check_in => EventKind::CheckIn,
        _ => EventKind::CheckOut,
    }
}

/// Resolves a badge scan and appends the resulting event.
///
/// Fails with [`Error::UnknownBadge`] for an unregistered badge, without
/// creating a placeholder employee or appending anything. The append is
/// guarded by the day revision read up front, so two kiosks scanning the
/// same badge concurrently cannot interleave: the loser gets
/// [`Error::ConcurrentModification`] and should rescan.
///
/// A check-out additionally recomputes and persists the daily summary.
pub fn record_scan<S: EventStore>(
    store: &mut S,
    badge_id: &BadgeId,
    now: DateTime<Utc>,
) -> Result<ScanOutcome, Error> {
    let employee = store
        .find_employee(badge_id)?
        .ok_or_else(|| Error::UnknownBadge(badge_id.clone()))?;

    let date = now.date_naive();
    let time = now.time().with_nanosecond(0).unwrap_or_else(|| now.time());
    let revision = store.day_revision(&employee.name, date)?;

    let events = store.query_events(&employee.name, DateRange::single(date), None)?;
    let kind = next_kind(&events);

    let id = store.append_event(
        NewEvent {
            employee: employee.name.clone(),
            date,
            kind,
            time,
        },
        Some(revision),
    )?;
    tracing::debug!(employee = %employee.name, %date, %kind, %time, "recorded scan");

    let event = AttendanceEvent {
        id,
        employee: employee.name.clone(),
        date,
        kind,
        time,
    };

    let summary = if kind == EventKind::CheckOut {
        let events = store.query_events(&employee.name, DateRange::single(date), None)?;
        let day = aggregate_day(date, &events);
        let summary = DailySummary {
            employee: employee.name.clone(),
            date,
            total: day.total(),
        };
        store.upsert_daily_summary(&summary)?;
        Some(summary)
    } else {
        None
    };

    Ok(ScanOutcome {
        employee,
        event,
        summary,
    })
}
