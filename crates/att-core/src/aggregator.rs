//! Session pairing and work-time aggregation.
//!
//! The attendance log carries no session identifier, so sessions are
//! inferred: events for one employee-day are sorted ascending by time
//! and walked once, holding at most one open check-in. A check-in that
//! arrives while one is already open, a check-out with nothing open, and
//! a check-in still open at the end of the walk are all reported as
//! unmatched events rather than dropped or mis-paired.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::error::Error;
use crate::event::{AttendanceEvent, DateRange, EventKind};
use crate::store::EventStore;
use crate::types::EmployeeName;

/// One matched check-in/check-out pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Session {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Session {
    /// Worked time for this session. Nonnegative by construction: the
    /// walk only closes a session with a check-out at or after the open
    /// check-in.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Why an event could not be paired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// A check-in arrived while another check-in was already open.
    CheckInAlreadyOpen,
    /// A check-in was never closed by a check-out.
    CheckInNeverClosed,
    /// A check-out arrived with no open check-in.
    CheckOutWithoutCheckIn,
}

/// An event excluded from every session, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedEvent {
    pub event: AttendanceEvent,
    pub reason: UnmatchedReason,
}

/// Sessions and leftovers for one employee-day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAggregate {
    pub date: NaiveDate,
    pub sessions: Vec<Session>,
    pub unmatched: Vec<UnmatchedEvent>,
}

impl DayAggregate {
    /// Sum of session durations. Unmatched events contribute nothing.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.sessions
            .iter()
            .map(Session::duration)
            .fold(Duration::zero(), |acc, d| acc + d)
    }
}

/// Aggregation result over an inclusive date range.
///
/// Days without events are omitted; an empty range yields no days and a
/// zero total, which is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeAggregate {
    pub employee: EmployeeName,
    pub range: DateRange,
    pub days: Vec<DayAggregate>,
}

impl RangeAggregate {
    /// Total worked time across all days in the range.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.days
            .iter()
            .map(DayAggregate::total)
            .fold(Duration::zero(), |acc, d| acc + d)
    }
}

/// Sort key: time first, check-ins before check-outs on ties, then ID
/// for determinism. The kind tiebreak means an equal-time in/out pair
/// still forms a session (of zero duration) instead of two unmatched
/// events; the editor refuses to create such pairs, so they can only
/// come from data written around it.
fn sort_events(events: &mut [AttendanceEvent]) {
    events.sort_by(|a, b| {
        a.time
            .cmp(&b.time)
            .then_with(|| kind_rank(a.kind).cmp(&kind_rank(b.kind)))
            .then_with(|| a.id.cmp(&b.id))
    });
}

const fn kind_rank(kind: EventKind) -> u8 {
    match kind {
        EventKind::CheckIn => 0,
        EventKind::CheckOut => 1,
    }
}

/// Pairs the events of a single day into sessions.
///
/// `events` must all belong to the same employee-day; ordering does not
/// matter. Zero events yield zero sessions and zero total.
#[must_use]
pub fn aggregate_day(date: NaiveDate, events: &[AttendanceEvent]) -> DayAggregate {
    let mut events: Vec<AttendanceEvent> = events.to_vec();
    sort_events(&mut events);

    let mut sessions = Vec::new();
    let mut unmatched = Vec::new();
    let mut open: Option<AttendanceEvent> = None;

    for event in events {
        match event.kind {
            EventKind::CheckIn => {
                if open.is_some() {
                    unmatched.push(UnmatchedEvent {
                        event,
                        reason: UnmatchedReason::CheckInAlreadyOpen,
                    });
                } else {
                    open = Some(event);
                }
            }
            EventKind::CheckOut => match open.take() {
                Some(check_in) => {
                    sessions.push(Session {
                        start: check_in.time,
                        end: event.time,
                    });
                }
                None => {
                    unmatched.push(UnmatchedEvent {
                        event,
                        reason: UnmatchedReason::CheckOutWithoutCheckIn,
                    });
                }
            },
        }
    }

    if let Some(check_in) = open {
        unmatched.push(UnmatchedEvent {
            event: check_in,
            reason: UnmatchedReason::CheckInNeverClosed,
        });
    }

    DayAggregate {
        date,
        sessions,
        unmatched,
    }
}

/// Aggregates an employee's events over an inclusive date range.
pub fn aggregate_range<S: EventStore>(
    store: &S,
    employee: &EmployeeName,
    range: DateRange,
) -> Result<RangeAggregate, Error> {
    let mut days = Vec::new();
    if !range.is_empty() {
        let mut events = store.query_events(employee, range, None)?;
        events.sort_by_key(|e| e.date);
        for chunk in events.chunk_by(|a, b| a.date == b.date) {
            days.push(aggregate_day(chunk[0].date, chunk));
        }
    }
    Ok(RangeAggregate {
        employee: employee.clone(),
        range,
        days,
    })
}
