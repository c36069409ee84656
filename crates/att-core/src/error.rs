//! Error taxonomy shared by the resolver, aggregator, editor, and store.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::types::{BadgeId, EmployeeName, EventId};

/// Errors returned by attendance operations.
///
/// Every failure is scoped to a single request; no variant is fatal to
/// the process. [`Error::Storage`] and [`Error::ConcurrentModification`]
/// are transient and safe to retry; all other variants are terminal for
/// that request and require corrected caller input.
#[derive(Debug, Error)]
pub enum Error {
    /// The scanned badge is not bound to any employee.
    #[error("unknown badge: {0}")]
    UnknownBadge(BadgeId),

    /// The badge is already bound to another employee.
    #[error("badge {0} is already registered")]
    DuplicateBadge(BadgeId),

    /// No event exists with the given ID.
    #[error("event not found: {0}")]
    NotFound(EventId),

    /// The edit would produce a session that ends at or before it starts.
    #[error("invalid time range: session would end at {end} but start at {start}")]
    InvalidTimeRange { start: NaiveTime, end: NaiveTime },

    /// A concurrent writer recorded an event for the same employee-day
    /// between read and append. Retryable.
    #[error("concurrent modification for {employee} on {date}")]
    ConcurrentModification {
        employee: EmployeeName,
        date: NaiveDate,
    },

    /// An error from the underlying event store. Retryable.
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps a backend error as a storage failure.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(err))
    }

    /// Whether the operation may be retried without corrected input.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::ConcurrentModification { .. })
    }
}
