//! Storage layer for the attendance tracker.
//!
//! Implements [`att_core::EventStore`] on top of `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send`
//! but not `Sync`. For multi-threaded access either wrap it in a
//! `Mutex` or open one `Database` per thread.
//!
//! # Schema
//!
//! Dates are stored as TEXT in `YYYY-MM-DD` form and times as
//! `HH:MM:SS`, so lexicographic ordering matches chronological ordering
//! and rows stay human-readable. Event IDs are UUIDv4 assigned on
//! append; two scans in the same second therefore coexist as two rows
//! instead of overwriting each other.
//!
//! The `attendance_days` table holds one revision counter per
//! employee-day. Every write to a day bumps it, and appends that carry
//! an expected revision fail with `ConcurrentModification` when the
//! counter has moved, which serializes the resolver's
//! read-decide-append sequence against concurrent kiosks.

use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveTime};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error as ThisError;
use uuid::Uuid;

use att_core::{
    AttendanceEvent, BadgeId, DailySummary, DateRange, Employee, EmployeeName, Error, EventId,
    EventKind, EventStore, NewEvent, Revision,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// A stored row that no longer parses as domain data.
#[derive(Debug, ThisError)]
enum RowError {
    #[error("invalid stored date {value}: {source}")]
    Date {
        value: String,
        source: chrono::ParseError,
    },
    #[error("invalid stored time {value}: {source}")]
    Time {
        value: String,
        source: chrono::ParseError,
    },
    #[error("invalid stored event kind: {0}")]
    Kind(String),
    #[error("invalid stored identifier: {0}")]
    Id(#[from] att_core::ValidationError),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Raw `events` row before conversion into an [`AttendanceEvent`].
struct EventRow {
    id: String,
    employee: String,
    date: String,
    kind: String,
    time: String,
}

impl EventRow {
    fn into_event(self) -> Result<AttendanceEvent, Error> {
        Ok(AttendanceEvent {
            id: EventId::new(self.id).map_err(|e| Error::storage(RowError::Id(e)))?,
            employee: EmployeeName::new(self.employee)
                .map_err(|e| Error::storage(RowError::Id(e)))?,
            date: parse_date(&self.date)?,
            kind: self
                .kind
                .parse::<EventKind>()
                .map_err(|_| Error::storage(RowError::Kind(self.kind)))?,
            time: parse_time(&self.time)?,
        })
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| {
        Error::storage(RowError::Date {
            value: value.to_string(),
            source,
        })
    })
}

fn parse_time(value: &str) -> Result<NaiveTime, Error> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|source| {
        Error::storage(RowError::Time {
            value: value.to_string(),
            source,
        })
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let conn = Connection::open(path).map_err(Error::storage)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory().map_err(Error::storage)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized
    /// database.
    fn init(&self) -> Result<(), Error> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS employees (
                    name TEXT PRIMARY KEY,
                    badge_id TEXT NOT NULL UNIQUE
                );

                -- Attendance log: one row per check-in or check-out.
                -- date: YYYY-MM-DD, time: HH:MM:SS (whole seconds)
                CREATE TABLE IF NOT EXISTS events (
                    id TEXT PRIMARY KEY,
                    employee_name TEXT NOT NULL,
                    date TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    time TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_events_employee_date
                    ON events(employee_name, date);
                CREATE INDEX IF NOT EXISTS idx_events_kind ON events(kind);

                -- Per employee-day write counter for compare-and-append.
                CREATE TABLE IF NOT EXISTS attendance_days (
                    employee_name TEXT NOT NULL,
                    date TEXT NOT NULL,
                    revision INTEGER NOT NULL DEFAULT 0,
                    PRIMARY KEY (employee_name, date)
                );

                -- Derived cache of the aggregator's daily totals.
                CREATE TABLE IF NOT EXISTS daily_summaries (
                    employee_name TEXT NOT NULL,
                    date TEXT NOT NULL,
                    total_seconds INTEGER NOT NULL,
                    PRIMARY KEY (employee_name, date)
                );
                ",
            )
            .map_err(Error::storage)
    }

    fn revision_of(
        conn: &Connection,
        employee: &EmployeeName,
        date: &str,
    ) -> Result<Revision, Error> {
        conn.query_row(
            "SELECT revision FROM attendance_days WHERE employee_name = ?1 AND date = ?2",
            params![employee.as_str(), date],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::storage)
        .map(|revision| revision.unwrap_or(0))
    }

    fn bump_revision(conn: &Connection, employee: &str, date: &str) -> Result<(), Error> {
        conn.execute(
            "
            INSERT INTO attendance_days (employee_name, date, revision)
            VALUES (?1, ?2, 1)
            ON CONFLICT(employee_name, date) DO UPDATE SET revision = revision + 1
            ",
            params![employee, date],
        )
        .map_err(Error::storage)?;
        Ok(())
    }
}

impl EventStore for Database {
    fn register_employee(
        &mut self,
        name: EmployeeName,
        badge_id: BadgeId,
    ) -> Result<Employee, Error> {
        let tx = self.conn.transaction().map_err(Error::storage)?;
        let taken: Option<String> = tx
            .query_row(
                "SELECT name FROM employees WHERE badge_id = ?1",
                params![badge_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(Error::storage)?;
        if taken.is_some() {
            return Err(Error::DuplicateBadge(badge_id));
        }
        tx.execute(
            "INSERT INTO employees (name, badge_id) VALUES (?1, ?2)",
            params![name.as_str(), badge_id.as_str()],
        )
        .map_err(Error::storage)?;
        tx.commit().map_err(Error::storage)?;
        tracing::debug!(employee = %name, badge = %badge_id, "registered employee");
        Ok(Employee { name, badge_id })
    }

    fn find_employee(&self, badge_id: &BadgeId) -> Result<Option<Employee>, Error> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT name, badge_id FROM employees WHERE badge_id = ?1",
                params![badge_id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(Error::storage)?;
        row.map(|(name, badge)| {
            Ok(Employee {
                name: EmployeeName::new(name).map_err(|e| Error::storage(RowError::Id(e)))?,
                badge_id: BadgeId::new(badge).map_err(|e| Error::storage(RowError::Id(e)))?,
            })
        })
        .transpose()
    }

    fn list_employees(&self) -> Result<Vec<Employee>, Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, badge_id FROM employees ORDER BY name ASC")
            .map_err(Error::storage)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(Error::storage)?;

        let mut employees = Vec::new();
        for row in rows {
            let (name, badge) = row.map_err(Error::storage)?;
            employees.push(Employee {
                name: EmployeeName::new(name).map_err(|e| Error::storage(RowError::Id(e)))?,
                badge_id: BadgeId::new(badge).map_err(|e| Error::storage(RowError::Id(e)))?,
            });
        }
        Ok(employees)
    }

    fn day_revision(&self, employee: &EmployeeName, date: NaiveDate) -> Result<Revision, Error> {
        Self::revision_of(&self.conn, employee, &format_date(date))
    }

    fn append_event(
        &mut self,
        event: NewEvent,
        expected_revision: Option<Revision>,
    ) -> Result<EventId, Error> {
        let date = format_date(event.date);
        let tx = self.conn.transaction().map_err(Error::storage)?;

        let current = Self::revision_of(&tx, &event.employee, &date)?;
        if let Some(expected) = expected_revision {
            if expected != current {
                return Err(Error::ConcurrentModification {
                    employee: event.employee,
                    date: event.date,
                });
            }
        }

        let id = Uuid::new_v4().to_string();
        tx.execute(
            "INSERT INTO events (id, employee_name, date, kind, time) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                event.employee.as_str(),
                date,
                event.kind.as_str(),
                format_time(event.time),
            ],
        )
        .map_err(Error::storage)?;
        Self::bump_revision(&tx, event.employee.as_str(), &date)?;
        tx.commit().map_err(Error::storage)?;

        EventId::new(id).map_err(|e| Error::storage(RowError::Id(e)))
    }

    fn query_events(
        &self,
        employee: &EmployeeName,
        range: DateRange,
        kind: Option<EventKind>,
    ) -> Result<Vec<AttendanceEvent>, Error> {
        let mut sql = String::from(
            "
            SELECT id, employee_name, date, kind, time
            FROM events
            WHERE employee_name = ?1 AND date >= ?2 AND date <= ?3
            ",
        );
        if kind.is_some() {
            sql.push_str(" AND kind = ?4");
        }
        sql.push_str(" ORDER BY date ASC, time ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql).map_err(Error::storage)?;
        let map_row = |row: &rusqlite::Row<'_>| {
            Ok(EventRow {
                id: row.get(0)?,
                employee: row.get(1)?,
                date: row.get(2)?,
                kind: row.get(3)?,
                time: row.get(4)?,
            })
        };
        let start = format_date(range.start);
        let end = format_date(range.end);
        let rows = match kind {
            Some(kind) => stmt
                .query_map(
                    params![employee.as_str(), start, end, kind.as_str()],
                    map_row,
                )
                .map_err(Error::storage)?,
            None => stmt
                .query_map(params![employee.as_str(), start, end], map_row)
                .map_err(Error::storage)?,
        };

        let mut events = Vec::new();
        for row in rows {
            events.push(row.map_err(Error::storage)?.into_event()?);
        }
        Ok(events)
    }

    fn get_event(&self, id: &EventId) -> Result<Option<AttendanceEvent>, Error> {
        let row = self
            .conn
            .query_row(
                "SELECT id, employee_name, date, kind, time FROM events WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(EventRow {
                        id: row.get(0)?,
                        employee: row.get(1)?,
                        date: row.get(2)?,
                        kind: row.get(3)?,
                        time: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(Error::storage)?;
        row.map(EventRow::into_event).transpose()
    }

    fn update_event(&mut self, id: &EventId, new_time: NaiveTime) -> Result<(), Error> {
        let tx = self.conn.transaction().map_err(Error::storage)?;
        let located: Option<(String, String)> = tx
            .query_row(
                "SELECT employee_name, date FROM events WHERE id = ?1",
                params![id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(Error::storage)?;
        let Some((employee, date)) = located else {
            return Err(Error::NotFound(id.clone()));
        };

        tx.execute(
            "UPDATE events SET time = ?1 WHERE id = ?2",
            params![format_time(new_time), id.as_str()],
        )
        .map_err(Error::storage)?;
        Self::bump_revision(&tx, &employee, &date)?;
        tx.commit().map_err(Error::storage)
    }

    fn delete_event(&mut self, id: &EventId) -> Result<(), Error> {
        let tx = self.conn.transaction().map_err(Error::storage)?;
        let located: Option<(String, String)> = tx
            .query_row(
                "SELECT employee_name, date FROM events WHERE id = ?1",
                params![id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(Error::storage)?;
        let Some((employee, date)) = located else {
            return Err(Error::NotFound(id.clone()));
        };

        tx.execute("DELETE FROM events WHERE id = ?1", params![id.as_str()])
            .map_err(Error::storage)?;
        Self::bump_revision(&tx, &employee, &date)?;
        tx.commit().map_err(Error::storage)
    }

    fn upsert_daily_summary(&mut self, summary: &DailySummary) -> Result<(), Error> {
        self.conn
            .execute(
                "
                INSERT INTO daily_summaries (employee_name, date, total_seconds)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(employee_name, date) DO UPDATE SET
                    total_seconds = excluded.total_seconds
                ",
                params![
                    summary.employee.as_str(),
                    format_date(summary.date),
                    summary.total.num_seconds(),
                ],
            )
            .map_err(Error::storage)?;
        Ok(())
    }

    fn daily_summary(
        &self,
        employee: &EmployeeName,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>, Error> {
        let total_seconds: Option<i64> = self
            .conn
            .query_row(
                "SELECT total_seconds FROM daily_summaries WHERE employee_name = ?1 AND date = ?2",
                params![employee.as_str(), format_date(date)],
                |row| row.get(0),
            )
            .optional()
            .map_err(Error::storage)?;
        Ok(total_seconds.map(|seconds| DailySummary {
            employee: employee.clone(),
            date,
            total: Duration::seconds(seconds),
        }))
    }
}
