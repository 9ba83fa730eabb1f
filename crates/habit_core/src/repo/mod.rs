//! Repository layer: store contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the habit/entry store contracts consumed by services.
//! - Isolate SQLite query details from service orchestration.
//! - Provide the unit-of-work boundary (`Store::atomically`).
//!
//! # Invariants
//! - Habit writes call `Habit::validate()` before SQL mutations.
//! - Uniqueness of `(habit_id, date)` is enforced by the schema, not by
//!   check-then-act in application code.
//! - Repository APIs return semantic errors (`HabitNotFound`,
//!   `EntryNotFound`, `DuplicateEntry`) in addition to DB transport errors.

pub mod entry_repo;
pub mod habit_repo;
pub mod store;

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::entry::{
    ensure_storable_date, format_entry_date, EntryId, EntryValidationError,
};
use crate::model::habit::{HabitId, HabitValidationError};
use chrono::NaiveDate;
use rusqlite::{ffi, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for habit/entry persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed model validation before reaching SQL.
    Validation(HabitValidationError),
    /// Entry date cannot be stored or queried.
    InvalidDate(EntryValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target habit does not exist.
    HabitNotFound(HabitId),
    /// Target entry does not exist.
    EntryNotFound(EntryId),
    /// An entry for this habit and date already exists.
    DuplicateEntry { habit_id: HabitId, date: NaiveDate },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidDate(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::EntryNotFound(id) => write!(f, "habit entry not found: {id}"),
            Self::DuplicateEntry { habit_id, date } => {
                write!(f, "entry already exists for habit {habit_id} on {date}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "habit store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "habit store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "habit store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted habit data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidDate(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HabitValidationError> for RepoError {
    fn from(value: HabitValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<EntryValidationError> for RepoError {
    fn from(value: EntryValidationError) -> Self {
        Self::InvalidDate(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// SQLite constraint family a failed write tripped, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstraintKind {
    Unique,
    ForeignKey,
}

pub(crate) fn constraint_kind(err: &rusqlite::Error) -> Option<ConstraintKind> {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                Some(ConstraintKind::Unique)
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(ConstraintKind::ForeignKey),
            _ => None,
        },
        _ => None,
    }
}

/// Verifies schema version and the columns a repository reads or writes.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

/// Renders a date for binding, rejecting years whose text form would not
/// order chronologically.
pub(crate) fn date_param(date: NaiveDate) -> RepoResult<String> {
    Ok(format_entry_date(ensure_storable_date(date)?))
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
