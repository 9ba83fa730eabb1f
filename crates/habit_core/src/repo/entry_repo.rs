//! Habit entry store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide lookup, range and upsert APIs over `habit_entries`.
//! - Translate SQLite constraint failures into semantic errors.
//!
//! # Invariants
//! - `(habit_id, date)` is unique; the `UNIQUE` index is the arbiter.
//! - Toggle/set are single-statement upserts, so two racing writers for the
//!   same key leave exactly one row and the later one acts as an update.
//! - Range queries are inclusive on both ends; `end < start` yields nothing.
//! - Dates are stored as `YYYY-MM-DD` text restricted to years 0000..=9999,
//!   so text order is date order. Out-of-range inputs fail with
//!   `InvalidDate` before any SQL runs.

use crate::model::entry::{parse_entry_date, EntryId, HabitEntry};
use crate::model::habit::HabitId;
use crate::repo::{
    constraint_kind, date_param, ensure_connection_ready, ConstraintKind, RepoError, RepoResult,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Params, Row};

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    habit_id,
    date,
    completed
FROM habit_entries";

const ENTRY_COLUMNS: &[&str] = &["id", "habit_id", "date", "completed"];

const TOGGLE_UPSERT_SQL: &str = "INSERT INTO habit_entries (habit_id, date, completed)
    VALUES (?1, ?2, 1)
    ON CONFLICT (habit_id, date) DO UPDATE SET completed = 1 - completed
    RETURNING id, habit_id, date, completed;";

const SET_UPSERT_SQL: &str = "INSERT INTO habit_entries (habit_id, date, completed)
    VALUES (?1, ?2, ?3)
    ON CONFLICT (habit_id, date) DO UPDATE SET completed = excluded.completed
    RETURNING id, habit_id, date, completed;";

/// Store contract for per-date habit entries.
pub trait EntryRepository {
    /// Inserts a new entry. Fails with `DuplicateEntry` when the
    /// `(habit_id, date)` pair is taken.
    fn insert_entry(&self, entry: &HabitEntry) -> RepoResult<EntryId>;
    fn find_entry(&self, id: EntryId) -> RepoResult<Option<HabitEntry>>;
    fn find_by_habit_and_date(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
    ) -> RepoResult<Option<HabitEntry>>;
    /// Lists one habit's entries ordered by date.
    fn list_by_habit(&self, habit_id: HabitId) -> RepoResult<Vec<HabitEntry>>;
    fn list_by_habit_in_range(
        &self,
        habit_id: HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<HabitEntry>>;
    /// Lists entries of all habits on one date, ordered by habit.
    fn list_by_date(&self, date: NaiveDate) -> RepoResult<Vec<HabitEntry>>;
    fn list_in_range(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<Vec<HabitEntry>>;
    /// Creates the entry as completed, or flips `completed` when it exists.
    fn toggle_entry(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<HabitEntry>;
    /// Creates the entry with `completed`, or overwrites it when it exists.
    fn set_entry(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
        completed: bool,
    ) -> RepoResult<HabitEntry>;
    fn delete_entry(&self, id: EntryId) -> RepoResult<()>;
    /// Deletes every entry of one habit and returns how many were removed.
    fn delete_by_habit(&self, habit_id: HabitId) -> RepoResult<usize>;
}

/// SQLite-backed entry repository.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "habit_entries", ENTRY_COLUMNS)?;
        Ok(Self { conn })
    }

    fn query_entries(&self, sql: &str, params: impl Params) -> RepoResult<Vec<HabitEntry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn upsert(&self, sql: &str, habit_id: HabitId, params: impl Params) -> RepoResult<HabitEntry> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt
            .query(params)
            .map_err(|err| map_write_error(err, habit_id))?;
        let row = rows
            .next()
            .map_err(|err| map_write_error(err, habit_id))?
            .ok_or_else(|| {
                RepoError::InvalidData("entry upsert returned no row".to_string())
            })?;
        parse_entry_row(row)
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn insert_entry(&self, entry: &HabitEntry) -> RepoResult<EntryId> {
        let date = date_param(entry.date)?;
        self.conn
            .execute(
                "INSERT INTO habit_entries (habit_id, date, completed) VALUES (?1, ?2, ?3);",
                params![entry.habit_id, date, entry.completed],
            )
            .map_err(|err| match constraint_kind(&err) {
                Some(ConstraintKind::Unique) => RepoError::DuplicateEntry {
                    habit_id: entry.habit_id,
                    date: entry.date,
                },
                _ => map_write_error(err, entry.habit_id),
            })?;

        Ok(self.conn.last_insert_rowid())
    }

    fn find_entry(&self, id: EntryId) -> RepoResult<Option<HabitEntry>> {
        let mut entries =
            self.query_entries(&format!("{ENTRY_SELECT_SQL} WHERE id = ?1;"), [id])?;
        Ok(entries.pop())
    }

    fn find_by_habit_and_date(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
    ) -> RepoResult<Option<HabitEntry>> {
        let mut entries = self.query_entries(
            &format!("{ENTRY_SELECT_SQL} WHERE habit_id = ?1 AND date = ?2;"),
            params![habit_id, date_param(date)?],
        )?;
        Ok(entries.pop())
    }

    fn list_by_habit(&self, habit_id: HabitId) -> RepoResult<Vec<HabitEntry>> {
        self.query_entries(
            &format!("{ENTRY_SELECT_SQL} WHERE habit_id = ?1 ORDER BY date ASC, id ASC;"),
            [habit_id],
        )
    }

    fn list_by_habit_in_range(
        &self,
        habit_id: HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<HabitEntry>> {
        let (start_text, end_text) = (date_param(start)?, date_param(end)?);
        if end < start {
            return Ok(Vec::new());
        }
        self.query_entries(
            &format!(
                "{ENTRY_SELECT_SQL}
                 WHERE habit_id = ?1
                   AND date BETWEEN ?2 AND ?3
                 ORDER BY date ASC, id ASC;"
            ),
            params![habit_id, start_text, end_text],
        )
    }

    fn list_by_date(&self, date: NaiveDate) -> RepoResult<Vec<HabitEntry>> {
        self.query_entries(
            &format!("{ENTRY_SELECT_SQL} WHERE date = ?1 ORDER BY habit_id ASC, id ASC;"),
            [date_param(date)?],
        )
    }

    fn list_in_range(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<Vec<HabitEntry>> {
        let (start_text, end_text) = (date_param(start)?, date_param(end)?);
        if end < start {
            return Ok(Vec::new());
        }
        self.query_entries(
            &format!(
                "{ENTRY_SELECT_SQL}
                 WHERE date BETWEEN ?1 AND ?2
                 ORDER BY date ASC, habit_id ASC, id ASC;"
            ),
            params![start_text, end_text],
        )
    }

    fn toggle_entry(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<HabitEntry> {
        self.upsert(
            TOGGLE_UPSERT_SQL,
            habit_id,
            params![habit_id, date_param(date)?],
        )
    }

    fn set_entry(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
        completed: bool,
    ) -> RepoResult<HabitEntry> {
        self.upsert(
            SET_UPSERT_SQL,
            habit_id,
            params![habit_id, date_param(date)?, completed],
        )
    }

    fn delete_entry(&self, id: EntryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM habit_entries WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::EntryNotFound(id));
        }
        Ok(())
    }

    fn delete_by_habit(&self, habit_id: HabitId) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM habit_entries WHERE habit_id = ?1;", [habit_id])?;
        Ok(removed)
    }
}

fn map_write_error(err: rusqlite::Error, habit_id: HabitId) -> RepoError {
    match constraint_kind(&err) {
        Some(ConstraintKind::ForeignKey) => RepoError::HabitNotFound(habit_id),
        _ => err.into(),
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<HabitEntry> {
    let date_text: String = row.get("date")?;
    let date = parse_entry_date(&date_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{date_text}` in habit_entries.date"))
    })?;

    Ok(HabitEntry {
        id: Some(row.get("id")?),
        habit_id: row.get("habit_id")?,
        date,
        completed: row.get("completed")?,
    })
}
