//! Habit store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `habits` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Ids come from SQLite `AUTOINCREMENT` and are never reused.
//! - Write paths call `Habit::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing order is insertion order (`id ASC`).

use crate::model::entry::{format_entry_date, parse_entry_date};
use crate::model::habit::{Habit, HabitId, HabitType};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const HABIT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    color,
    icon,
    type,
    target_per_week,
    created_at
FROM habits";

const HABIT_COLUMNS: &[&str] = &[
    "id",
    "name",
    "description",
    "color",
    "icon",
    "type",
    "target_per_week",
    "created_at",
];

/// Store contract for habit definitions.
pub trait HabitRepository {
    /// Persists a new habit and returns the store-assigned id.
    ///
    /// Any id already present on `habit` is ignored.
    fn insert_habit(&self, habit: &Habit) -> RepoResult<HabitId>;
    fn find_habit(&self, id: HabitId) -> RepoResult<Option<Habit>>;
    /// Lists all habits in insertion order.
    fn list_habits(&self) -> RepoResult<Vec<Habit>>;
    fn habit_exists(&self, id: HabitId) -> RepoResult<bool>;
    /// Overwrites every stored field of `habit` except `id` and `created_at`.
    fn update_habit(&self, habit: &Habit) -> RepoResult<()>;
    /// Deletes one habit row. Fails while entries still reference it.
    fn delete_habit(&self, id: HabitId) -> RepoResult<()>;
}

/// SQLite-backed habit repository.
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "habits", HABIT_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn insert_habit(&self, habit: &Habit) -> RepoResult<HabitId> {
        habit.validate()?;

        self.conn.execute(
            "INSERT INTO habits (
                name,
                description,
                color,
                icon,
                type,
                target_per_week,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                habit.name.as_str(),
                habit.description.as_deref(),
                habit.color.as_deref(),
                habit.icon.as_deref(),
                habit.kind.as_str(),
                habit.target_per_week,
                format_entry_date(habit.created_at),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn find_habit(&self, id: HabitId) -> RepoResult<Option<Habit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HABIT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_habit_row(row)?));
        }
        Ok(None)
    }

    fn list_habits(&self) -> RepoResult<Vec<Habit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HABIT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut habits = Vec::new();
        while let Some(row) = rows.next()? {
            habits.push(parse_habit_row(row)?);
        }
        Ok(habits)
    }

    fn habit_exists(&self, id: HabitId) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM habits WHERE id = ?1;", [id], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn update_habit(&self, habit: &Habit) -> RepoResult<()> {
        let id = habit.id.ok_or_else(|| {
            RepoError::InvalidData("cannot update a habit that has no id".to_string())
        })?;
        habit.validate()?;

        let changed = self.conn.execute(
            "UPDATE habits
             SET
                name = ?1,
                description = ?2,
                color = ?3,
                icon = ?4,
                type = ?5,
                target_per_week = ?6
             WHERE id = ?7;",
            params![
                habit.name.as_str(),
                habit.description.as_deref(),
                habit.color.as_deref(),
                habit.icon.as_deref(),
                habit.kind.as_str(),
                habit.target_per_week,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::HabitNotFound(id));
        }
        Ok(())
    }

    fn delete_habit(&self, id: HabitId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM habits WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::HabitNotFound(id));
        }
        Ok(())
    }
}

fn parse_habit_row(row: &Row<'_>) -> RepoResult<Habit> {
    let type_text: String = row.get("type")?;
    let kind = type_text.parse::<HabitType>().map_err(|_| {
        RepoError::InvalidData(format!("invalid habit type `{type_text}` in habits.type"))
    })?;

    let created_text: String = row.get("created_at")?;
    let created_at = parse_entry_date(&created_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid date `{created_text}` in habits.created_at"
        ))
    })?;

    let habit = Habit {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        description: row.get("description")?,
        color: row.get("color")?,
        icon: row.get("icon")?,
        kind,
        target_per_week: row.get("target_per_week")?,
        created_at,
    };
    habit.validate()?;
    Ok(habit)
}
