//! Unit-of-work boundary over the habit and entry repositories.
//!
//! # Responsibility
//! - Bundle both store contracts behind one handle for services.
//! - Run multi-step mutations inside one SQLite write transaction.
//!
//! # Invariants
//! - `atomically` commits only when the work returns `Ok`; any `Err` rolls
//!   back every write made through this store inside the closure.
//! - `atomically` takes the write lock up front (`BEGIN IMMEDIATE`), so reads
//!   inside the closure observe state no other writer can change before commit.
//! - Units of work do not nest.

use crate::repo::entry_repo::{EntryRepository, SqliteEntryRepository};
use crate::repo::habit_repo::{HabitRepository, SqliteHabitRepository};
use crate::repo::{RepoError, RepoResult};
use log::warn;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Storage handle consumed by services.
pub trait Store {
    type Habits: HabitRepository;
    type Entries: EntryRepository;

    fn habits(&self) -> &Self::Habits;
    fn entries(&self) -> &Self::Entries;

    /// Runs `work` as one atomic unit against this store.
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>;
}

/// SQLite-backed store sharing one connection across both repositories.
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
    habits: SqliteHabitRepository<'conn>,
    entries: SqliteEntryRepository<'conn>,
}

impl<'conn> SqliteStore<'conn> {
    /// Creates store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            conn,
            habits: SqliteHabitRepository::try_new(conn)?,
            entries: SqliteEntryRepository::try_new(conn)?,
        })
    }
}

impl<'conn> Store for SqliteStore<'conn> {
    type Habits = SqliteHabitRepository<'conn>;
    type Entries = SqliteEntryRepository<'conn>;

    fn habits(&self) -> &Self::Habits {
        &self.habits
    }

    fn entries(&self) -> &Self::Entries {
        &self.entries
    }

    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        match work(self) {
            Ok(value) => {
                tx.commit().map_err(RepoError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "event=store_rollback module=repo status=error error={rollback_err}"
                    );
                }
                Err(err)
            }
        }
    }
}
