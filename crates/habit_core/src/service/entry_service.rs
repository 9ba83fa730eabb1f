//! Habit entry use-case service.
//!
//! # Responsibility
//! - Provide per-habit and cross-habit entry queries.
//! - Implement toggle and set upserts keyed by `(habit, date)`.
//!
//! # Invariants
//! - Habit-scoped operations fail with `HabitNotFound` for unknown habits.
//! - Dates outside years 0000..=9999 fail with `InvalidDate`.
//! - The habit check and the upsert run in one unit of work.
//! - Toggle on a missing entry creates it completed; set converges to the
//!   requested state no matter how often it is repeated.

use crate::model::entry::{EntryId, EntryValidationError, HabitEntry};
use crate::model::habit::HabitId;
use crate::repo::entry_repo::EntryRepository;
use crate::repo::habit_repo::HabitRepository;
use crate::repo::store::Store;
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from entry service operations.
#[derive(Debug)]
pub enum EntryServiceError {
    /// Referenced habit does not exist.
    HabitNotFound(HabitId),
    /// Supplied date cannot be stored or queried.
    InvalidDate(EntryValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for EntryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::InvalidDate(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EntryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDate(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::HabitNotFound(_) => None,
        }
    }
}

impl From<RepoError> for EntryServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::HabitNotFound(id) => Self::HabitNotFound(id),
            RepoError::InvalidDate(err) => Self::InvalidDate(err),
            other => Self::Repo(other),
        }
    }
}

/// Entry service facade over a store implementation.
pub struct EntryService<S: Store> {
    store: S,
}

impl<S: Store> EntryService<S> {
    /// Creates a service using the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists all entries of one habit ordered by date.
    pub fn list_for_habit(&self, habit_id: HabitId) -> Result<Vec<HabitEntry>, EntryServiceError> {
        ensure_habit_exists(&self.store, habit_id)?;
        Ok(self.store.entries().list_by_habit(habit_id)?)
    }

    /// Lists one habit's entries with `start <= date <= end`.
    ///
    /// An inverted range (`end < start`) yields an empty list.
    pub fn list_for_habit_in_range(
        &self,
        habit_id: HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HabitEntry>, EntryServiceError> {
        ensure_habit_exists(&self.store, habit_id)?;
        Ok(self
            .store
            .entries()
            .list_by_habit_in_range(habit_id, start, end)?)
    }

    /// Lists entries of every habit on `date`.
    pub fn list_for_date(&self, date: NaiveDate) -> Result<Vec<HabitEntry>, EntryServiceError> {
        Ok(self.store.entries().list_by_date(date)?)
    }

    /// Lists entries of every habit with `start <= date <= end`.
    pub fn list_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HabitEntry>, EntryServiceError> {
        Ok(self.store.entries().list_in_range(start, end)?)
    }

    /// Flips completion for `(habit_id, date)`, creating a completed entry
    /// when none exists.
    pub fn toggle_entry(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
    ) -> Result<HabitEntry, EntryServiceError> {
        let entry = self
            .store
            .atomically(|store| -> Result<HabitEntry, EntryServiceError> {
                ensure_habit_exists(store, habit_id)?;
                Ok(store.entries().toggle_entry(habit_id, date)?)
            })?;

        debug!(
            "event=entry_toggle module=service status=ok habit_id={habit_id} date={date} completed={}",
            entry.completed
        );
        Ok(entry)
    }

    /// Sets completion for `(habit_id, date)`, creating the entry when none
    /// exists.
    pub fn set_entry(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
        completed: bool,
    ) -> Result<HabitEntry, EntryServiceError> {
        let entry = self
            .store
            .atomically(|store| -> Result<HabitEntry, EntryServiceError> {
                ensure_habit_exists(store, habit_id)?;
                Ok(store.entries().set_entry(habit_id, date, completed)?)
            })?;

        debug!(
            "event=entry_set module=service status=ok habit_id={habit_id} date={date} completed={completed}"
        );
        Ok(entry)
    }

    /// Deletes one entry. Returns `Ok(false)` when it does not exist.
    pub fn delete_entry(&self, id: EntryId) -> Result<bool, EntryServiceError> {
        match self.store.entries().delete_entry(id) {
            Ok(()) => {
                info!("event=entry_delete module=service status=ok entry_id={id}");
                Ok(true)
            }
            Err(RepoError::EntryNotFound(_)) => {
                warn!("event=entry_delete module=service status=not_found entry_id={id}");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn ensure_habit_exists<S: Store>(store: &S, habit_id: HabitId) -> Result<(), EntryServiceError> {
    if store.habits().habit_exists(habit_id)? {
        return Ok(());
    }
    warn!("event=entry_habit_lookup module=service status=not_found habit_id={habit_id}");
    Err(EntryServiceError::HabitNotFound(habit_id))
}
