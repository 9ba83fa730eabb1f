//! Habit use-case service.
//!
//! # Responsibility
//! - Validate and default habit drafts before persistence.
//! - Apply partial updates with "absent means unchanged" semantics.
//! - Orchestrate the cascading delete of a habit and its entries.
//!
//! # Invariants
//! - Created habits always carry a store-assigned id.
//! - Update is a read-modify-write inside one unit of work.
//! - Delete removes entries and habit together or not at all.

use crate::model::habit::{Habit, HabitDraft, HabitId, HabitPatch, HabitValidationError};
use crate::repo::entry_repo::EntryRepository;
use crate::repo::habit_repo::HabitRepository;
use crate::repo::store::Store;
use crate::repo::RepoError;
use chrono::{Local, NaiveDate};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from habit service operations.
#[derive(Debug)]
pub enum HabitServiceError {
    /// Caller-supplied habit data violates a precondition.
    InvalidHabit(HabitValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for HabitServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHabit(err) => write!(f, "invalid habit: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent habit state: {details}"),
        }
    }
}

impl Error for HabitServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidHabit(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<HabitValidationError> for HabitServiceError {
    fn from(value: HabitValidationError) -> Self {
        Self::InvalidHabit(value)
    }
}

impl From<RepoError> for HabitServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidHabit(err),
            other => Self::Repo(other),
        }
    }
}

/// Habit service facade over a store implementation.
pub struct HabitService<S: Store> {
    store: S,
}

impl<S: Store> HabitService<S> {
    /// Creates a service using the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists all habits in insertion order.
    pub fn list_habits(&self) -> Result<Vec<Habit>, HabitServiceError> {
        Ok(self.store.habits().list_habits()?)
    }

    /// Gets one habit by id.
    pub fn get_habit(&self, id: HabitId) -> Result<Option<Habit>, HabitServiceError> {
        Ok(self.store.habits().find_habit(id)?)
    }

    /// Reports whether a habit with `id` is stored.
    pub fn habit_exists(&self, id: HabitId) -> Result<bool, HabitServiceError> {
        Ok(self.store.habits().habit_exists(id)?)
    }

    /// Creates a habit, defaulting `created_at` to the local calendar date.
    pub fn create_habit(&self, draft: HabitDraft) -> Result<Habit, HabitServiceError> {
        self.create_habit_on(draft, Local::now().date_naive())
    }

    /// Creates a habit using `today` as the `created_at` fallback.
    ///
    /// # Contract
    /// - Fails with `InvalidHabit(BlankName)` for a missing or blank name.
    /// - `kind` defaults to `HabitType::Daily`.
    /// - Returns the persisted habit as read back from the store.
    pub fn create_habit_on(
        &self,
        draft: HabitDraft,
        today: NaiveDate,
    ) -> Result<Habit, HabitServiceError> {
        let habit = draft.into_habit(today).inspect_err(|err| {
            warn!("event=habit_create module=service status=rejected reason={err}");
        })?;

        let created = self
            .store
            .atomically(|store| -> Result<Habit, HabitServiceError> {
                let id = store.habits().insert_habit(&habit)?;
                store
                    .habits()
                    .find_habit(id)?
                    .ok_or(HabitServiceError::InconsistentState(
                        "created habit not found in read-back",
                    ))
            })?;

        info!(
            "event=habit_create module=service status=ok habit_id={} type={}",
            created.id.unwrap_or_default(),
            created.kind.as_str()
        );
        Ok(created)
    }

    /// Overwrites the fields supplied in `patch`.
    ///
    /// Returns `Ok(None)` when no habit with `id` exists.
    pub fn update_habit(
        &self,
        id: HabitId,
        patch: &HabitPatch,
    ) -> Result<Option<Habit>, HabitServiceError> {
        let updated = self
            .store
            .atomically(|store| -> Result<Option<Habit>, HabitServiceError> {
                let Some(mut habit) = store.habits().find_habit(id)? else {
                    return Ok(None);
                };
                if patch.is_empty() {
                    return Ok(Some(habit));
                }
                habit.apply_patch(patch)?;
                store.habits().update_habit(&habit)?;
                Ok(Some(habit))
            })?;

        match &updated {
            Some(_) => info!("event=habit_update module=service status=ok habit_id={id}"),
            None => warn!("event=habit_update module=service status=not_found habit_id={id}"),
        }
        Ok(updated)
    }

    /// Deletes a habit together with every entry referencing it.
    ///
    /// Returns `Ok(false)` when no habit with `id` exists.
    pub fn delete_habit(&self, id: HabitId) -> Result<bool, HabitServiceError> {
        let purged = self
            .store
            .atomically(|store| -> Result<Option<usize>, HabitServiceError> {
                if !store.habits().habit_exists(id)? {
                    return Ok(None);
                }
                let purged = store.entries().delete_by_habit(id)?;
                store.habits().delete_habit(id)?;
                Ok(Some(purged))
            })?;

        match purged {
            Some(entries) => {
                info!(
                    "event=habit_delete module=service status=ok habit_id={id} entries_removed={entries}"
                );
                Ok(true)
            }
            None => {
                warn!("event=habit_delete module=service status=not_found habit_id={id}");
                Ok(false)
            }
        }
    }
}
