//! Core domain logic for the habit tracker.
//! This crate is the single source of truth for habit/entry consistency rules.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::entry::{parse_entry_date, EntryId, EntryValidationError, HabitEntry};
pub use model::habit::{Habit, HabitDraft, HabitId, HabitPatch, HabitType, HabitValidationError};
pub use repo::entry_repo::{EntryRepository, SqliteEntryRepository};
pub use repo::habit_repo::{HabitRepository, SqliteHabitRepository};
pub use repo::store::{SqliteStore, Store};
pub use repo::{RepoError, RepoResult};
pub use service::entry_service::{EntryService, EntryServiceError};
pub use service::habit_service::{HabitService, HabitServiceError};

/// Minimal health-check API for boundary layers.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
