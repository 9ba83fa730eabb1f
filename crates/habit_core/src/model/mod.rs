//! Habit tracking domain model.
//!
//! # Responsibility
//! - Define the habit definition and per-day entry records used by core.
//! - Keep creation/patch inputs separate from persisted records.
//!
//! # Invariants
//! - Identifiers are assigned by the store, never by core.
//! - At most one entry exists per (habit, date) pair.

pub mod entry;
pub mod habit;
