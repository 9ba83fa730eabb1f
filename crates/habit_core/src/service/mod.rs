//! Core use-case services.
//!
//! # Responsibility
//! - Enforce validation, default-value and consistency rules above the store.
//! - Keep boundary layers (CLI, HTTP) decoupled from storage details.

pub mod entry_service;
pub mod habit_service;
