//! Habit entry domain model.
//!
//! # Responsibility
//! - Define the per-date completion record of one habit.
//! - Parse boundary date text into calendar dates.
//!
//! # Invariants
//! - `date` carries no time-of-day component.
//! - `(habit_id, date)` is unique across all entries.
//! - Dates fall within years 0000..=9999, where the `YYYY-MM-DD` text form
//!   has a fixed width and orders chronologically.

use crate::model::habit::HabitId;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned surrogate key for entries.
pub type EntryId = i64;

/// Boundary date format (`YYYY-MM-DD`).
pub const ENTRY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive year bounds of dates the store accepts.
pub const MIN_ENTRY_YEAR: i32 = 0;
pub const MAX_ENTRY_YEAR: i32 = 9999;

/// Validation failures for entry inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    /// Date text is not a valid `YYYY-MM-DD` calendar date.
    InvalidDate(String),
    /// Calendar date lies outside years 0000..=9999.
    DateOutOfRange(NaiveDate),
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate(value) => {
                write!(f, "invalid date `{value}`; expected YYYY-MM-DD")
            }
            Self::DateOutOfRange(date) => write!(
                f,
                "date `{date}` is outside years {MIN_ENTRY_YEAR:04}..={MAX_ENTRY_YEAR}"
            ),
        }
    }
}

impl Error for EntryValidationError {}

/// Completion record of one habit on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitEntry {
    /// Store-assigned id. `None` before persistence.
    pub id: Option<EntryId>,
    /// Non-owning reference to the tracked habit.
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub completed: bool,
}

impl HabitEntry {
    /// Creates an unpersisted entry.
    pub fn new(habit_id: HabitId, date: NaiveDate, completed: bool) -> Self {
        Self {
            id: None,
            habit_id,
            date,
            completed,
        }
    }
}

/// Parses a `YYYY-MM-DD` boundary date.
///
/// Signed or five-digit years are rejected even though chrono accepts them.
pub fn parse_entry_date(value: &str) -> Result<NaiveDate, EntryValidationError> {
    let date = NaiveDate::parse_from_str(value.trim(), ENTRY_DATE_FORMAT)
        .map_err(|_| EntryValidationError::InvalidDate(value.to_string()))?;
    ensure_storable_date(date)
}

/// Checks that `date` has a four-digit, non-negative year.
pub fn ensure_storable_date(date: NaiveDate) -> Result<NaiveDate, EntryValidationError> {
    if (MIN_ENTRY_YEAR..=MAX_ENTRY_YEAR).contains(&date.year()) {
        Ok(date)
    } else {
        Err(EntryValidationError::DateOutOfRange(date))
    }
}

/// Formats a date the way it is exchanged and stored.
pub fn format_entry_date(date: NaiveDate) -> String {
    date.format(ENTRY_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{ensure_storable_date, format_entry_date, parse_entry_date, EntryValidationError};
    use chrono::NaiveDate;

    #[test]
    fn parse_accepts_iso_calendar_dates() {
        let date = parse_entry_date("2025-01-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(format_entry_date(date), "2025-01-01");
    }

    #[test]
    fn parse_rejects_impossible_and_timestamped_values() {
        for value in ["2025-02-30", "2025-01-01T10:00:00", "01/02/2025", ""] {
            assert_eq!(
                parse_entry_date(value),
                Err(EntryValidationError::InvalidDate(value.to_string()))
            );
        }
    }

    #[test]
    fn parse_rejects_years_without_four_digit_text_form() {
        assert!(matches!(
            parse_entry_date("+10000-01-01"),
            Err(EntryValidationError::DateOutOfRange(_))
        ));
        for value in ["-0005-01-01", "+12025-06-01"] {
            assert!(parse_entry_date(value).is_err());
        }
        assert_eq!(
            format_entry_date(parse_entry_date("0000-01-01").unwrap()),
            "0000-01-01"
        );
        assert_eq!(
            format_entry_date(parse_entry_date("9999-12-31").unwrap()),
            "9999-12-31"
        );
    }

    #[test]
    fn storable_dates_are_bounded_by_year() {
        let late = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();
        let early = NaiveDate::from_ymd_opt(-1, 12, 31).unwrap();
        assert_eq!(
            ensure_storable_date(late),
            Err(EntryValidationError::DateOutOfRange(late))
        );
        assert_eq!(
            ensure_storable_date(early),
            Err(EntryValidationError::DateOutOfRange(early))
        );
    }
}
