//! Habit domain model.
//!
//! # Responsibility
//! - Define the canonical habit definition record.
//! - Provide creation drafts and partial-update patches with explicit
//!   "not supplied" semantics.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one and never changes afterwards.
//! - `name` is never blank after trimming.
//! - `created_at` lies within the storable year range of entry dates.
//! - `target_per_week` is advisory and not range-checked.

use crate::model::entry::ensure_storable_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned surrogate key for habits.
pub type HabitId = i64;

/// Recurrence category of a habit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HabitType {
    /// Expected once per calendar day.
    #[default]
    Daily,
    /// Expected `target_per_week` times per week.
    Weekly,
}

impl HabitType {
    /// Lowercase storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl FromStr for HabitType {
    type Err = HabitValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            _ => Err(HabitValidationError::UnknownType(value.to_string())),
        }
    }
}

/// Validation failures for habit inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitValidationError {
    /// Name is missing, empty or whitespace-only.
    BlankName,
    /// Habit type label is not `daily` or `weekly`.
    UnknownType(String),
    /// `created_at` lies outside years 0000..=9999.
    CreatedAtOutOfRange(NaiveDate),
}

impl Display for HabitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name is required"),
            Self::UnknownType(value) => {
                write!(f, "unknown habit type `{value}`; expected daily|weekly")
            }
            Self::CreatedAtOutOfRange(date) => {
                write!(f, "createdAt `{date}` is outside years 0000..=9999")
            }
        }
    }
}

impl Error for HabitValidationError {}

/// Persisted habit definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Store-assigned id. `None` before persistence.
    pub id: Option<HabitId>,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: HabitType,
    /// Meaningful only when `kind == HabitType::Weekly`.
    pub target_per_week: Option<i32>,
    pub created_at: NaiveDate,
}

impl Habit {
    /// Creates an unpersisted daily habit with no optional fields set.
    pub fn new(name: impl Into<String>, created_at: NaiveDate) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            color: None,
            icon: None,
            kind: HabitType::Daily,
            target_per_week: None,
            created_at,
        }
    }

    /// Checks record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), HabitValidationError> {
        validate_name(&self.name)?;
        ensure_storable_date(self.created_at)
            .map_err(|_| HabitValidationError::CreatedAtOutOfRange(self.created_at))?;
        Ok(())
    }

    /// Overwrites every field supplied in `patch`, leaving the rest untouched.
    ///
    /// # Errors
    /// - Returns `BlankName` when the patch supplies a blank name. The habit
    ///   is left unchanged in that case.
    pub fn apply_patch(&mut self, patch: &HabitPatch) -> Result<(), HabitValidationError> {
        if let Some(name) = patch.name.as_deref() {
            validate_name(name)?;
        }

        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(color) = &patch.color {
            self.color = Some(color.clone());
        }
        if let Some(icon) = &patch.icon {
            self.icon = Some(icon.clone());
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(target) = patch.target_per_week {
            self.target_per_week = Some(target);
        }
        Ok(())
    }
}

/// Creation input for a habit.
///
/// Carries no id: identifiers only ever come from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HabitDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<HabitType>,
    pub target_per_week: Option<i32>,
    pub created_at: Option<NaiveDate>,
}

impl HabitDraft {
    /// Draft with only a name supplied.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Resolves defaults into an unpersisted habit.
    ///
    /// - `created_at` falls back to `today`.
    /// - `kind` falls back to `HabitType::Daily`.
    pub fn into_habit(self, today: NaiveDate) -> Result<Habit, HabitValidationError> {
        let name = self.name.ok_or(HabitValidationError::BlankName)?;
        let habit = Habit {
            id: None,
            name,
            description: self.description,
            color: self.color,
            icon: self.icon,
            kind: self.kind.unwrap_or_default(),
            target_per_week: self.target_per_week,
            created_at: self.created_at.unwrap_or(today),
        };
        habit.validate()?;
        Ok(habit)
    }
}

/// Partial update for a habit.
///
/// `None` means "not supplied, keep the stored value". There is no way to
/// clear an optional field through a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<HabitType>,
    pub target_per_week: Option<i32>,
}

impl HabitPatch {
    /// Returns whether the patch supplies no field at all.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn validate_name(name: &str) -> Result<(), HabitValidationError> {
    if name.trim().is_empty() {
        return Err(HabitValidationError::BlankName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Habit, HabitDraft, HabitPatch, HabitType, HabitValidationError};
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn draft_defaults_type_and_created_at() {
        let habit = HabitDraft::named("Sport")
            .into_habit(day(2025, 1, 1))
            .unwrap();
        assert_eq!(habit.id, None);
        assert_eq!(habit.kind, HabitType::Daily);
        assert_eq!(habit.created_at, day(2025, 1, 1));
    }

    #[test]
    fn draft_keeps_supplied_created_at() {
        let draft = HabitDraft {
            created_at: Some(day(2024, 6, 30)),
            kind: Some(HabitType::Weekly),
            ..HabitDraft::named("Read")
        };
        let habit = draft.into_habit(day(2025, 1, 1)).unwrap();
        assert_eq!(habit.created_at, day(2024, 6, 30));
        assert_eq!(habit.kind, HabitType::Weekly);
    }

    #[test]
    fn draft_rejects_missing_or_blank_name() {
        let missing = HabitDraft::default().into_habit(day(2025, 1, 1));
        assert_eq!(missing, Err(HabitValidationError::BlankName));

        let blank = HabitDraft::named("   \t").into_habit(day(2025, 1, 1));
        assert_eq!(blank, Err(HabitValidationError::BlankName));
    }

    #[test]
    fn draft_rejects_created_at_beyond_four_digit_years() {
        let draft = HabitDraft {
            created_at: Some(day(10_000, 1, 1)),
            ..HabitDraft::named("Read")
        };
        assert_eq!(
            draft.into_habit(day(2025, 1, 1)),
            Err(HabitValidationError::CreatedAtOutOfRange(day(10_000, 1, 1)))
        );
    }

    #[test]
    fn patch_with_blank_name_leaves_habit_untouched() {
        let mut habit = Habit::new("Walk", day(2025, 1, 1));
        let patch = HabitPatch {
            name: Some(" ".to_string()),
            color: Some("green".to_string()),
            ..HabitPatch::default()
        };
        assert!(habit.apply_patch(&patch).is_err());
        assert_eq!(habit.name, "Walk");
        assert_eq!(habit.color, None);
    }

    #[test]
    fn habit_type_parses_case_insensitively() {
        assert_eq!("WEEKLY".parse::<HabitType>().unwrap(), HabitType::Weekly);
        assert_eq!(" daily ".parse::<HabitType>().unwrap(), HabitType::Daily);
        assert!("monthly".parse::<HabitType>().is_err());
    }
}
