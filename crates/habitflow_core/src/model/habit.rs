//! Habit domain model and recurrence rules.
//!
//! # Responsibility
//! - Define the canonical habit record owned by one user.
//! - Describe how often a habit recurs (`Recurrence`).
//!
//! # Invariants
//! - `id` is stable and never reused for another habit.
//! - `name` is non-empty after trimming.
//! - Custom weekday sets are non-empty and only hold indices `0..=6`
//!   (`0 = Sunday`).
//! - Habits are immutable once created.

use crate::model::validation::ValidationError;
use chrono::{NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a habit.
pub type HabitId = Uuid;

/// Opaque identity of an authenticated user, supplied by the caller.
pub type OwnerId = Uuid;

/// Recurrence category, as stored in `habits.frequency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Custom,
}

/// Set of weekday indices where `0 = Sunday` and `6 = Saturday`.
///
/// Serialized as an ascending list of indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "Vec<u8>", try_from = "Vec<u8>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// Builds a set from weekday indices; duplicates collapse.
    ///
    /// # Errors
    /// - `WeekdayOutOfRange` for any index above 6.
    pub fn from_indices(indices: &[u8]) -> Result<Self, ValidationError> {
        let mut bits = 0u8;
        for &index in indices {
            if index > 6 {
                return Err(ValidationError::WeekdayOutOfRange(index));
            }
            bits |= 1 << index;
        }
        Ok(Self(bits))
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, weekday: Weekday) -> bool {
        let index = weekday.num_days_from_sunday();
        self.0 & (1 << index) != 0
    }

    /// Member indices in ascending order.
    pub fn indices(self) -> Vec<u8> {
        (0..7).filter(|index| self.0 & (1 << index) != 0).collect()
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(value: WeekdaySet) -> Self {
        value.indices()
    }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
    type Error = ValidationError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_indices(&value)
    }
}

/// How often a habit is due.
///
/// Serialized adjacently as `frequency` + `custom_days`, so the weekday set
/// only appears for custom habits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frequency", content = "custom_days", rename_all = "snake_case")]
pub enum Recurrence {
    /// Every day on or after the start date.
    Daily,
    /// Every seventh day counted from the start date.
    Weekly,
    /// On the listed weekdays only.
    Custom(WeekdaySet),
}

impl Recurrence {
    /// Assembles a recurrence from its storage/request parts.
    ///
    /// `custom_days` is ignored for non-custom frequencies.
    ///
    /// # Errors
    /// - `EmptyCustomDays` when `frequency = Custom` without weekdays.
    /// - `WeekdayOutOfRange` for indices above 6.
    pub fn from_parts(
        frequency: Frequency,
        custom_days: Option<&[u8]>,
    ) -> Result<Self, ValidationError> {
        match frequency {
            Frequency::Daily => Ok(Self::Daily),
            Frequency::Weekly => Ok(Self::Weekly),
            Frequency::Custom => {
                let days = WeekdaySet::from_indices(custom_days.unwrap_or_default())?;
                if days.is_empty() {
                    return Err(ValidationError::EmptyCustomDays);
                }
                Ok(Self::Custom(days))
            }
        }
    }

    pub fn frequency(&self) -> Frequency {
        match self {
            Self::Daily => Frequency::Daily,
            Self::Weekly => Frequency::Weekly,
            Self::Custom(_) => Frequency::Custom,
        }
    }

    /// Weekday set for custom habits, `None` otherwise.
    pub fn custom_days(&self) -> Option<WeekdaySet> {
        match self {
            Self::Custom(days) => Some(*days),
            Self::Daily | Self::Weekly => None,
        }
    }
}

/// A recurring habit tracked by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub owner_id: OwnerId,
    pub name: String,
    #[serde(flatten)]
    pub recurrence: Recurrence,
    /// First calendar day on which the habit can be due.
    pub start_date: NaiveDate,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Habit {
    /// Creates a habit with a generated id and the current creation time.
    ///
    /// The name is trimmed; call `validate()` before persisting.
    pub fn new(
        owner_id: OwnerId,
        name: impl Into<String>,
        recurrence: Recurrence,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into().trim().to_string(),
            recurrence,
            start_date,
            created_at: Utc::now().timestamp_millis(),
        }
    }

    /// Checks invariants that the type system does not already enforce.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if let Recurrence::Custom(days) = self.recurrence {
            if days.is_empty() {
                return Err(ValidationError::EmptyCustomDays);
            }
        }
        Ok(())
    }

    pub fn frequency(&self) -> Frequency {
        self.recurrence.frequency()
    }
}
