//! Completion records: one per habit per calendar day.
//!
//! # Invariants
//! - At most one completion exists per `(habit_id, completion_date)`.
//! - `completion_date` is never earlier than the habit start date.
//! - Completions are never updated after insertion.

use crate::model::habit::HabitId;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CompletionId = Uuid;

/// Record that a habit was performed on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub id: CompletionId,
    pub habit_id: HabitId,
    pub completion_date: NaiveDate,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Completion {
    /// Creates an unsaved completion with a generated id.
    pub fn new(habit_id: HabitId, completion_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            habit_id,
            completion_date,
            created_at: Utc::now().timestamp_millis(),
        }
    }
}

/// Completion joined with its habit name, for list views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    #[serde(flatten)]
    pub completion: Completion,
    pub habit_name: String,
}
