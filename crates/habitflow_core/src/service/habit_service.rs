//! Habit tracking use-case service.
//!
//! # Responsibility
//! - Expose owner-scoped habit, completion and stats operations to
//!   request-handling callers.
//! - Combine repository reads with the pure occurrence and stats modules.
//!
//! # Invariants
//! - A habit not owned by the caller is reported exactly like a missing one.
//! - `mark_complete` is idempotent: repeated calls leave one record and
//!   return the same stored completion.
//! - No state is kept between calls; every operation reads fresh data.

use crate::model::completion::{Completion, CompletionRecord};
use crate::model::habit::{Frequency, Habit, HabitId, OwnerId, Recurrence};
use crate::model::validation::ValidationError;
use crate::repo::completion_repo::{CompletionRepository, SqliteCompletionRepository};
use crate::repo::habit_repo::{HabitRepository, SqliteHabitRepository};
use crate::repo::{RepoError, RepoResult};
use crate::schedule::occurrence::due_habits;
use crate::stats::rolling::{rolling_stats, window_start, StatsEntry};
use chrono::NaiveDate;
use log::{debug, info, warn};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_MAX_WINDOW_DAYS: u32 = 366;

/// Service error surfaced to callers.
#[derive(Debug)]
pub enum TrackerError {
    /// Missing or malformed input, with the offending field.
    Validation(ValidationError),
    /// Habit absent or owned by someone else.
    NotFound(HabitId),
    /// Storage failure; not retried here.
    Persistence(RepoError),
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid `{}`: {err}", err.field()),
            Self::NotFound(habit_id) => write!(f, "habit not found: {habit_id}"),
            Self::Persistence(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for TrackerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<RepoError> for TrackerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Persistence(other),
        }
    }
}

impl From<ValidationError> for TrackerError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Request model for creating a habit.
///
/// Fields are optional so absent input maps to a field-level validation
/// error instead of a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CreateHabitRequest {
    pub name: Option<String>,
    pub frequency: Option<Frequency>,
    /// Weekday indices, `0 = Sunday`. Ignored unless `frequency = custom`.
    pub custom_days: Option<Vec<u8>>,
    pub start_date: Option<NaiveDate>,
}

/// Result of `mark_complete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkCompleteOutcome {
    /// The single stored completion for this habit and day.
    pub completion: Completion,
    /// `true` when the record existed before this call.
    pub already_completed: bool,
}

/// A habit due on the requested day with its completion state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueHabitStatus {
    pub habit: Habit,
    pub completed: bool,
}

/// Habit tracking facade over habit and completion repositories.
pub struct HabitService<H: HabitRepository, C: CompletionRepository> {
    habits: H,
    completions: C,
    max_window_days: u32,
}

impl<'conn> HabitService<SqliteHabitRepository<'conn>, SqliteCompletionRepository<'conn>> {
    /// Builds a SQLite-backed service over a migrated connection.
    pub fn from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteHabitRepository::try_new(conn)?,
            SqliteCompletionRepository::try_new(conn)?,
        ))
    }
}

impl<H: HabitRepository, C: CompletionRepository> HabitService<H, C> {
    /// Creates a service using the provided repository implementations.
    pub fn new(habits: H, completions: C) -> Self {
        Self {
            habits,
            completions,
            max_window_days: DEFAULT_MAX_WINDOW_DAYS,
        }
    }

    /// Overrides the largest accepted stats window.
    pub fn with_max_window_days(mut self, max_window_days: u32) -> Self {
        self.max_window_days = max_window_days.max(1);
        self
    }

    /// Lists the owner's habits, newest first.
    pub fn list_habits(&self, owner_id: OwnerId) -> TrackerResult<Vec<Habit>> {
        Ok(self.habits.list_habits(owner_id)?)
    }

    /// Validates the request and stores a new habit.
    pub fn create_habit(
        &self,
        owner_id: OwnerId,
        request: &CreateHabitRequest,
    ) -> TrackerResult<Habit> {
        let name = request
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(ValidationError::MissingField("name"))?;
        let frequency = request
            .frequency
            .ok_or(ValidationError::MissingField("frequency"))?;
        let start_date = request
            .start_date
            .ok_or(ValidationError::MissingField("start_date"))?;
        let recurrence = Recurrence::from_parts(frequency, request.custom_days.as_deref())?;

        let habit = Habit::new(owner_id, name, recurrence, start_date);
        self.habits.create_habit(&habit)?;
        info!(
            "event=habit_create module=service status=ok habit_id={} frequency={:?} start_date={}",
            habit.id, frequency, habit.start_date
        );
        Ok(habit)
    }

    /// Deletes an owned habit together with its completions.
    pub fn delete_habit(&self, owner_id: OwnerId, habit_id: HabitId) -> TrackerResult<()> {
        self.habits.delete_habit(owner_id, habit_id)?;
        info!("event=habit_delete module=service status=ok habit_id={habit_id}");
        Ok(())
    }

    /// Records that an owned habit was performed on `date`.
    ///
    /// Insert-or-ignore against the storage uniqueness constraint; an
    /// existing record is success, never an error.
    ///
    /// # Errors
    /// - `NotFound` when the habit is missing or not owned by `owner_id`.
    /// - `Validation` when `date` precedes the habit start date.
    pub fn mark_complete(
        &self,
        owner_id: OwnerId,
        habit_id: HabitId,
        date: NaiveDate,
    ) -> TrackerResult<MarkCompleteOutcome> {
        let habit = self.require_owned(owner_id, habit_id)?;
        if date < habit.start_date {
            return Err(ValidationError::BeforeStartDate {
                start_date: habit.start_date,
                date,
            }
            .into());
        }

        let inserted = self
            .completions
            .insert_completion(&Completion::new(habit_id, date))?;
        // Habit deleted between insert and read-back.
        let completion = self
            .completions
            .get_completion(habit_id, date)?
            .ok_or(TrackerError::NotFound(habit_id))?;

        info!(
            "event=habit_complete module=service status=ok habit_id={} date={} already_completed={}",
            habit_id, date, !inserted
        );
        Ok(MarkCompleteOutcome {
            completion,
            already_completed: !inserted,
        })
    }

    /// Returns whether an owned habit has a completion on `date`.
    pub fn is_completed(
        &self,
        owner_id: OwnerId,
        habit_id: HabitId,
        date: NaiveDate,
    ) -> TrackerResult<bool> {
        self.require_owned(owner_id, habit_id)?;
        Ok(self.completions.is_completed(habit_id, date)?)
    }

    /// Lists the owner's completions in `[start, end]`, most recent first.
    pub fn list_completions(
        &self,
        owner_id: OwnerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> TrackerResult<Vec<CompletionRecord>> {
        if start > end {
            return Err(ValidationError::InvertedRange { start, end }.into());
        }
        Ok(self.completions.list_completions(owner_id, start, end)?)
    }

    /// Habits of the owner that are due on `date`, in list order.
    pub fn get_due_habits(&self, owner_id: OwnerId, date: NaiveDate) -> TrackerResult<Vec<Habit>> {
        let habits = self.habits.list_habits(owner_id)?;
        let due = due_habits(&habits, date);
        debug!(
            "event=due_habits module=service status=ok date={} total={} due={}",
            date,
            habits.len(),
            due.len()
        );
        Ok(due)
    }

    /// Due habits on `date`, each paired with its completion flag.
    pub fn today_overview(
        &self,
        owner_id: OwnerId,
        date: NaiveDate,
    ) -> TrackerResult<Vec<DueHabitStatus>> {
        let due = self.get_due_habits(owner_id, date)?;
        let completed: Vec<HabitId> = self
            .completions
            .list_completions(owner_id, date, date)?
            .into_iter()
            .map(|record| record.completion.habit_id)
            .collect();

        Ok(due
            .into_iter()
            .map(|habit| DueHabitStatus {
                completed: completed.contains(&habit.id),
                habit,
            })
            .collect())
    }

    /// Per-day progress over the `window_days` days ending at
    /// `reference_date`.
    pub fn get_rolling_stats(
        &self,
        owner_id: OwnerId,
        window_days: u32,
        reference_date: NaiveDate,
    ) -> TrackerResult<Vec<StatsEntry>> {
        let out_of_range = ValidationError::WindowOutOfRange {
            window_days,
            max: self.max_window_days,
        };
        if window_days > self.max_window_days {
            return Err(out_of_range.into());
        }
        let start = window_start(window_days, reference_date).ok_or(out_of_range)?;

        let habits = self.habits.list_habits(owner_id)?;
        let records = self
            .completions
            .list_completions(owner_id, start, reference_date)?;
        let entries = rolling_stats(
            window_days,
            &habits,
            records.iter().map(|record| &record.completion),
            reference_date,
        );

        if entries.len() != window_days as usize {
            warn!(
                "event=rolling_stats module=service status=truncated requested={} produced={}",
                window_days,
                entries.len()
            );
        }
        debug!(
            "event=rolling_stats module=service status=ok window_days={} reference_date={}",
            window_days, reference_date
        );
        Ok(entries)
    }

    fn require_owned(&self, owner_id: OwnerId, habit_id: HabitId) -> TrackerResult<Habit> {
        self.habits
            .get_owned_habit(owner_id, habit_id)?
            .ok_or(TrackerError::NotFound(habit_id))
    }
}
