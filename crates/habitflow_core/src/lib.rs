//! Habit occurrence and completion tracking engine.
//!
//! This crate is the single source of truth for recurrence rules, the
//! one-completion-per-day ledger and rolling progress statistics.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;
pub mod stats;

pub use config::{ConfigError, CoreConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LogLevel,
    LoggingError,
};
pub use model::completion::{Completion, CompletionId, CompletionRecord};
pub use model::habit::{Frequency, Habit, HabitId, OwnerId, Recurrence, WeekdaySet};
pub use model::validation::ValidationError;
pub use repo::completion_repo::{CompletionRepository, SqliteCompletionRepository};
pub use repo::habit_repo::{HabitRepository, SqliteHabitRepository};
pub use repo::{RepoError, RepoResult};
pub use schedule::occurrence::{due_habits, is_due};
pub use service::habit_service::{
    CreateHabitRequest, DueHabitStatus, HabitService, MarkCompleteOutcome, TrackerError,
    TrackerResult,
};
pub use stats::rolling::{rolling_stats, window_start, StatsEntry};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
