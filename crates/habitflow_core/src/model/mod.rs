//! Domain model for habits and their daily completions.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Encode recurrence invariants in types where possible.
//!
//! # Invariants
//! - Every habit and completion is identified by a stable UUID.
//! - Calendar dates are `NaiveDate` values; no time zone is attached.
//! - `Recurrence::Custom` always carries a non-empty weekday set.

pub mod completion;
pub mod habit;
pub mod validation;
