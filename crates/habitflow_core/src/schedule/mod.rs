//! Recurrence evaluation: which habits are due on which calendar days.
//!
//! # Invariants
//! - Evaluation is pure and deterministic; no storage access.
//! - Nothing is due before its habit start date.

pub mod occurrence;
