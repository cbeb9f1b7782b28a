//! Progress statistics derived from habits and completion history.
//!
//! Everything here is a pure projection: recomputed on each call and never
//! cached or persisted.

pub mod rolling;
