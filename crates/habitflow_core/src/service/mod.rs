//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into owner-scoped use-case APIs.
//! - Keep request-handling callers decoupled from storage details.

pub mod habit_service;
