//! Field-level validation errors shared by model and service layers.

use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected input, always attributable to one named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field absent or blank.
    MissingField(&'static str),
    /// `frequency = custom` without any weekday.
    EmptyCustomDays,
    /// Weekday index outside `0..=6`.
    WeekdayOutOfRange(u8),
    /// Completion date earlier than the habit start date.
    BeforeStartDate { start_date: NaiveDate, date: NaiveDate },
    /// Range query whose start is after its end.
    InvertedRange { start: NaiveDate, end: NaiveDate },
    /// Stats window outside `1..=max`.
    WindowOutOfRange { window_days: u32, max: u32 },
}

impl ValidationError {
    /// Name of the offending request field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field) => field,
            Self::EmptyCustomDays | Self::WeekdayOutOfRange(_) => "custom_days",
            Self::BeforeStartDate { .. } => "date",
            Self::InvertedRange { .. } => "start_date",
            Self::WindowOutOfRange { .. } => "window_days",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "`{field}` is required"),
            Self::EmptyCustomDays => {
                write!(f, "custom frequency requires at least one weekday")
            }
            Self::WeekdayOutOfRange(day) => {
                write!(f, "weekday index {day} is out of range 0..=6")
            }
            Self::BeforeStartDate { start_date, date } => {
                write!(f, "date {date} is before habit start date {start_date}")
            }
            Self::InvertedRange { start, end } => {
                write!(f, "range start {start} is after range end {end}")
            }
            Self::WindowOutOfRange { window_days, max } => {
                write!(f, "window of {window_days} days is outside 1..={max}")
            }
        }
    }
}

impl Error for ValidationError {}
