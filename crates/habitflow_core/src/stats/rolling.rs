//! Rolling-window completion statistics.
//!
//! # Invariants
//! - One entry per day, oldest first, ending at the reference date.
//! - `total_due` is evaluated for each day separately. The original
//!   dashboard reused the reference day's due count for the whole window;
//!   that shortcut is deliberately not reproduced.
//! - `completed_count` only counts completions of habits due that day, so
//!   `percentage` stays within `0..=100`.

use crate::model::completion::Completion;
use crate::model::habit::{Habit, HabitId};
use crate::schedule::occurrence::is_due;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Progress figures for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsEntry {
    pub date: NaiveDate,
    pub completed_count: u32,
    pub total_due: u32,
    /// Rounded half-up; `0` when nothing was due.
    pub percentage: u8,
}

/// First day of a window of `window_days` ending at `reference_date`.
///
/// Returns `None` for an empty window or when the start falls outside the
/// representable date range.
pub fn window_start(window_days: u32, reference_date: NaiveDate) -> Option<NaiveDate> {
    let span = window_days.checked_sub(1)?;
    reference_date.checked_sub_days(Days::new(u64::from(span)))
}

/// Computes per-day progress over the `window_days` days ending at
/// `reference_date` inclusive.
///
/// `completions` may contain records outside the window or for habits not
/// in `habits`; they are ignored.
///
/// Days before `NaiveDate::MIN` are skipped, so a window reaching past the
/// start of the calendar yields fewer than `window_days` entries. Check
/// `window_start` first when an exact count is required.
pub fn rolling_stats<'a, I>(
    window_days: u32,
    habits: &[Habit],
    completions: I,
    reference_date: NaiveDate,
) -> Vec<StatsEntry>
where
    I: IntoIterator<Item = &'a Completion>,
{
    let done: HashSet<(HabitId, NaiveDate)> = completions
        .into_iter()
        .map(|completion| (completion.habit_id, completion.completion_date))
        .collect();

    (0..window_days)
        .rev()
        .filter_map(|offset| reference_date.checked_sub_days(Days::new(u64::from(offset))))
        .map(|date| {
            let (total_due, completed_count) = habits
                .iter()
                .filter(|habit| is_due(habit, date))
                .fold((0u32, 0u32), |(due, completed), habit| {
                    let hit = u32::from(done.contains(&(habit.id, date)));
                    (due + 1, completed + hit)
                });

            StatsEntry {
                date,
                completed_count,
                total_due,
                percentage: percentage(completed_count, total_due),
            }
        })
        .collect()
}

fn percentage(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = u64::from(completed.min(total));
    let total = u64::from(total);
    let rounded = (completed * 100 + total / 2) / total;
    u8::try_from(rounded).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::{percentage, window_start};
    use chrono::NaiveDate;

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(4, 4), 100);
    }

    #[test]
    fn window_start_covers_reference_day() {
        let reference = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(window_start(1, reference), Some(reference));
        assert_eq!(
            window_start(7, reference),
            NaiveDate::from_ymd_opt(2024, 2, 24)
        );
        assert_eq!(window_start(0, reference), None);
    }
}
