//! Occurrence calculator.
//!
//! # Rules
//! - `Daily`: due on every date on or after `start_date`.
//! - `Weekly`: due every 7 days counted from `start_date` (same weekday as
//!   the start, not "once per calendar week").
//! - `Custom`: due when the weekday of the date is in the habit's set.
//!   Earlier dashboard code treated custom habits as due every day; the
//!   weekday check here deliberately replaces that behavior.

use crate::model::habit::{Habit, Recurrence};
use chrono::{Datelike, NaiveDate};

const DAYS_PER_WEEK: i64 = 7;

/// Returns whether `habit` is scheduled on `date`.
pub fn is_due(habit: &Habit, date: NaiveDate) -> bool {
    if date < habit.start_date {
        return false;
    }

    match habit.recurrence {
        Recurrence::Daily => true,
        Recurrence::Weekly => {
            let elapsed = date.signed_duration_since(habit.start_date).num_days();
            elapsed % DAYS_PER_WEEK == 0
        }
        Recurrence::Custom(days) => days.contains(date.weekday()),
    }
}

/// Filters `habits` to those due on `date`, preserving input order.
pub fn due_habits<'a, I>(habits: I, date: NaiveDate) -> Vec<Habit>
where
    I: IntoIterator<Item = &'a Habit>,
{
    habits
        .into_iter()
        .filter(|habit| is_due(habit, date))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{due_habits, is_due};
    use crate::model::habit::{Habit, Recurrence, WeekdaySet};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(recurrence: Recurrence, start: NaiveDate) -> Habit {
        Habit::new(Uuid::new_v4(), "h", recurrence, start)
    }

    #[test]
    fn start_date_itself_is_due_for_every_rule() {
        let start = date(2024, 1, 1);
        assert!(is_due(&habit(Recurrence::Daily, start), start));
        assert!(is_due(&habit(Recurrence::Weekly, start), start));
        let monday = WeekdaySet::from_indices(&[1]).unwrap();
        assert!(is_due(&habit(Recurrence::Custom(monday), start), start));
    }

    #[test]
    fn weekly_ignores_dates_off_the_cadence() {
        let weekly = habit(Recurrence::Weekly, date(2024, 1, 3));
        assert!(is_due(&weekly, date(2024, 1, 31)));
        assert!(!is_due(&weekly, date(2024, 1, 30)));
        assert!(!is_due(&weekly, date(2023, 12, 27)));
    }

    #[test]
    fn due_habits_keeps_input_order() {
        let start = date(2024, 1, 1);
        let a = habit(Recurrence::Daily, start);
        let b = habit(Recurrence::Weekly, start);
        let c = habit(Recurrence::Daily, start);
        let due = due_habits([&a, &b, &c], date(2024, 1, 2));
        let ids: Vec<_> = due.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }
}
