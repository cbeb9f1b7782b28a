use chrono::{Datelike, Duration, NaiveDate};
use habitflow_core::db::open_db_in_memory;
use habitflow_core::{
    due_habits, is_due, CreateHabitRequest, Frequency, Habit, HabitService, Recurrence,
    WeekdaySet,
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn habit(recurrence: Recurrence, start: NaiveDate) -> Habit {
    Habit::new(Uuid::new_v4(), "habit", recurrence, start)
}

#[test]
fn daily_habit_scenario() {
    let h1 = habit(Recurrence::Daily, date(2024, 1, 1));
    assert!(is_due(&h1, date(2024, 1, 5)));
    assert!(!is_due(&h1, date(2023, 12, 31)));
}

#[test]
fn weekly_habit_scenario() {
    let h2 = habit(Recurrence::Weekly, date(2024, 1, 1));
    assert!(is_due(&h2, date(2024, 1, 8)));
    assert!(!is_due(&h2, date(2024, 1, 5)));
}

#[test]
fn daily_is_due_exactly_from_start_date() {
    let start = date(2024, 2, 27);
    let h = habit(Recurrence::Daily, start);
    for offset in -30..60 {
        let day = start + Duration::days(offset);
        assert_eq!(is_due(&h, day), offset >= 0, "offset {offset}");
    }
}

#[test]
fn weekly_is_due_on_seven_day_cadence_only() {
    let start = date(2024, 2, 27);
    let h = habit(Recurrence::Weekly, start);
    for offset in -30i64..120 {
        let day = start + Duration::days(offset);
        let expected = offset >= 0 && offset % 7 == 0;
        assert_eq!(is_due(&h, day), expected, "offset {offset}");
    }
}

#[test]
fn custom_is_due_on_listed_weekdays_after_start() {
    // 0 = Sunday, 3 = Wednesday
    let days = WeekdaySet::from_indices(&[0, 3]).unwrap();
    let start = date(2024, 1, 10);
    let h = habit(Recurrence::Custom(days), start);

    assert!(!is_due(&h, date(2024, 1, 7)));
    assert!(is_due(&h, date(2024, 1, 10)));
    assert!(!is_due(&h, date(2024, 1, 11)));
    assert!(is_due(&h, date(2024, 1, 14)));
    assert!(is_due(&h, date(2024, 1, 17)));

    for offset in 0..28 {
        let day = start + Duration::days(offset);
        let weekday = day.weekday().num_days_from_sunday();
        assert_eq!(is_due(&h, day), weekday == 0 || weekday == 3);
    }
}

#[test]
fn due_habits_filters_and_preserves_order() {
    let start = date(2024, 1, 1);
    let weekly = habit(Recurrence::Weekly, start);
    let daily = habit(Recurrence::Daily, start);
    let future = habit(Recurrence::Daily, date(2024, 2, 1));
    let habits = vec![weekly.clone(), future, daily.clone()];

    let due: Vec<_> = due_habits(&habits, date(2024, 1, 8))
        .into_iter()
        .map(|h| h.id)
        .collect();
    assert_eq!(due, vec![weekly.id, daily.id]);

    let due: Vec<_> = due_habits(&habits, date(2024, 1, 9))
        .into_iter()
        .map(|h| h.id)
        .collect();
    assert_eq!(due, vec![daily.id]);
}

#[test]
fn service_get_due_habits_uses_owner_habits_only() {
    let conn = open_db_in_memory().unwrap();
    let service = HabitService::from_connection(&conn).unwrap();
    let owner = Uuid::new_v4();

    let request = |name: &str, frequency, custom_days| CreateHabitRequest {
        name: Some(name.to_string()),
        frequency: Some(frequency),
        custom_days,
        start_date: Some(date(2024, 1, 1)),
    };
    let weekly = service
        .create_habit(owner, &request("Weekly", Frequency::Weekly, None))
        .unwrap();
    let fridays = service
        .create_habit(owner, &request("Fridays", Frequency::Custom, Some(vec![5])))
        .unwrap();
    service
        .create_habit(Uuid::new_v4(), &request("Other", Frequency::Daily, None))
        .unwrap();

    // 2024-01-05 is a Friday, 2024-01-08 a Monday.
    let friday: Vec<_> = service
        .get_due_habits(owner, date(2024, 1, 5))
        .unwrap()
        .into_iter()
        .map(|h| h.id)
        .collect();
    assert_eq!(friday, vec![fridays.id]);

    let monday: Vec<_> = service
        .get_due_habits(owner, date(2024, 1, 8))
        .unwrap()
        .into_iter()
        .map(|h| h.id)
        .collect();
    assert_eq!(monday, vec![weekly.id]);
}
