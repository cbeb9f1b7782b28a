use chrono::NaiveDate;
use habitflow_core::db::{open_db, open_db_in_memory};
use habitflow_core::{
    Completion, CompletionRepository, CreateHabitRequest, Frequency, Habit, HabitService,
    OwnerId, SqliteCompletionRepository, TrackerError, ValidationError,
};
use rusqlite::Connection;
use std::sync::{Arc, Barrier};
use std::thread;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn create_daily(conn: &Connection, owner: OwnerId, name: &str) -> Habit {
    let service = HabitService::from_connection(conn).unwrap();
    service
        .create_habit(
            owner,
            &CreateHabitRequest {
                name: Some(name.to_string()),
                frequency: Some(Frequency::Daily),
                custom_days: None,
                start_date: Some(date(2024, 1, 1)),
            },
        )
        .unwrap()
}

fn completion_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM habit_completions;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn mark_complete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let habit = create_daily(&conn, owner, "Run");
    let service = HabitService::from_connection(&conn).unwrap();

    let first = service.mark_complete(owner, habit.id, date(2024, 1, 5)).unwrap();
    let second = service.mark_complete(owner, habit.id, date(2024, 1, 5)).unwrap();

    assert!(!first.already_completed);
    assert!(second.already_completed);
    assert_eq!(first.completion, second.completion);
    assert_eq!(first.completion.habit_id, habit.id);
    assert_eq!(first.completion.completion_date, date(2024, 1, 5));
    assert_eq!(completion_count(&conn), 1);
}

#[test]
fn mark_complete_for_foreign_or_missing_habit_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let habit = create_daily(&conn, owner, "Run");
    let service = HabitService::from_connection(&conn).unwrap();

    let intruder = Uuid::new_v4();
    let foreign = service
        .mark_complete(intruder, habit.id, date(2024, 1, 5))
        .unwrap_err();
    let missing_id = Uuid::new_v4();
    let missing = service
        .mark_complete(owner, missing_id, date(2024, 1, 5))
        .unwrap_err();

    assert!(matches!(foreign, TrackerError::NotFound(id) if id == habit.id));
    assert!(matches!(missing, TrackerError::NotFound(id) if id == missing_id));
    assert_eq!(
        foreign.to_string(),
        format!("habit not found: {}", habit.id)
    );
    assert_eq!(completion_count(&conn), 0);
}

#[test]
fn mark_complete_before_start_date_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let habit = create_daily(&conn, owner, "Run");
    let service = HabitService::from_connection(&conn).unwrap();

    let err = service
        .mark_complete(owner, habit.id, date(2023, 12, 31))
        .unwrap_err();
    assert!(matches!(
        err,
        TrackerError::Validation(ValidationError::BeforeStartDate { .. })
    ));
    assert_eq!(completion_count(&conn), 0);
}

#[test]
fn is_completed_answers_point_lookups() {
    let conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let habit = create_daily(&conn, owner, "Run");
    let service = HabitService::from_connection(&conn).unwrap();

    service.mark_complete(owner, habit.id, date(2024, 1, 5)).unwrap();

    assert!(service.is_completed(owner, habit.id, date(2024, 1, 5)).unwrap());
    assert!(!service.is_completed(owner, habit.id, date(2024, 1, 6)).unwrap());
    assert!(matches!(
        service.is_completed(Uuid::new_v4(), habit.id, date(2024, 1, 5)),
        Err(TrackerError::NotFound(_))
    ));
}

#[test]
fn list_completions_is_inclusive_owner_scoped_and_recent_first() {
    let conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let run = create_daily(&conn, owner, "Run");
    let read = create_daily(&conn, owner, "Read");
    let other_owner = Uuid::new_v4();
    let foreign = create_daily(&conn, other_owner, "Foreign");
    let service = HabitService::from_connection(&conn).unwrap();

    service.mark_complete(owner, run.id, date(2024, 1, 3)).unwrap();
    service.mark_complete(owner, read.id, date(2024, 1, 5)).unwrap();
    service.mark_complete(owner, run.id, date(2024, 1, 5)).unwrap();
    service.mark_complete(owner, run.id, date(2024, 1, 7)).unwrap();
    service.mark_complete(owner, run.id, date(2024, 1, 2)).unwrap();
    service
        .mark_complete(other_owner, foreign.id, date(2024, 1, 4))
        .unwrap();

    let records = service
        .list_completions(owner, date(2024, 1, 3), date(2024, 1, 5))
        .unwrap();
    let summary: Vec<_> = records
        .iter()
        .map(|r| (r.completion.completion_date, r.habit_name.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (date(2024, 1, 5), "Read"),
            (date(2024, 1, 5), "Run"),
            (date(2024, 1, 3), "Run"),
        ]
    );
}

#[test]
fn list_completions_rejects_inverted_range() {
    let conn = open_db_in_memory().unwrap();
    let service = HabitService::from_connection(&conn).unwrap();

    let err = service
        .list_completions(Uuid::new_v4(), date(2024, 1, 5), date(2024, 1, 1))
        .unwrap_err();
    assert!(matches!(
        err,
        TrackerError::Validation(ValidationError::InvertedRange { .. })
    ));
}

#[test]
fn repository_insert_reports_whether_row_was_stored() {
    let conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let habit = create_daily(&conn, owner, "Run");
    let repo = SqliteCompletionRepository::try_new(&conn).unwrap();

    let first = Completion::new(habit.id, date(2024, 1, 5));
    let retry = Completion::new(habit.id, date(2024, 1, 5));
    assert!(repo.insert_completion(&first).unwrap());
    assert!(!repo.insert_completion(&retry).unwrap());

    let stored = repo.get_completion(habit.id, date(2024, 1, 5)).unwrap().unwrap();
    assert_eq!(stored.id, first.id);
}

#[test]
fn today_overview_pairs_due_habits_with_completion_flags() {
    let conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let run = create_daily(&conn, owner, "Run");
    let read = create_daily(&conn, owner, "Read");
    let service = HabitService::from_connection(&conn).unwrap();

    service.mark_complete(owner, run.id, date(2024, 1, 5)).unwrap();

    let overview = service.today_overview(owner, date(2024, 1, 5)).unwrap();
    assert_eq!(overview.len(), 2);
    for item in overview {
        assert_eq!(item.completed, item.habit.id == run.id);
        assert!(item.habit.id == run.id || item.habit.id == read.id);
    }
}

#[test]
fn concurrent_mark_complete_converges_on_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.db");
    let owner = Uuid::new_v4();
    let habit = {
        let conn = open_db(&path).unwrap();
        create_daily(&conn, owner, "Run")
    };

    const WRITERS: usize = 4;
    let barrier = Arc::new(Barrier::new(WRITERS));
    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let service = HabitService::from_connection(&conn).unwrap();
                barrier.wait();
                service
                    .mark_complete(owner, habit.id, date(2024, 1, 5))
                    .unwrap()
            })
        })
        .collect();

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let fresh = outcomes.iter().filter(|o| !o.already_completed).count();
    assert_eq!(fresh, 1);
    assert!(outcomes
        .iter()
        .all(|o| o.completion == outcomes[0].completion));

    let conn = open_db(&path).unwrap();
    assert_eq!(completion_count(&conn), 1);
    let service = HabitService::from_connection(&conn).unwrap();
    let listed = service
        .list_completions(owner, date(2024, 1, 5), date(2024, 1, 5))
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].completion.habit_id, habit.id);
}
