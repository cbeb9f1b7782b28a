//! Habit repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped create/get/list/delete APIs over `habits`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every read is filtered by `owner_id`; a foreign habit is
//!   indistinguishable from a missing one.
//! - Deleting a habit removes its completions through `ON DELETE CASCADE`.
//! - Lists are ordered `created_at DESC`, newest insert first on ties.

use crate::model::habit::{Frequency, Habit, HabitId, OwnerId, Recurrence};
use crate::repo::{
    date_to_db, ensure_foreign_keys, ensure_tables, parse_date, parse_uuid, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, Row};

const HABIT_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    name,
    frequency,
    custom_days,
    start_date,
    created_at
FROM habits";

/// Repository interface for habit persistence.
pub trait HabitRepository {
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId>;
    /// Returns the habit only when it exists and belongs to `owner_id`.
    fn get_owned_habit(&self, owner_id: OwnerId, id: HabitId) -> RepoResult<Option<Habit>>;
    fn list_habits(&self, owner_id: OwnerId) -> RepoResult<Vec<Habit>>;
    /// Deletes an owned habit and, by cascade, its completions.
    fn delete_habit(&self, owner_id: OwnerId, id: HabitId) -> RepoResult<()>;
}

/// SQLite-backed habit repository.
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    /// Constructs a repository from a migrated connection with foreign keys on.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["habits"])?;
        ensure_foreign_keys(conn)?;
        Ok(Self { conn })
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId> {
        habit.validate()?;

        self.conn.execute(
            "INSERT INTO habits (
                id,
                owner_id,
                name,
                frequency,
                custom_days,
                start_date,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                habit.id.to_string(),
                habit.owner_id.to_string(),
                habit.name.as_str(),
                frequency_to_db(habit.frequency()),
                custom_days_to_db(&habit.recurrence)?,
                date_to_db(habit.start_date),
                habit.created_at,
            ],
        )?;

        Ok(habit.id)
    }

    fn get_owned_habit(&self, owner_id: OwnerId, id: HabitId) -> RepoResult<Option<Habit>> {
        let mut stmt = self.conn.prepare(&format!(
            "{HABIT_SELECT_SQL}
             WHERE id = ?1
               AND owner_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), owner_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_habit_row(row)?));
        }

        Ok(None)
    }

    fn list_habits(&self, owner_id: OwnerId) -> RepoResult<Vec<Habit>> {
        let mut stmt = self.conn.prepare(&format!(
            "{HABIT_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY created_at DESC, rowid DESC;"
        ))?;

        let mut rows = stmt.query([owner_id.to_string()])?;
        let mut habits = Vec::new();
        while let Some(row) = rows.next()? {
            habits.push(parse_habit_row(row)?);
        }

        Ok(habits)
    }

    fn delete_habit(&self, owner_id: OwnerId, id: HabitId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM habits
             WHERE id = ?1
               AND owner_id = ?2;",
            params![id.to_string(), owner_id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_habit_row(row: &Row<'_>) -> RepoResult<Habit> {
    let id_text: String = row.get("id")?;
    let owner_text: String = row.get("owner_id")?;

    let frequency_text: String = row.get("frequency")?;
    let frequency = parse_frequency(&frequency_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid frequency `{frequency_text}` in habits.frequency"
        ))
    })?;

    let custom_days = match row.get::<_, Option<String>>("custom_days")? {
        Some(value) => Some(serde_json::from_str::<Vec<u8>>(&value).map_err(|err| {
            RepoError::InvalidData(format!(
                "invalid custom_days `{value}` in habits.custom_days: {err}"
            ))
        })?),
        None => None,
    };
    let recurrence = Recurrence::from_parts(frequency, custom_days.as_deref())
        .map_err(|err| RepoError::InvalidData(format!("habits row: {err}")))?;

    let start_text: String = row.get("start_date")?;

    let habit = Habit {
        id: parse_uuid(&id_text, "habits.id")?,
        owner_id: parse_uuid(&owner_text, "habits.owner_id")?,
        name: row.get("name")?,
        recurrence,
        start_date: parse_date(&start_text, "habits.start_date")?,
        created_at: row.get("created_at")?,
    };
    habit
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("habits row: {err}")))?;
    Ok(habit)
}

fn frequency_to_db(frequency: Frequency) -> &'static str {
    match frequency {
        Frequency::Daily => "daily",
        Frequency::Weekly => "weekly",
        Frequency::Custom => "custom",
    }
}

fn parse_frequency(value: &str) -> Option<Frequency> {
    match value {
        "daily" => Some(Frequency::Daily),
        "weekly" => Some(Frequency::Weekly),
        "custom" => Some(Frequency::Custom),
        _ => None,
    }
}

fn custom_days_to_db(recurrence: &Recurrence) -> RepoResult<Option<String>> {
    recurrence
        .custom_days()
        .map(|days| {
            serde_json::to_string(&days.indices())
                .map_err(|err| RepoError::InvalidData(format!("unencodable custom_days: {err}")))
        })
        .transpose()
}
