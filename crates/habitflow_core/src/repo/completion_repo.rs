//! Completion ledger persistence.
//!
//! # Responsibility
//! - Insert completions idempotently and answer point/range lookups.
//!
//! # Invariants
//! - `UNIQUE (habit_id, completion_date)` is the only uniqueness guard.
//!   Inserts use `ON CONFLICT DO NOTHING`, so racing writers converge on
//!   one row and neither sees an error.
//! - Range listings are ordered `completion_date DESC`, then insertion order.
//! - Range listings only include habits owned by the requested owner.

use crate::model::completion::{Completion, CompletionRecord};
use crate::model::habit::{HabitId, OwnerId};
use crate::repo::{date_to_db, ensure_tables, parse_date, parse_uuid, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const COMPLETION_SELECT_SQL: &str = "SELECT
    hc.id AS id,
    hc.habit_id AS habit_id,
    hc.completion_date AS completion_date,
    hc.created_at AS created_at
FROM habit_completions hc";

/// Repository interface for the completion ledger.
pub trait CompletionRepository {
    /// Inserts unless `(habit_id, completion_date)` already exists.
    ///
    /// Returns `true` when this call stored the row.
    fn insert_completion(&self, completion: &Completion) -> RepoResult<bool>;
    fn get_completion(&self, habit_id: HabitId, date: NaiveDate)
        -> RepoResult<Option<Completion>>;
    fn is_completed(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<bool>;
    /// Inclusive on both ends.
    fn list_completions(
        &self,
        owner_id: OwnerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<CompletionRecord>>;
}

/// SQLite-backed completion ledger.
pub struct SqliteCompletionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCompletionRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["habits", "habit_completions"])?;
        Ok(Self { conn })
    }
}

impl CompletionRepository for SqliteCompletionRepository<'_> {
    fn insert_completion(&self, completion: &Completion) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "INSERT INTO habit_completions (
                id,
                habit_id,
                completion_date,
                created_at
            ) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (habit_id, completion_date) DO NOTHING;",
            params![
                completion.id.to_string(),
                completion.habit_id.to_string(),
                date_to_db(completion.completion_date),
                completion.created_at,
            ],
        )?;

        Ok(changed == 1)
    }

    fn get_completion(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
    ) -> RepoResult<Option<Completion>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COMPLETION_SELECT_SQL}
             WHERE hc.habit_id = ?1
               AND hc.completion_date = ?2;"
        ))?;

        let mut rows = stmt.query(params![habit_id.to_string(), date_to_db(date)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_completion_row(row)?));
        }

        Ok(None)
    }

    fn is_completed(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM habit_completions
                WHERE habit_id = ?1
                  AND completion_date = ?2
            );",
            params![habit_id.to_string(), date_to_db(date)],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_completions(
        &self,
        owner_id: OwnerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<CompletionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                hc.id AS id,
                hc.habit_id AS habit_id,
                hc.completion_date AS completion_date,
                hc.created_at AS created_at,
                h.name AS habit_name
             FROM habit_completions hc
             INNER JOIN habits h ON h.id = hc.habit_id
             WHERE h.owner_id = ?1
               AND hc.completion_date BETWEEN ?2 AND ?3
             ORDER BY hc.completion_date DESC, hc.rowid ASC;",
        )?;

        let mut rows = stmt.query(params![
            owner_id.to_string(),
            date_to_db(start),
            date_to_db(end)
        ])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(CompletionRecord {
                completion: parse_completion_row(row)?,
                habit_name: row.get("habit_name")?,
            });
        }

        Ok(records)
    }
}

fn parse_completion_row(row: &Row<'_>) -> RepoResult<Completion> {
    let id_text: String = row.get("id")?;
    let habit_text: String = row.get("habit_id")?;
    let date_text: String = row.get("completion_date")?;

    Ok(Completion {
        id: parse_uuid(&id_text, "habit_completions.id")?,
        habit_id: parse_uuid(&habit_text, "habit_completions.habit_id")?,
        completion_date: parse_date(&date_text, "habit_completions.completion_date")?,
        created_at: row.get("created_at")?,
    })
}
