//! SQLite-based storage for chores and users.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::data_dir;
use super::migrations;
use crate::chore::Chore;
use crate::error::{CoreError, DatabaseError, Result};
use crate::interval::RecurrenceRule;
use crate::ports::{ChoreFilter, ChoreStore, UserStore};
use crate::user::User;

// === Helper Functions ===

/// Format a timestamp for storage. Fixed-width nanoseconds keep text order
/// equal to time order.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a stored RFC3339 timestamp
fn parse_datetime(table: &'static str, s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::CorruptRow {
            table,
            message: format!("bad timestamp '{s}': {e}"),
        })
}

/// Raw `chores` row before validation.
struct ChoreRow {
    id: String,
    name: String,
    quantity: i64,
    unit: String,
    location: Option<String>,
    expected_duration_secs: u32,
    priority: Option<i32>,
    next_due_at: String,
    created_at: String,
}

impl ChoreRow {
    fn from_row(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            quantity: row.get(2)?,
            unit: row.get(3)?,
            location: row.get(4)?,
            expected_duration_secs: row.get(5)?,
            priority: row.get(6)?,
            next_due_at: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn into_chore(self, completion_log: Vec<DateTime<Utc>>) -> Result<Chore, DatabaseError> {
        let recurrence =
            RecurrenceRule::parse(self.quantity, &self.unit).map_err(|e| DatabaseError::CorruptRow {
                table: "chores",
                message: format!("chore {}: {e}", self.id),
            })?;
        Ok(Chore {
            next_due_at: parse_datetime("chores", &self.next_due_at)?,
            created_at: parse_datetime("chores", &self.created_at)?,
            id: self.id,
            name: self.name,
            recurrence,
            location: self.location,
            expected_duration_secs: self.expected_duration_secs,
            priority: self.priority,
            completion_log,
        })
    }
}

const CHORE_COLUMNS: &str = "id, name, quantity, unit, location, expected_duration_secs, priority, next_due_at, created_at";

/// SQLite database for chore storage.
///
/// Stores chores, their completion logs, and users.
pub struct ChoreDb {
    conn: Connection,
}

impl ChoreDb {
    /// Open the database at `<data dir>/choreplanner.db`.
    ///
    /// Creates tables if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("choreplanner.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS chores (
                id                     TEXT PRIMARY KEY,
                name                   TEXT NOT NULL,
                quantity               INTEGER NOT NULL,
                unit                   TEXT NOT NULL,
                location               TEXT,
                expected_duration_secs INTEGER NOT NULL DEFAULT 0,
                priority               INTEGER,
                next_due_at            TEXT NOT NULL,
                created_at             TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chores_next_due ON chores(next_due_at);

            CREATE TABLE IF NOT EXISTS chore_completions (
                chore_id     TEXT NOT NULL,
                seq          INTEGER NOT NULL,
                completed_at TEXT NOT NULL,
                PRIMARY KEY (chore_id, seq)
            );

            CREATE TABLE IF NOT EXISTS users (
                id                    TEXT PRIMARY KEY,
                email                 TEXT NOT NULL,
                receive_notifications INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS user_chores (
                user_id  TEXT NOT NULL,
                position INTEGER NOT NULL,
                chore_id TEXT NOT NULL,
                PRIMARY KEY (user_id, position)
            );",
        )?;

        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    fn load_completions(&self, chore_id: &str) -> Result<Vec<DateTime<Utc>>> {
        let mut stmt = self.conn.prepare(
            "SELECT completed_at FROM chore_completions WHERE chore_id = ?1 ORDER BY seq",
        )?;
        let raw = stmt
            .query_map(params![chore_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        raw.iter()
            .map(|s| parse_datetime("chore_completions", s).map_err(CoreError::from))
            .collect()
    }

    fn load_user_chores(&self, user_id: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT chore_id FROM user_chores WHERE user_id = ?1 ORDER BY position")?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    fn user_from_row(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            receive_notifications: row.get(2)?,
            chores: Vec::new(),
        })
    }
}

impl ChoreStore for ChoreDb {
    fn find(&self, filter: &ChoreFilter) -> Result<Vec<Chore>> {
        let rows = match &filter.name {
            Some(name) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {CHORE_COLUMNS} FROM chores WHERE name = ?1 ORDER BY next_due_at, id"
                ))?;
                let rows = stmt
                    .query_map(params![name], ChoreRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {CHORE_COLUMNS} FROM chores ORDER BY next_due_at, id"
                ))?;
                let rows = stmt
                    .query_map([], ChoreRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        let mut chores = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(ids) = &filter.ids {
                if !ids.contains(&row.id) {
                    continue;
                }
            }
            let log = self.load_completions(&row.id)?;
            chores.push(row.into_chore(log)?);
        }
        Ok(chores)
    }

    fn find_by_id(&self, id: &str) -> Result<Chore> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {CHORE_COLUMNS} FROM chores WHERE id = ?1"),
                params![id],
                ChoreRow::from_row,
            )
            .optional()?
            .ok_or_else(|| CoreError::chore_not_found(id))?;
        let log = self.load_completions(id)?;
        Ok(row.into_chore(log)?)
    }

    fn save(&self, chore: &Chore) -> Result<Chore> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO chores (
                id, name, quantity, unit, location, expected_duration_secs,
                priority, next_due_at, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                quantity = excluded.quantity,
                unit = excluded.unit,
                location = excluded.location,
                expected_duration_secs = excluded.expected_duration_secs,
                priority = excluded.priority,
                next_due_at = excluded.next_due_at,
                created_at = excluded.created_at",
            params![
                chore.id,
                chore.name,
                chore.recurrence.quantity(),
                chore.recurrence.unit().as_str(),
                chore.location,
                chore.expected_duration_secs,
                chore.priority,
                format_datetime(&chore.next_due_at),
                format_datetime(&chore.created_at),
            ],
        )?;

        tx.execute(
            "DELETE FROM chore_completions WHERE chore_id = ?1",
            params![chore.id],
        )?;
        for (seq, completed_at) in chore.completion_log.iter().enumerate() {
            tx.execute(
                "INSERT INTO chore_completions (chore_id, seq, completed_at) VALUES (?1, ?2, ?3)",
                params![chore.id, seq as i64, format_datetime(completed_at)],
            )?;
        }

        tx.commit()?;
        Ok(chore.clone())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM chore_completions WHERE chore_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM chores WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(CoreError::chore_not_found(id));
        }
        tx.commit()?;
        Ok(())
    }
}

impl UserStore for ChoreDb {
    fn find_user(&self, id: &str) -> Result<User> {
        let mut user = self
            .conn
            .query_row(
                "SELECT id, email, receive_notifications FROM users WHERE id = ?1",
                params![id],
                Self::user_from_row,
            )
            .optional()?
            .ok_or_else(|| CoreError::user_not_found(id))?;
        user.chores = self.load_user_chores(id)?;
        Ok(user)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, email, receive_notifications FROM users ORDER BY rowid")?;
        let mut users = stmt
            .query_map([], Self::user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        for user in &mut users {
            user.chores = self.load_user_chores(&user.id)?;
        }
        Ok(users)
    }

    fn save_user(&self, user: &User) -> Result<User> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO users (id, email, receive_notifications) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                receive_notifications = excluded.receive_notifications",
            params![user.id, user.email, user.receive_notifications],
        )?;
        tx.execute("DELETE FROM user_chores WHERE user_id = ?1", params![user.id])?;
        for (position, chore_id) in user.chores.iter().enumerate() {
            tx.execute(
                "INSERT INTO user_chores (user_id, position, chore_id) VALUES (?1, ?2, ?3)",
                params![user.id, position as i64, chore_id],
            )?;
        }
        tx.commit()?;
        Ok(user.clone())
    }
}
