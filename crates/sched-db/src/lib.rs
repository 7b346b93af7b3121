//! Storage layer for the timetable planner.
//!
//! Persists parsed sessions (one batch per administrative class) and the
//! user's ordered selection of option keys using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! Sessions are stored in the portal's text formats: dates as `dd-mm-yyyy`
//! and clock times as `HHMMSS`. A date that failed to decode is stored as its
//! raw text and read back as [`SessionDate::Unparsed`].
//!
//! Re-importing a class replaces all of its sessions in one transaction, so
//! option keys are rebuilt from a consistent snapshot. Selected keys are kept
//! separately; a key that no longer matches any option is stale and should be
//! dropped with [`Database::retain_selection`].

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

use sched_core::OptionKey;
use sched_core::session::{Session, SessionDate, clock};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored row could not be decoded.
    #[error("invalid {context} row: {message}")]
    InvalidRow {
        context: &'static str,
        message: String,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A class with stored sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    pub name: String,
    pub imported_at: String,
    pub session_count: usize,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS classes (
                name TEXT PRIMARY KEY,
                imported_at TEXT NOT NULL
            );

            -- One row per parsed session, in source order within a class.
            -- date: 'dd-mm-yyyy' or the raw text when it did not decode
            -- start_time/end_time: 'HHMMSS'
            CREATE TABLE IF NOT EXISTS sessions (
                class_name TEXT NOT NULL,
                ordinal INTEGER NOT NULL,
                course_code TEXT NOT NULL,
                subject_name TEXT NOT NULL,
                subject_type TEXT NOT NULL,
                grp INTEGER NOT NULL DEFAULT 0,
                lesson_period TEXT NOT NULL,
                lecturer_name TEXT NOT NULL,
                room TEXT NOT NULL,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                PRIMARY KEY (class_name, ordinal),
                FOREIGN KEY (class_name) REFERENCES classes(name) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_subject ON sessions(subject_name);

            -- Selected options; id preserves the order they were chosen in.
            CREATE TABLE IF NOT EXISTS selection (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_code TEXT NOT NULL,
                subject_name TEXT NOT NULL,
                class_name TEXT NOT NULL,
                grp INTEGER NOT NULL,
                UNIQUE (course_code, subject_name, class_name, grp)
            );
            ",
        )?;
        Ok(())
    }

    /// Replaces every stored session of `class_name`.
    ///
    /// Returns the number of sessions written.
    pub fn replace_class_sessions(
        &mut self,
        class_name: &str,
        sessions: &[Session],
    ) -> Result<usize, DbError> {
        let imported_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM sessions WHERE class_name = ?", [class_name])?;
        tx.execute(
            "
            INSERT INTO classes (name, imported_at) VALUES (?, ?)
            ON CONFLICT(name) DO UPDATE SET imported_at = excluded.imported_at
            ",
            params![class_name, imported_at],
        )?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO sessions
                (class_name, ordinal, course_code, subject_name, subject_type, grp,
                 lesson_period, lecturer_name, room, date, start_time, end_time)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )?;
            for (ordinal, session) in sessions.iter().enumerate() {
                if session.class_name != class_name {
                    tracing::warn!(
                        expected = class_name,
                        found = %session.class_name,
                        "storing session under a different class than it names"
                    );
                }
                inserted += stmt.execute(params![
                    class_name,
                    i64::try_from(ordinal).unwrap_or(i64::MAX),
                    session.course_code,
                    session.subject_name,
                    session.subject_type.as_str(),
                    session.group,
                    session.lesson_period,
                    session.lecturer_name,
                    session.room,
                    session.date.to_string(),
                    session.start.format(clock::FORMAT).to_string(),
                    session.end.format(clock::FORMAT).to_string(),
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(class = class_name, sessions = inserted, "replaced class sessions");
        Ok(inserted)
    }

    /// Lists all stored sessions ordered by class then source order.
    ///
    /// Each session carries the class it was stored under.
    pub fn list_sessions(&self) -> Result<Vec<Session>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT class_name, course_code, subject_name, subject_type, grp,
                   lesson_period, lecturer_name, room, date, start_time, end_time
            FROM sessions
            ORDER BY class_name ASC, ordinal ASC
            ",
        )?;
        let rows = stmt.query_map([], raw_session)?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?.decode()?);
        }
        Ok(sessions)
    }

    /// Lists stored classes with their session counts.
    pub fn list_classes(&self) -> Result<Vec<ClassRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT c.name, c.imported_at, COUNT(s.ordinal)
            FROM classes c
            LEFT JOIN sessions s ON s.class_name = c.name
            GROUP BY c.name
            ORDER BY c.name ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            let count: i64 = row.get(2)?;
            Ok(ClassRecord {
                name: row.get(0)?,
                imported_at: row.get(1)?,
                session_count: usize::try_from(count).unwrap_or_default(),
            })
        })?;
        let mut classes = Vec::new();
        for row in rows {
            classes.push(row?);
        }
        Ok(classes)
    }

    /// Returns the total number of stored sessions.
    pub fn session_count(&self) -> Result<usize, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Loads the selected option keys in the order they were chosen.
    pub fn load_selection(&self) -> Result<Vec<OptionKey>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT course_code, subject_name, class_name, grp
            FROM selection
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(OptionKey {
                course_code: row.get(0)?,
                subject_name: row.get(1)?,
                class_name: row.get(2)?,
                group: row.get(3)?,
            })
        })?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }

    /// Appends a key to the selection.
    ///
    /// Returns false if the key was already selected.
    pub fn add_selection(&mut self, key: &OptionKey) -> Result<bool, DbError> {
        let inserted = self.conn.execute(
            "
            INSERT OR IGNORE INTO selection (course_code, subject_name, class_name, grp)
            VALUES (?, ?, ?, ?)
            ",
            params![key.course_code, key.subject_name, key.class_name, key.group],
        )?;
        Ok(inserted > 0)
    }

    /// Removes a key from the selection.
    ///
    /// Returns false if the key was not selected.
    pub fn remove_selection(&mut self, key: &OptionKey) -> Result<bool, DbError> {
        let removed = self.conn.execute(
            "
            DELETE FROM selection
            WHERE course_code = ? AND subject_name = ? AND class_name = ? AND grp = ?
            ",
            params![key.course_code, key.subject_name, key.class_name, key.group],
        )?;
        Ok(removed > 0)
    }

    /// Returns true if the key is currently selected.
    pub fn is_selected(&self, key: &OptionKey) -> Result<bool, DbError> {
        let found = self
            .conn
            .query_row(
                "
                SELECT 1 FROM selection
                WHERE course_code = ? AND subject_name = ? AND class_name = ? AND grp = ?
                ",
                params![key.course_code, key.subject_name, key.class_name, key.group],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Drops every selected key that is not in `valid`.
    ///
    /// Returns the keys that were removed, in selection order.
    pub fn retain_selection(&mut self, valid: &[OptionKey]) -> Result<Vec<OptionKey>, DbError> {
        let stale: Vec<OptionKey> = self
            .load_selection()?
            .into_iter()
            .filter(|key| !valid.contains(key))
            .collect();
        if stale.is_empty() {
            return Ok(stale);
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "
                DELETE FROM selection
                WHERE course_code = ? AND subject_name = ? AND class_name = ? AND grp = ?
                ",
            )?;
            for key in &stale {
                stmt.execute(params![
                    key.course_code,
                    key.subject_name,
                    key.class_name,
                    key.group
                ])?;
            }
        }
        tx.commit()?;
        tracing::info!(dropped = stale.len(), "dropped stale selections");
        Ok(stale)
    }

    /// Clears the selection, returning how many keys were removed.
    pub fn clear_selection(&mut self) -> Result<usize, DbError> {
        Ok(self.conn.execute("DELETE FROM selection", [])?)
    }
}

/// Session columns as stored, before decoding.
struct RawSession {
    class_name: String,
    course_code: String,
    subject_name: String,
    subject_type: String,
    group: u32,
    lesson_period: String,
    lecturer_name: String,
    room: String,
    date: String,
    start: String,
    end: String,
}

fn raw_session(row: &Row<'_>) -> rusqlite::Result<RawSession> {
    Ok(RawSession {
        class_name: row.get(0)?,
        course_code: row.get(1)?,
        subject_name: row.get(2)?,
        subject_type: row.get(3)?,
        group: row.get(4)?,
        lesson_period: row.get(5)?,
        lecturer_name: row.get(6)?,
        room: row.get(7)?,
        date: row.get(8)?,
        start: row.get(9)?,
        end: row.get(10)?,
    })
}

impl RawSession {
    fn decode(self) -> Result<Session, DbError> {
        let invalid = |message: String| DbError::InvalidRow {
            context: "session",
            message,
        };
        let subject_type = self
            .subject_type
            .parse()
            .map_err(|e| invalid(format!("{e}")))?;
        let start = clock::parse(&self.start)
            .ok_or_else(|| invalid(format!("invalid start time: {}", self.start)))?;
        let end = clock::parse(&self.end)
            .ok_or_else(|| invalid(format!("invalid end time: {}", self.end)))?;
        Ok(Session {
            course_code: self.course_code,
            subject_name: self.subject_name,
            subject_type,
            group: self.group,
            lesson_period: self.lesson_period,
            lecturer_name: self.lecturer_name,
            room: self.room,
            class_name: self.class_name,
            date: SessionDate::parse(&self.date),
            start,
            end,
        })
    }
}
