//! SQLite note store.
//!
//! Predicates are rendered to a parameterized `WHERE` clause. Substring
//! conditions use `instr()` rather than `LIKE` because `LIKE` folds ASCII
//! case and title/content matching is case-sensitive.

use async_trait::async_trait;
use chrono::SubsecRound;
use std::path::Path;
use std::sync::Arc;
use tokio_rusqlite::rusqlite::{self, Row, types::Type, types::Value};
use tokio_rusqlite::{Connection, params};

use super::NoteStore;
use crate::Error;
use crate::clock::{Clock, SystemClock, from_db_timestamp, to_db_timestamp};
use crate::db;
use crate::filter::{Condition, NotePredicate};
use crate::note::{NewNote, Note, NoteChanges, NoteId, NoteType, UserId};

const NOTE_COLUMNS: &str = "id, user_id, title, content, note_type, created_at, updated_at";

/// Note store handle over a tokio-rusqlite connection.
#[derive(Clone)]
pub struct SqliteNoteStore {
    conn: Connection,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SqliteNoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteNoteStore").finish_non_exhaustive()
    }
}

impl SqliteNoteStore {
    /// Open a store at the specified path, creating and migrating it as needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Ok(Self { conn: db::open(path).await?, clock: Arc::new(SystemClock) })
    }

    /// Open an in-memory store for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        Ok(Self { conn: db::open_in_memory().await?, clock: Arc::new(SystemClock) })
    }

    /// Use `clock` for created/updated timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn select(&self, user_id: UserId, predicate: NotePredicate) -> Result<Vec<Note>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<Note>, Error> {
                let (clause, values) = where_clause(user_id, &predicate);
                let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE {clause} ORDER BY id ASC");
                let mut stmt = conn.prepare(&sql)?;
                let notes = stmt
                    .query_map(rusqlite::params_from_iter(values.iter()), note_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(notes)
            })
            .await
            .map_err(Error::from)
    }
}

/// Render `user_id = ?` plus one placeholder per condition.
fn where_clause(user_id: UserId, predicate: &NotePredicate) -> (String, Vec<Value>) {
    let mut clause = String::from("user_id = ?1");
    let mut values = vec![Value::Integer(user_id)];

    for condition in predicate.conditions() {
        let n = values.len() + 1;
        let (fragment, value) = match condition {
            Condition::TypeIs(t) => (format!("note_type = ?{n}"), Value::Text(t.as_str().to_string())),
            Condition::TitleContains(s) => (format!("instr(title, ?{n}) > 0"), Value::Text(s.clone())),
            Condition::ContentContains(s) => {
                (format!("content IS NOT NULL AND instr(content, ?{n}) > 0"), Value::Text(s.clone()))
            }
            Condition::UpdatedFrom(ts) => (format!("updated_at >= ?{n}"), Value::Text(to_db_timestamp(*ts))),
            Condition::UpdatedTo(ts) => (format!("updated_at <= ?{n}"), Value::Text(to_db_timestamp(*ts))),
        };
        clause.push_str(" AND ");
        clause.push_str(&fragment);
        values.push(value);
    }

    (clause, values)
}

fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    let note_type: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(Note {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        note_type: NoteType::parse(&note_type).map_err(|e| conversion_error(4, e.to_string()))?,
        created_at: from_db_timestamp(&created_at).map_err(|e| conversion_error(5, e.to_string()))?,
        updated_at: from_db_timestamp(&updated_at).map_err(|e| conversion_error(6, e.to_string()))?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn find_all(&self, user_id: UserId) -> Result<Vec<Note>, Error> {
        self.select(user_id, NotePredicate::default()).await
    }

    async fn find_matching(&self, user_id: UserId, predicate: &NotePredicate) -> Result<Vec<Note>, Error> {
        self.select(user_id, predicate.clone()).await
    }

    async fn find_one(&self, note_id: NoteId, user_id: UserId) -> Result<Option<Note>, Error> {
        self.conn
            .call(move |conn| -> Result<Option<Note>, Error> {
                let mut stmt =
                    conn.prepare(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1 AND user_id = ?2"))?;

                match stmt.query_row(params![note_id, user_id], note_from_row) {
                    Ok(note) => Ok(Some(note)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn create(&self, note: NewNote) -> Result<Note, Error> {
        let now = self.clock.now().trunc_subsecs(6);
        let stamp = to_db_timestamp(now);

        self.conn
            .call(move |conn| -> Result<Note, Error> {
                conn.execute(
                    "INSERT INTO notes (user_id, title, content, note_type, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                    params![note.user_id, &note.title, &note.content, note.note_type.as_str(), stamp],
                )
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        Error::DuplicateKey { note_type: note.note_type, title: note.title.clone() }
                    } else {
                        Error::from(e)
                    }
                })?;

                Ok(Note {
                    id: conn.last_insert_rowid(),
                    user_id: note.user_id,
                    title: note.title,
                    content: note.content,
                    note_type: note.note_type,
                    created_at: now,
                    updated_at: now,
                })
            })
            .await
            .map_err(Error::from)
    }

    async fn update(&self, note_id: NoteId, user_id: UserId, changes: &NoteChanges) -> Result<u64, Error> {
        let changes = changes.clone();
        let stamp = to_db_timestamp(self.clock.now().trunc_subsecs(6));

        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn
                    .execute(
                        "UPDATE notes SET title = ?1, content = ?2, note_type = ?3, updated_at = ?4
                        WHERE id = ?5 AND user_id = ?6",
                        params![&changes.title, &changes.content, changes.note_type.as_str(), stamp, note_id, user_id],
                    )
                    .map_err(|e| {
                        if is_unique_violation(&e) {
                            Error::DuplicateKey { note_type: changes.note_type, title: changes.title.clone() }
                        } else {
                            Error::from(e)
                        }
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, note_id: NoteId, user_id: UserId) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM notes WHERE id = ?1 AND user_id = ?2", params![note_id, user_id])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
