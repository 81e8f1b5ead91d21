//! Record store adapters.
//!
//! Pure persistence: no caching awareness lives here.

pub mod sqlite;

use async_trait::async_trait;

use crate::Error;
use crate::filter::NotePredicate;
use crate::note::{NewNote, Note, NoteChanges, NoteId, UserId};

pub use sqlite::SqliteNoteStore;

/// Predicate-based CRUD over the note collection.
///
/// Results are ordered by note id. Writes are scoped to the owning user, so
/// a note id belonging to someone else affects no rows.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All notes of `user_id`.
    async fn find_all(&self, user_id: UserId) -> Result<Vec<Note>, Error>;

    /// Notes of `user_id` satisfying every condition of `predicate`.
    async fn find_matching(&self, user_id: UserId, predicate: &NotePredicate) -> Result<Vec<Note>, Error>;

    async fn find_one(&self, note_id: NoteId, user_id: UserId) -> Result<Option<Note>, Error>;

    /// Insert a note.
    ///
    /// # Errors
    ///
    /// `DuplicateKey` when the user already has a note with this title and type.
    async fn create(&self, note: NewNote) -> Result<Note, Error>;

    /// Replace type, title and content. Returns the affected row count.
    async fn update(&self, note_id: NoteId, user_id: UserId, changes: &NoteChanges) -> Result<u64, Error>;

    /// Returns the affected row count.
    async fn delete(&self, note_id: NoteId, user_id: UserId) -> Result<u64, Error>;
}
