//! Note query service.
//!
//! Reads of the full note list go through the cache (cache-aside); every
//! write deletes the user's cache entry after the store write so the next
//! list read rebuilds it. Filtered searches always hit the store and are
//! never cached.
//!
//! A concurrent list miss can still repopulate the cache with rows read
//! before a write landed. That window is bounded by the entry TTL.

mod factory;

pub use factory::NoteFactory;

use std::sync::Arc;

use crate::Error;
use crate::cache::{CacheStore, NOTES_CACHE_TTL_SECS, notes_cache_key};
use crate::filter::{SearchCriteria, compile};
use crate::note::{Note, NoteChanges, NoteDraft, NoteId, NoteUpdate, UserId};
use crate::store::NoteStore;

/// Orchestrates cache-aside reads and invalidate-on-write.
#[derive(Clone)]
pub struct NoteQueryService {
    store: Arc<dyn NoteStore>,
    cache: Arc<dyn CacheStore>,
    cache_ttl_secs: u64,
}

impl std::fmt::Debug for NoteQueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteQueryService")
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl NoteQueryService {
    pub fn new(store: Arc<dyn NoteStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self { store, cache, cache_ttl_secs: NOTES_CACHE_TTL_SECS }
    }

    pub fn with_cache_ttl(mut self, ttl_secs: u64) -> Self {
        self.cache_ttl_secs = ttl_secs;
        self
    }

    /// All notes of `user_id`, served from the cache when possible.
    ///
    /// Fails with `CacheUnavailable` when the cache connection is down rather
    /// than reading the store directly.
    pub async fn list_notes(&self, user_id: UserId) -> Result<Vec<Note>, Error> {
        tracing::debug!(user_id, "fetching notes");

        if !self.cache.is_available() {
            tracing::warn!(user_id, "cache client is not connected");
            return Err(Error::CacheUnavailable("cache client is not connected".into()));
        }

        let key = notes_cache_key(user_id);
        if let Some(cached) = self.cache.get(&key).await? {
            tracing::debug!(user_id, "notes cache hit");
            return serde_json::from_str(&cached).map_err(|e| {
                tracing::error!(user_id, error = %e, "undecodable notes cache entry");
                Error::CacheCorrupt(format!("{key}: {e}"))
            });
        }

        tracing::debug!(user_id, "notes cache miss");
        let notes = self
            .store
            .find_all(user_id)
            .await
            .map_err(|e| e.context("list_notes", format!("user {user_id}")))?;

        let snapshot = serde_json::to_string(&notes).map_err(|e| Error::CacheCorrupt(format!("{key}: {e}")))?;
        self.cache.set(&key, &snapshot, self.cache_ttl_secs).await?;

        Ok(notes)
    }

    /// Notes of `user_id` matching `criteria`.
    ///
    /// Empty criteria reuse [`Self::list_notes`] and its cache entry;
    /// anything else queries the store directly.
    pub async fn search_notes(&self, user_id: UserId, criteria: &SearchCriteria) -> Result<Vec<Note>, Error> {
        if criteria.is_empty() {
            return self.list_notes(user_id).await;
        }

        tracing::debug!(user_id, ?criteria, "searching notes");
        let predicate = compile(criteria);
        self.store
            .find_matching(user_id, &predicate)
            .await
            .map_err(|e| e.context("search_notes", format!("user {user_id}")))
    }

    /// A single note, read straight from the store.
    pub async fn get_note(&self, note_id: NoteId, user_id: UserId) -> Result<Option<Note>, Error> {
        tracing::debug!(note_id, user_id, "fetching note");
        self.store
            .find_one(note_id, user_id)
            .await
            .map_err(|e| e.context("get_note", format!("note {note_id} of user {user_id}")))
    }

    /// Create a note and drop the owner's cached list.
    pub async fn create_note(&self, draft: NoteDraft) -> Result<Note, Error> {
        let user_id = draft.user_id;
        tracing::info!(user_id, note_type = %draft.note_type, "creating note");

        let note = NoteFactory::create(self.store.as_ref(), draft)
            .await
            .map_err(|e| e.context("create_note", format!("user {user_id}")))?;

        self.invalidate(user_id).await?;
        Ok(note)
    }

    /// Replace a note's type, title and content.
    ///
    /// The note type is validated before the store is touched. Callers are
    /// expected to skip updates that change nothing.
    pub async fn update_note(&self, note_id: NoteId, user_id: UserId, update: NoteUpdate) -> Result<(), Error> {
        tracing::info!(note_id, user_id, "updating note");

        let changes =
            NoteChanges::try_from(update).inspect_err(|e| tracing::warn!(note_id, error = %e, "rejected update"))?;

        let affected = self
            .store
            .update(note_id, user_id, &changes)
            .await
            .map_err(|e| e.context("update_note", format!("note {note_id} of user {user_id}")))?;
        if affected == 0 {
            tracing::debug!(note_id, user_id, "update matched no rows");
        }

        self.invalidate(user_id).await
    }

    /// Delete a note and drop the owner's cached list.
    pub async fn delete_note(&self, note_id: NoteId, user_id: UserId) -> Result<(), Error> {
        tracing::info!(note_id, user_id, "deleting note");

        self.store
            .delete(note_id, user_id)
            .await
            .map_err(|e| e.context("delete_note", format!("note {note_id} of user {user_id}")))?;

        self.invalidate(user_id).await
    }

    async fn invalidate(&self, user_id: UserId) -> Result<(), Error> {
        self.cache
            .delete(&notes_cache_key(user_id))
            .await
            .inspect_err(|e| tracing::error!(user_id, error = %e, "failed to invalidate notes cache"))
    }
}
