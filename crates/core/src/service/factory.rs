//! Note creation step: type validation followed by the store insert.

use crate::Error;
use crate::note::{NewNote, Note, NoteDraft};
use crate::store::NoteStore;

pub struct NoteFactory;

impl NoteFactory {
    /// Validate the draft's note type and insert it.
    ///
    /// Fails with `InvalidNoteType` before touching the store.
    pub async fn create(store: &dyn NoteStore, draft: NoteDraft) -> Result<Note, Error> {
        let user_id = draft.user_id;
        let note = NewNote::try_from(draft).inspect_err(|e| tracing::warn!(user_id, error = %e, "rejected note"))?;

        store.create(note).await.inspect_err(|e| {
            if let Error::DuplicateKey { .. } = e {
                tracing::info!(user_id, error = %e, "duplicate note");
            }
        })
    }
}
