//! Note MCP tools.
//!
//! Every tool resolves the caller through the identity gate before it
//! touches the note service. Empty lists and absent notes are reported as
//! `NOT_FOUND` errors.

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod search;
pub mod update;

pub use create::{CreateNoteParams, create_impl};
pub use delete::{DeleteNoteParams, delete_impl};
pub use get::{GetNoteParams, get_impl};
pub use list::{ListNotesParams, list_impl};
pub use search::{SearchNotesParams, search_impl};
pub use update::{UpdateNoteParams, update_impl};

use notekeep_core::{Error, IdentityGate, Note, NoteId, NoteQueryService, UserId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A list of notes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotesOutput {
    pub notes: Vec<Note>,
}

/// A single note.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NoteOutput {
    pub note: Note,
}

/// Outcome of a write that has no record to return.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MessageOutput {
    pub message: String,
}

impl MessageOutput {
    fn new(message: &str) -> Self {
        Self { message: message.to_string() }
    }
}

pub(crate) fn authenticate(gate: &IdentityGate, authorization: Option<&str>) -> Result<UserId, Error> {
    gate.authenticate_header(authorization)
        .inspect_err(|e| log_failure("authenticate", e))
}

/// Log a failed call at a level matching where the fault lies.
pub(crate) fn log_failure(tool: &'static str, err: &Error) {
    let kind = err.kind();
    if kind.is_server_fault() {
        tracing::error!(tool, ?kind, error = %err, "tool call failed");
    } else {
        tracing::debug!(tool, ?kind, error = %err, "tool call rejected");
    }
}

pub(crate) fn validate_note_id(note_id: NoteId) -> Result<(), Error> {
    if note_id <= 0 {
        return Err(Error::InvalidInput("ID must be a positive integer".into()));
    }
    Ok(())
}

/// Load a note owned by `user_id` or fail with `NOT_FOUND`.
pub(crate) async fn require_note(service: &NoteQueryService, note_id: NoteId, user_id: UserId) -> Result<Note, Error> {
    service
        .get_note(note_id, user_id)
        .await
        .inspect_err(|e| log_failure("get_note", e))?
        .ok_or_else(|| {
            tracing::info!(note_id, user_id, "note not found");
            Error::NotFound("Note not found".into())
        })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use notekeep_core::{IdentityGate, MemoryCache, NoteDraft, NoteQueryService, SqliteNoteStore, UserId};
    use rmcp::{ErrorData as McpError, model::CallToolResult};
    use serde::de::DeserializeOwned;

    pub const SECRET: &[u8] = b"tool-test-secret-0123456789";

    pub struct Fixture {
        pub service: NoteQueryService,
        pub gate: IdentityGate,
        pub cache: Arc<MemoryCache>,
    }

    impl Fixture {
        pub async fn new() -> Self {
            let store = SqliteNoteStore::open_in_memory().await.unwrap();
            let cache = Arc::new(MemoryCache::new());
            let service = NoteQueryService::new(Arc::new(store), cache.clone());
            Self { service, gate: IdentityGate::new(SECRET, 3600), cache }
        }

        pub fn bearer(&self, user_id: UserId) -> Option<String> {
            Some(format!("Bearer {}", self.gate.issue(user_id).unwrap()))
        }

        pub async fn seed(&self, user_id: UserId, title: &str, note_type: &str, content: Option<&str>) -> i64 {
            let draft = NoteDraft {
                user_id,
                title: title.to_string(),
                content: content.map(str::to_string),
                note_type: note_type.to_string(),
            };
            self.service.create_note(draft).await.unwrap().id
        }
    }

    pub fn parse_output<T: DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }

    pub fn assert_code(err: &McpError, code: i32) {
        assert_eq!(err.code.0, code, "unexpected error: {}", err.message);
    }
}
