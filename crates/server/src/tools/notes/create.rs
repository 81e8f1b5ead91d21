//! create_note tool implementation.
//!
//! Validates the title length here; the note type is validated by the
//! service before anything is written.

use notekeep_core::{IdentityGate, NoteDraft, NoteQueryService, note::validate_title};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{NoteOutput, authenticate, log_failure};
use crate::tools::json_result;

/// Parameters for the create_note tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateNoteParams {
    /// Bearer credential, e.g. `Bearer <token>`.
    #[serde(default)]
    pub authorization: Option<String>,

    /// One of `personal` or `work`.
    pub note_type: String,

    /// Note title, at most 100 characters.
    pub title: String,

    /// Optional body text.
    #[serde(default)]
    pub content: Option<String>,
}

/// Implementation of the create_note tool.
pub async fn create_impl(
    service: &NoteQueryService, gate: &IdentityGate, params: CreateNoteParams,
) -> Result<CallToolResult, McpError> {
    let user_id = authenticate(gate, params.authorization.as_deref())?;
    validate_title(&params.title)?;

    let draft = NoteDraft { user_id, title: params.title, content: params.content, note_type: params.note_type };
    let note = service
        .create_note(draft)
        .await
        .inspect_err(|e| log_failure("create_note", e))?;

    json_result(&NoteOutput { note })
}
