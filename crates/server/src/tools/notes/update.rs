//! update_note tool implementation.
//!
//! Replaces type, title and content of an existing note. An update that
//! would change nothing is answered without a write.

use notekeep_core::{IdentityGate, NoteId, NoteQueryService, NoteUpdate, note::validate_title};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{MessageOutput, authenticate, log_failure, require_note, validate_note_id};
use crate::tools::json_result;

/// Parameters for the update_note tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateNoteParams {
    /// Bearer credential, e.g. `Bearer <token>`.
    #[serde(default)]
    pub authorization: Option<String>,

    /// Id of the note to update.
    pub note_id: NoteId,

    /// One of `personal` or `work`.
    pub note_type: String,

    /// New title, at most 100 characters.
    pub title: String,

    /// New body text; omitted or null clears it.
    #[serde(default)]
    pub content: Option<String>,
}

/// Implementation of the update_note tool.
pub async fn update_impl(
    service: &NoteQueryService, gate: &IdentityGate, params: UpdateNoteParams,
) -> Result<CallToolResult, McpError> {
    let user_id = authenticate(gate, params.authorization.as_deref())?;
    validate_note_id(params.note_id)?;
    validate_title(&params.title)?;

    let existing = require_note(service, params.note_id, user_id).await?;

    let update = NoteUpdate { title: params.title, content: params.content, note_type: params.note_type };
    if existing.is_unchanged_by(&update) {
        tracing::debug!(note_id = params.note_id, user_id, "update changes nothing");
        return json_result(&MessageOutput::new("No changes detected"));
    }

    service
        .update_note(params.note_id, user_id, update)
        .await
        .inspect_err(|e| log_failure("update_note", e))?;
    json_result(&MessageOutput::new("Note updated successfully"))
}
