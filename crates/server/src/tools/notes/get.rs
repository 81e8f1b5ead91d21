//! get_note tool implementation.

use notekeep_core::{IdentityGate, NoteId, NoteQueryService};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{NoteOutput, authenticate, require_note, validate_note_id};
use crate::tools::json_result;

/// Parameters for the get_note tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetNoteParams {
    /// Bearer credential, e.g. `Bearer <token>`.
    #[serde(default)]
    pub authorization: Option<String>,

    /// Id of the note, a positive integer.
    pub note_id: NoteId,
}

/// Implementation of the get_note tool.
pub async fn get_impl(
    service: &NoteQueryService, gate: &IdentityGate, params: GetNoteParams,
) -> Result<CallToolResult, McpError> {
    let user_id = authenticate(gate, params.authorization.as_deref())?;
    validate_note_id(params.note_id)?;

    let note = require_note(service, params.note_id, user_id).await?;
    json_result(&NoteOutput { note })
}
