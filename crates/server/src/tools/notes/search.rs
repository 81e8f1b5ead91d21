//! search_notes tool implementation.
//!
//! Filters the caller's notes by type, title, content and update date.

use notekeep_core::{Error, IdentityGate, NoteQueryService, SearchCriteria};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{NotesOutput, authenticate, log_failure};
use crate::tools::json_result;

/// Parameters for the search_notes tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchNotesParams {
    /// Bearer credential, e.g. `Bearer <token>`.
    #[serde(default)]
    pub authorization: Option<String>,

    /// Filters; omitted fields impose no condition.
    #[serde(flatten)]
    pub criteria: SearchCriteria,
}

/// Implementation of the search_notes tool.
pub async fn search_impl(
    service: &NoteQueryService, gate: &IdentityGate, params: SearchNotesParams,
) -> Result<CallToolResult, McpError> {
    let user_id = authenticate(gate, params.authorization.as_deref())?;

    let notes = service
        .search_notes(user_id, &params.criteria)
        .await
        .inspect_err(|e| log_failure("search_notes", e))?;

    if notes.is_empty() {
        return Err(Error::NotFound("No notes found".into()).into());
    }

    json_result(&NotesOutput { notes })
}
