//! delete_note tool implementation.

use notekeep_core::{IdentityGate, NoteId, NoteQueryService};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{MessageOutput, authenticate, log_failure, require_note, validate_note_id};
use crate::tools::json_result;

/// Parameters for the delete_note tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeleteNoteParams {
    /// Bearer credential, e.g. `Bearer <token>`.
    #[serde(default)]
    pub authorization: Option<String>,

    /// Id of the note to delete.
    pub note_id: NoteId,
}

/// Implementation of the delete_note tool.
pub async fn delete_impl(
    service: &NoteQueryService, gate: &IdentityGate, params: DeleteNoteParams,
) -> Result<CallToolResult, McpError> {
    let user_id = authenticate(gate, params.authorization.as_deref())?;
    validate_note_id(params.note_id)?;

    require_note(service, params.note_id, user_id).await?;
    service
        .delete_note(params.note_id, user_id)
        .await
        .inspect_err(|e| log_failure("delete_note", e))?;

    json_result(&MessageOutput::new("Note deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::notes::testing::{Fixture, assert_code, parse_output};

    #[tokio::test]
    async fn test_delete_impl_removes_note() {
        let fx = Fixture::new().await;
        let id = fx.seed(1, "Groceries", "personal", None).await;
        fx.seed(1, "Standup", "work", None).await;
        assert_eq!(fx.service.list_notes(1).await.unwrap().len(), 2);

        let result = delete_impl(&fx.service, &fx.gate, DeleteNoteParams { authorization: fx.bearer(1), note_id: id })
            .await
            .unwrap();
        let output: MessageOutput = parse_output(&result);
        assert_eq!(output.message, "Note deleted successfully");

        assert!(fx.service.get_note(id, 1).await.unwrap().is_none());
        assert_eq!(fx.service.list_notes(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_impl_other_users_note() {
        let fx = Fixture::new().await;
        let id = fx.seed(1, "Groceries", "personal", None).await;

        let err = delete_impl(&fx.service, &fx.gate, DeleteNoteParams { authorization: fx.bearer(2), note_id: id })
            .await
            .unwrap_err();
        assert_code(&err, -32001);
        assert!(fx.service.get_note(id, 1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_impl_cache_down_after_write() {
        let fx = Fixture::new().await;
        let id = fx.seed(1, "Groceries", "personal", None).await;
        fx.cache.set_available(false);

        let err = delete_impl(&fx.service, &fx.gate, DeleteNoteParams { authorization: fx.bearer(1), note_id: id })
            .await
            .unwrap_err();
        assert_code(&err, -32002);
        assert!(fx.service.get_note(id, 1).await.unwrap().is_none());
    }
}
