//! list_notes tool implementation.
//!
//! Returns every note of the caller, served through the per-user cache.

use notekeep_core::{Error, IdentityGate, NoteQueryService};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{NotesOutput, authenticate, log_failure};
use crate::tools::json_result;

/// Parameters for the list_notes tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListNotesParams {
    /// Bearer credential, e.g. `Bearer <token>`.
    #[serde(default)]
    pub authorization: Option<String>,
}

/// Implementation of the list_notes tool.
pub async fn list_impl(
    service: &NoteQueryService, gate: &IdentityGate, params: ListNotesParams,
) -> Result<CallToolResult, McpError> {
    let user_id = authenticate(gate, params.authorization.as_deref())?;

    let notes = service
        .list_notes(user_id)
        .await
        .inspect_err(|e| log_failure("list_notes", e))?;

    if notes.is_empty() {
        return Err(Error::NotFound("No notes found".into()).into());
    }

    json_result(&NotesOutput { notes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::notes::testing::{Fixture, assert_code, parse_output};

    #[tokio::test]
    async fn test_list_impl_requires_credential() {
        let fx = Fixture::new().await;
        let err = list_impl(&fx.service, &fx.gate, ListNotesParams { authorization: None })
            .await
            .unwrap_err();
        assert_code(&err, -32010);

        let err = list_impl(&fx.service, &fx.gate, ListNotesParams { authorization: Some("Bearer nope".into()) })
            .await
            .unwrap_err();
        assert_code(&err, -32011);
    }

    #[tokio::test]
    async fn test_list_impl_empty_is_not_found() {
        let fx = Fixture::new().await;
        let err = list_impl(&fx.service, &fx.gate, ListNotesParams { authorization: fx.bearer(1) })
            .await
            .unwrap_err();
        assert_code(&err, -32001);
        assert!(err.message.contains("No notes found"));
    }

    #[tokio::test]
    async fn test_list_impl_returns_only_callers_notes() {
        let fx = Fixture::new().await;
        fx.seed(1, "Groceries", "personal", Some("milk")).await;
        fx.seed(1, "Standup", "work", None).await;
        fx.seed(2, "Someone else", "work", None).await;

        let result = list_impl(&fx.service, &fx.gate, ListNotesParams { authorization: fx.bearer(1) })
            .await
            .unwrap();
        let output: NotesOutput = parse_output(&result);

        let titles: Vec<_> = output.notes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Groceries", "Standup"]);
        assert!(output.notes.iter().all(|n| n.user_id == 1));
    }

    #[tokio::test]
    async fn test_list_impl_cache_down() {
        let fx = Fixture::new().await;
        fx.seed(1, "Groceries", "personal", None).await;
        fx.cache.set_available(false);

        let err = list_impl(&fx.service, &fx.gate, ListNotesParams { authorization: fx.bearer(1) })
            .await
            .unwrap_err();
        assert_code(&err, -32002);
    }
}
