//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::notes::{
    CreateNoteParams, DeleteNoteParams, GetNoteParams, ListNotesParams, SearchNotesParams, UpdateNoteParams,
    create_impl, delete_impl, get_impl, list_impl, search_impl, update_impl,
};

use notekeep_core::{IdentityGate, NoteQueryService};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for notekeep.
#[derive(Clone)]
pub struct NotekeepServer {
    service: NoteQueryService,
    gate: IdentityGate,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl NotekeepServer {
    /// Create a new server handler.
    pub fn new(service: NoteQueryService, gate: IdentityGate) -> Self {
        Self { service, gate, tool_router: Self::tool_router() }
    }

    #[tool(description = "List all notes of the authenticated user.")]
    async fn list_notes(&self, params: Parameters<ListNotesParams>) -> Result<CallToolResult, McpError> {
        list_impl(&self.service, &self.gate, params.0).await
    }

    /// Search the caller's notes.
    ///
    /// All supplied criteria must hold. Title and content match as case-sensitive substrings;
    /// date bounds apply to the last update time and are inclusive.
    #[tool(
        description = "Search the authenticated user's notes by type, title substring, content substring and \
                       last-update date range. All supplied criteria must match."
    )]
    async fn search_notes(&self, params: Parameters<SearchNotesParams>) -> Result<CallToolResult, McpError> {
        search_impl(&self.service, &self.gate, params.0).await
    }

    #[tool(description = "Fetch a single note of the authenticated user by id.")]
    async fn get_note(&self, params: Parameters<GetNoteParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.service, &self.gate, params.0).await
    }

    #[tool(description = "Create a note. Title is at most 100 characters; note_type is 'personal' or 'work'.")]
    async fn create_note(&self, params: Parameters<CreateNoteParams>) -> Result<CallToolResult, McpError> {
        create_impl(&self.service, &self.gate, params.0).await
    }

    #[tool(description = "Replace the type, title and content of an existing note.")]
    async fn update_note(&self, params: Parameters<UpdateNoteParams>) -> Result<CallToolResult, McpError> {
        update_impl(&self.service, &self.gate, params.0).await
    }

    #[tool(description = "Delete a note of the authenticated user.")]
    async fn delete_note(&self, params: Parameters<DeleteNoteParams>) -> Result<CallToolResult, McpError> {
        delete_impl(&self.service, &self.gate, params.0).await
    }
}

impl ServerHandler for NotekeepServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "notekeep".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Per-user note store. Every tool takes an `authorization` value of the form 'Bearer <token>'.".into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
