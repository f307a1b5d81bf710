//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{ExportPageParams, cache::purge_impl, page_impl, stats_impl};

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
use vitis_core::{Db, ExportPages};

/// The main MCP server handler for vitis.
///
/// Holds the page pipeline and the database handle; both are built once in
/// `main` and shared by every request.
#[derive(Clone)]
pub struct VitisServer {
    tool_router: ToolRouter<Self>,
    pages: Arc<ExportPages>,
    db: Db,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl VitisServer {
    /// Create a new server handler.
    pub fn new(pages: Arc<ExportPages>, db: Db) -> Self {
        Self { tool_router: Self::tool_router(), pages, db }
    }

    /// Page through the Embrapa wine export dataset.
    ///
    /// Served from the page cache when fresh; otherwise the source is fetched,
    /// new records are persisted and the page is cached.
    #[tool(
        description = "Get a page of Embrapa VitiBrasil export records (country, quantity_kg, value_usd). \
                       Parameters: page (>= 1, default 1), size (>= 1, default 10)."
    )]
    async fn exportacao(&self, params: Parameters<ExportPageParams>) -> Result<CallToolResult, McpError> {
        page_impl(&self.pages, params.0).await
    }

    /// Delete expired page cache entries.
    #[tool(description = "Delete expired entries from the page cache. Returns the number of deleted entries.")]
    async fn cache_purge(&self) -> Result<CallToolResult, McpError> {
        purge_impl(&self.db).await
    }

    /// Report how many distinct export records the store holds.
    #[tool(description = "Count the distinct export records persisted so far.")]
    async fn store_stats(&self) -> Result<CallToolResult, McpError> {
        stats_impl(&self.db).await
    }
}

impl ServerHandler for VitisServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "vitis".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
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
