//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the engine's lifecycle and interception events.
use std::sync::Arc;

use crate::tools::cache::list::list_impl;
use crate::tools::intercept::{InterceptParams, intercept_impl};
use crate::tools::lifecycle::{activate_impl, install_impl};

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
use swcache_core::{CacheDb, Engine};

/// The main MCP server handler for swcache.
#[derive(Clone)]
pub struct SwcacheServer {
    engine: Arc<Engine>,
    cache: CacheDb,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl SwcacheServer {
    /// Create a new server handler around one engine generation.
    pub fn new(engine: Arc<Engine>, cache: CacheDb) -> Self {
        Self { engine, cache, tool_router: Self::tool_router() }
    }

    #[tool(description = "Install the configured generation: precache the manifest into its namespace.")]
    async fn install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.engine).await
    }

    /// Promote the installed generation.
    ///
    /// Deletes every namespace other than the current one and starts interception.
    #[tool(description = "Activate the installed generation: delete stale cache namespaces and start intercepting.")]
    async fn activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.engine).await
    }

    #[tool(
        description = "Dispatch one request to the engine. Returns the route, whether the engine declined, and the response supplied."
    )]
    async fn intercept(&self, params: Parameters<InterceptParams>) -> Result<CallToolResult, McpError> {
        intercept_impl(&self.engine, params.0).await
    }

    #[tool(
        description = "List cache namespaces with their ready flag and entry counts, plus the engine lifecycle state and pending background refreshes."
    )]
    async fn cache_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(&self.cache, &self.engine).await
    }
}

impl ServerHandler for SwcacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "swcache-mcp".into(),
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
