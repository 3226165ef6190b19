//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use hotfix_client::{Hotfixes, LocalStrings};
use hotfix_core::CacheDb;

use crate::tools::cache::{CachePurgeParams, CacheStatusParams, purge_impl, status_impl};
use crate::tools::lookup::{HotfixLookupParams, lookup_impl};
use crate::tools::overrides::overrides_impl;
use crate::tools::style::{HotfixStyleParams, style_impl};

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

/// Shared state behind every tool call.
pub struct HotfixState {
    pub hotfixes: Hotfixes,
    pub strings: LocalStrings,
    pub db: CacheDb,
}

/// The main MCP server handler for hotfix resolution.
#[derive(Clone)]
pub struct HotfixServer {
    state: Arc<HotfixState>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl HotfixServer {
    /// Create a new server handler.
    pub fn new(state: Arc<HotfixState>) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    /// List features known to be broken in the running build.
    #[tool(description = "List features known to be broken in the running build and the options that disable them.")]
    async fn hotfix_overrides(&self) -> Result<CallToolResult, McpError> {
        overrides_impl(&self.state.hotfixes).await
    }

    /// Resolve the CSS patch for the running build.
    #[tool(
        description = "Resolve the CSS hotfix for the running version. If HTML is given, returns it with the patch prepended to the body."
    )]
    async fn hotfix_style(&self, params: Parameters<HotfixStyleParams>) -> Result<CallToolResult, McpError> {
        style_impl(&self.state.hotfixes, params.0).await
    }

    /// Map strings through the preloaded replacement table.
    #[tool(description = "Replace strings using the hotfix string table. Unknown strings are returned unchanged.")]
    async fn hotfix_lookup(&self, params: Parameters<HotfixLookupParams>) -> Result<CallToolResult, McpError> {
        lookup_impl(&self.state.strings, params.0)
    }

    /// Show cached hotfix entries.
    #[tool(description = "List cached hotfix entries with their age and freshness.")]
    async fn cache_status(&self, params: Parameters<CacheStatusParams>) -> Result<CallToolResult, McpError> {
        status_impl(&self.state.db, &self.state.hotfixes, params.0).await
    }

    /// Purge cached hotfix entries.
    #[tool(description = "Purge cached hotfix entries by namespace or age.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.state.db, params.0).await
    }
}

impl ServerHandler for HotfixServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "hotfix".into(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::state;

    #[tokio::test]
    async fn test_all_tools_registered() {
        let server = HotfixServer::new(state(&[]).await);
        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();

        assert_eq!(names, vec!["cache_purge", "cache_status", "hotfix_lookup", "hotfix_overrides", "hotfix_style"]);
    }

    #[tokio::test]
    async fn test_server_info() {
        let server = HotfixServer::new(state(&[]).await);
        assert_eq!(server.get_info().server_info.name, "hotfix");
    }
}
