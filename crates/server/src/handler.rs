//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{
    ApisParams, CatalogParams, ListingParams, apis::apis_impl, status::status_impl,
    wallpaper::{catalog_impl, listing_impl, refresh_impl},
};

use banner_client::HttpPipeline;
use banner_core::AppConfig;
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
use tokio_util::sync::CancellationToken;

/// The main MCP server handler for banner.
#[derive(Clone)]
pub struct BannerServer {
    tool_router: ToolRouter<Self>,
    pipeline: Arc<HttpPipeline>,
    config: Arc<AppConfig>,
    shutdown: CancellationToken,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl BannerServer {
    /// Create a new server handler. In-flight runs are cancelled once `shutdown` fires.
    pub fn new(pipeline: Arc<HttpPipeline>, config: Arc<AppConfig>, shutdown: CancellationToken) -> Self {
        Self { tool_router: Self::tool_router(), pipeline, config, shutdown }
    }

    /// Random wallpaper from the remote directory listing.
    #[tool(
        description = "Pick a random wallpaper from the remote directory listing, download and decode it. Returns index, total, name, source URL and dimensions."
    )]
    async fn wallpaper_listing(&self, params: Parameters<ListingParams>) -> Result<CallToolResult, McpError> {
        listing_impl(self.pipeline.as_ref(), self.config.extended, params.0, &self.shutdown.child_token()).await
    }

    /// Unseen wallpaper from one named API.
    #[tool(
        description = "Draw a wallpaper from a named API (see wallpaper_apis), retrying until one not yet served this session is found."
    )]
    async fn wallpaper_catalog(&self, params: Parameters<CatalogParams>) -> Result<CallToolResult, McpError> {
        catalog_impl(self.pipeline.as_ref(), &self.config.api_list_url, params.0, &self.shutdown.child_token()).await
    }

    #[tool(description = "Forget cached listings and served URLs, then repeat the last acquisition.")]
    async fn wallpaper_refresh(&self) -> Result<CallToolResult, McpError> {
        refresh_impl(self.pipeline.as_ref(), &self.shutdown.child_token()).await
    }

    #[tool(description = "List the named wallpaper APIs available to wallpaper_catalog.")]
    async fn wallpaper_apis(&self, params: Parameters<ApisParams>) -> Result<CallToolResult, McpError> {
        apis_impl(self.pipeline.as_ref(), &self.config.api_list_url, params.0).await
    }

    #[tool(description = "Report the random backend, active mode, served-URL count and listing snapshot ages.")]
    async fn pipeline_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(self.pipeline.as_ref())
    }
}

impl ServerHandler for BannerServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "banner".into(),
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

    fn server() -> BannerServer {
        let config = AppConfig::default();
        let pipeline = HttpPipeline::from_config(&config).unwrap();
        BannerServer::new(Arc::new(pipeline), Arc::new(config), CancellationToken::new())
    }

    #[tokio::test]
    async fn test_registers_all_tools() {
        let server = server();
        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["pipeline_status", "wallpaper_apis", "wallpaper_catalog", "wallpaper_listing", "wallpaper_refresh"]
        );
    }

    #[tokio::test]
    async fn test_server_info() {
        let info = server().get_info();
        assert_eq!(info.server_info.name, "banner");
        assert!(info.capabilities.tools.is_some());
    }

    #[tokio::test]
    async fn test_status_without_network() {
        let server = server();
        let result = server.pipeline_status().await.unwrap();
        assert!(!result.content.is_empty());
    }
}
