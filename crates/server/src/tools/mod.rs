//! MCP tool implementations.
//!
//! This module contains all tools exposed by the banner server.

pub mod apis;
pub mod status;
pub mod wallpaper;

pub use apis::{ApisOutput, ApisParams};
pub use status::StatusOutput;
pub use wallpaper::{CatalogParams, ListingParams, WallpaperOutput};

use banner_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

/// Wrap a tool output as pretty JSON text content.
fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
