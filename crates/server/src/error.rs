//! Mapping of pipeline failures onto JSON-RPC errors.
//!
//! The code comes from the underlying error kind; the stage that broke is
//! carried in the message and in `data.stage`.

use banner_client::Failure;
use rmcp::model::ErrorData as McpError;
use serde_json::json;

/// Convert a failed run into an MCP error.
pub fn failure_to_mcp(failure: Failure) -> McpError {
    let stage = failure.stage;
    let mut err: McpError = failure.into_error().into();
    err.message = format!("{stage}: {}", err.message).into();
    err.data = Some(json!({ "stage": stage }));
    err
}
