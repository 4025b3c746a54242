//! wallpaper_apis tool implementation.
//!
//! Lists the named APIs catalog mode can draw from, so a caller can pick an
//! index for wallpaper_catalog.

use banner_client::{AcquisitionPipeline, HttpSource};
use banner_core::ListingSource;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the wallpaper_apis tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ApisParams {
    /// Named-API list URL. Defaults to the configured list.
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApiEntry {
    /// Pass this as `index` to wallpaper_catalog.
    pub index: usize,
    pub name: String,
    pub url: String,
}

/// Output from the wallpaper_apis tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApisOutput {
    pub endpoint: String,
    pub apis: Vec<ApiEntry>,
}

/// Implementation of the wallpaper_apis tool.
pub async fn apis_impl<H: HttpSource, L: ListingSource>(
    pipeline: &AcquisitionPipeline<H, L>, default_endpoint: &str, params: ApisParams,
) -> Result<CallToolResult, McpError> {
    let endpoint = params.endpoint.unwrap_or_else(|| default_endpoint.to_string());
    let apis = pipeline.load_apis(&endpoint).await?;

    let apis = apis
        .iter()
        .enumerate()
        .map(|(index, api)| ApiEntry { index, name: api.name.clone(), url: api.url.clone() })
        .collect();

    json_result(&ApisOutput { endpoint, apis })
}
