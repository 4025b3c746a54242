//! wallpaper_listing, wallpaper_catalog and wallpaper_refresh.
//!
//! Each tool runs one acquisition and reports the result's metadata; the
//! decoded pixels stay on the server side.

use banner_client::{AcquisitionPipeline, AcquisitionResult, HttpSource};
use banner_core::ListingSource;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::json_result;
use crate::error::failure_to_mcp;

/// Input parameters for wallpaper_listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListingParams {
    /// Merge the restricted category into the general one.
    /// Defaults to the server's `extended` setting.
    #[serde(default)]
    pub extended: Option<bool>,
}

/// Input parameters for wallpaper_catalog.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CatalogParams {
    /// Named-API list URL. Defaults to the configured list.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// 0-based index into the named-API list (see wallpaper_apis).
    pub index: usize,
}

/// Metadata of an acquired wallpaper.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WallpaperOutput {
    /// 1-based index of the chosen entry or API.
    pub selected_index: usize,
    pub total_count: usize,
    pub display_name: String,
    /// Where the payload was downloaded from.
    pub source_location: String,
    pub width: u32,
    pub height: u32,
    /// Format sniffed from the payload's magic bytes.
    pub format: Option<String>,
    pub fetched_at: String,
    /// "catalog" or "listing".
    pub mode: String,
}

impl From<&AcquisitionResult> for WallpaperOutput {
    fn from(result: &AcquisitionResult) -> Self {
        Self {
            selected_index: result.selected_index,
            total_count: result.total_count,
            display_name: result.display_name.clone(),
            source_location: result.source_location.to_string(),
            width: result.image.width(),
            height: result.image.height(),
            format: result.image.format.map(|f| f.as_str().to_string()),
            fetched_at: result.fetched_at.clone(),
            mode: result.mode.name().to_string(),
        }
    }
}

/// Implementation of the wallpaper_listing tool.
pub async fn listing_impl<H: HttpSource, L: ListingSource>(
    pipeline: &AcquisitionPipeline<H, L>, default_extended: bool, params: ListingParams, cancel: &CancellationToken,
) -> Result<CallToolResult, McpError> {
    let extended = params.extended.unwrap_or(default_extended);
    let result = pipeline.fetch_from_listing(extended, cancel).await.map_err(failure_to_mcp)?;
    json_result(&WallpaperOutput::from(&result))
}

/// Implementation of the wallpaper_catalog tool.
pub async fn catalog_impl<H: HttpSource, L: ListingSource>(
    pipeline: &AcquisitionPipeline<H, L>, default_endpoint: &str, params: CatalogParams, cancel: &CancellationToken,
) -> Result<CallToolResult, McpError> {
    let endpoint = params.endpoint.as_deref().unwrap_or(default_endpoint);
    let result = pipeline
        .fetch_from_catalog(endpoint, params.index, cancel)
        .await
        .map_err(failure_to_mcp)?;
    json_result(&WallpaperOutput::from(&result))
}

/// Implementation of the wallpaper_refresh tool.
pub async fn refresh_impl<H: HttpSource, L: ListingSource>(
    pipeline: &AcquisitionPipeline<H, L>, cancel: &CancellationToken,
) -> Result<CallToolResult, McpError> {
    let result = pipeline.refresh(cancel).await.map_err(failure_to_mcp)?;
    json_result(&WallpaperOutput::from(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{API_LIST, output_json, stub_pipeline};

    #[tokio::test]
    async fn test_listing_reports_metadata() {
        let pipeline = stub_pipeline();
        let result = listing_impl(&pipeline, false, ListingParams::default(), &CancellationToken::new())
            .await
            .unwrap();

        let output: WallpaperOutput = output_json(&result);
        assert_eq!(output.total_count, 2);
        assert!((1..=2).contains(&output.selected_index));
        assert_eq!((output.width, output.height), (3, 2));
        assert_eq!(output.format.as_deref(), Some("png"));
        assert_eq!(output.mode, "listing");
    }

    #[tokio::test]
    async fn test_catalog_reports_api_name() {
        let pipeline = stub_pipeline();
        let params = CatalogParams { endpoint: None, index: 1 };
        let result = catalog_impl(&pipeline, API_LIST, params, &CancellationToken::new()).await.unwrap();

        let output: WallpaperOutput = output_json(&result);
        assert_eq!(output.selected_index, 2);
        assert_eq!(output.total_count, 2);
        assert_eq!(output.display_name, "Landscape");
        assert_eq!(output.mode, "catalog");
    }

    #[tokio::test]
    async fn test_catalog_bad_index_is_invalid_params() {
        let pipeline = stub_pipeline();
        let params = CatalogParams { endpoint: Some(API_LIST.into()), index: 9 };
        let err = catalog_impl(&pipeline, API_LIST, params, &CancellationToken::new()).await.unwrap_err();

        assert_eq!(err.code.0, -32602);
        assert!(err.message.starts_with("fetching:"));
    }

    #[tokio::test]
    async fn test_refresh_before_any_run() {
        let pipeline = stub_pipeline();
        let err = refresh_impl(&pipeline, &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_cancelled_token() {
        let pipeline = stub_pipeline();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = listing_impl(&pipeline, false, ListingParams::default(), &cancel).await.unwrap_err();
        assert_eq!(err.code.0, -32800);
    }
}
