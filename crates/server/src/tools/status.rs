//! pipeline_status tool implementation.

use banner_client::{AcquisitionPipeline, HttpSource};
use banner_core::{Category, ListingSource};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Snapshot of the pipeline's session state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StatusOutput {
    /// "native" or "managed_fallback".
    pub rng_backend: String,
    /// Last mode a run was started in, if any.
    pub active_mode: Option<serde_json::Value>,
    /// URLs served by catalog mode this session.
    pub seen_count: usize,
    pub cache_ttl_secs: u64,
    pub general_snapshot_age_secs: Option<u64>,
    pub restricted_snapshot_age_secs: Option<u64>,
}

pub fn status_impl<H: HttpSource, L: ListingSource>(
    pipeline: &AcquisitionPipeline<H, L>,
) -> Result<CallToolResult, McpError> {
    let listings = pipeline.listings();
    let output = StatusOutput {
        rng_backend: pipeline.rng_backend().to_string(),
        active_mode: pipeline.active_mode().and_then(|mode| serde_json::to_value(mode).ok()),
        seen_count: pipeline.dedup().len(),
        cache_ttl_secs: listings.ttl().as_secs(),
        general_snapshot_age_secs: listings.snapshot_age(Category::General).map(|age| age.as_secs()),
        restricted_snapshot_age_secs: listings.snapshot_age(Category::Restricted).map(|age| age.as_secs()),
    };
    json_result(&output)
}
