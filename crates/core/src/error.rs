//! Unified error types for banner.
//!
//! Every failure the pipeline surfaces is one of these kinds; lower-level
//! errors (HTTP, Base64, image, config) are mapped into them at the
//! boundary where they occur.

use rmcp::model::{ErrorCode, ErrorData as McpError};

use crate::config::ConfigError;

/// Unified error types for the wallpaper acquisition pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Transport failure, timeout, or non-success HTTP status.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// The upstream returned a zero-length body.
    #[error("EMPTY_PAYLOAD: {0}")]
    EmptyPayload(String),

    /// Every Base64 or image decode strategy failed.
    #[error("DECODE_ERROR: {0}")]
    Decode(String),

    /// No usable entries remained after filtering and merging.
    #[error("EMPTY_CATALOG: no usable entries")]
    EmptyCatalog,

    /// No fresh or stale listing could be produced.
    #[error("CATALOG_UNAVAILABLE: {0}")]
    CatalogUnavailable(String),

    /// Catalog mode kept drawing URLs that were already served.
    #[error("EXHAUSTED_RETRIES: no unseen wallpaper after {attempts} attempts")]
    ExhaustedRetries { attempts: usize },

    /// Caller supplied something unusable (bad index, bad URL, nothing to refresh).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The run was cancelled at a suspension point.
    #[error("CANCELLED")]
    Cancelled,
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::InvalidInput(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::Network(msg) => (-32001, msg.clone()),
            Error::EmptyPayload(msg) => (-32002, msg.clone()),
            Error::Decode(msg) => (-32003, msg.clone()),
            Error::EmptyCatalog => (-32004, "no usable entries".to_string()),
            Error::CatalogUnavailable(msg) => (-32005, msg.clone()),
            Error::ExhaustedRetries { .. } => (-32006, err.to_string()),
            Error::Cancelled => (-32800, "request cancelled".to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
