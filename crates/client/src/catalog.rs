//! Named-API list consumed by catalog mode.
//!
//! The list is published either as plain text, one `name|url` pair per
//! line, or as the JSON rendering of the same pairs. Both forms produce the
//! same ordered records.

use banner_core::Error;
use serde::{Deserialize, Serialize};

use crate::fetch::{ACCEPT_CATALOG, HttpSource};

/// One upstream wallpaper API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedApi {
    pub name: String,
    pub url: String,
}

/// Parse the pipe-delimited form.
///
/// Blank lines and lines without `|` are skipped; each line splits on its
/// first `|` and both halves are trimmed. Lines whose URL half is empty are
/// dropped too, although the list endpoint itself passes them through; such
/// an entry has nothing to draw from.
pub fn parse_pipe_list(body: &str) -> Vec<NamedApi> {
    body.lines()
        .filter_map(|line| {
            let (name, url) = line.trim().split_once('|')?;
            let (name, url) = (name.trim(), url.trim());
            if url.is_empty() {
                return None;
            }
            Some(NamedApi { name: name.to_string(), url: url.to_string() })
        })
        .collect()
}

/// Parse either form of the list, picking JSON when the body is an array.
pub fn parse_api_list(body: &str) -> Result<Vec<NamedApi>, Error> {
    let trimmed = body.trim_start_matches('\u{feff}').trim();
    if trimmed.starts_with('[') {
        let apis: Vec<NamedApi> =
            serde_json::from_str(trimmed).map_err(|e| Error::Network(format!("malformed API list: {e}")))?;
        return Ok(apis.into_iter().filter(|api| !api.url.trim().is_empty()).collect());
    }
    Ok(parse_pipe_list(trimmed))
}

/// Download and parse the named-API list at `endpoint`.
pub async fn fetch_api_list<H: HttpSource + ?Sized>(http: &H, endpoint: &str) -> Result<Vec<NamedApi>, Error> {
    let response = http.get(endpoint, ACCEPT_CATALOG).await?;
    let body = String::from_utf8_lossy(&response.bytes);
    let apis = parse_api_list(&body)?;
    tracing::debug!(%endpoint, apis = apis.len(), "loaded named-API list");
    Ok(apis)
}
