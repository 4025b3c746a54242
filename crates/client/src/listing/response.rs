//! Directory listing response types and normalization.

use banner_core::{Error, ListingEntry};
use serde::Deserialize;
use url::Url;

/// One item of a GitHub-style contents response.
#[derive(Debug, Deserialize)]
pub struct RawListingItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// Join a raw-content base and a repository path with exactly one slash.
fn raw_location(raw_base: &str, path: &str) -> String {
    format!("{}/{}", raw_base.trim_end_matches('/'), path.trim_start_matches('/'))
}

impl RawListingItem {
    /// Resolve the content location, deriving it from the raw base when the
    /// listing did not supply one.
    fn content_location(&self, raw_base: &str, directory: &str) -> Option<Url> {
        let location = match self.download_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => match self.path.as_deref() {
                Some(path) if !path.is_empty() => raw_location(raw_base, path),
                _ => raw_location(raw_base, &format!("{}/{}", directory, self.name)),
            },
        };
        Url::parse(&location).ok()
    }
}

/// Parse a listing body into usable file entries.
///
/// Directories and other non-file items are dropped. Items that are not
/// objects, lack a `name`, or resolve to an unparsable URL are skipped; only
/// a body that is not a JSON array at all is an error.
pub fn parse_listing(body: &[u8], raw_base: &str, directory: &str) -> Result<Vec<ListingEntry>, Error> {
    let items: Vec<serde_json::Value> =
        serde_json::from_slice(body).map_err(|e| Error::Network(format!("malformed listing body: {e}")))?;

    let total = items.len();
    let entries: Vec<ListingEntry> = items
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawListingItem>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed listing item");
                None
            }
        })
        .filter(|item| item.kind == "file")
        .filter_map(|item| match item.content_location(raw_base, directory) {
            Some(location) => Some(ListingEntry::new(item.name, location)),
            None => {
                tracing::debug!(name = %item.name, "skipping listing item without a usable location");
                None
            }
        })
        .collect();

    tracing::debug!(directory, total, usable = entries.len(), "parsed listing");

    Ok(entries)
}
