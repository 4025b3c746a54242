//! Remote directory listing source.
//!
//! ### Contract
//!
//! - **Endpoint**: `GET <listing-base>/<category-dir>`, one directory per category
//! - **Accept**: `application/vnd.github.v3+json`
//! - **Body**: JSON array of `{name, type, download_url?, path?}`
//! - **Normalization**: files only; a missing `download_url` becomes
//!   `<raw-base>/<path>`

pub mod response;

pub use response::{RawListingItem, parse_listing};

use std::sync::Arc;

use async_trait::async_trait;
use banner_core::{AppConfig, Category, Error, ListingEntry, ListingSource};

use crate::fetch::{ACCEPT_LISTING, HttpSource};

/// Endpoints and directory names of the remote listing.
#[derive(Debug, Clone)]
pub struct ListingConfig {
    pub listing_base_url: String,
    pub raw_base_url: String,
    pub general_dir: String,
    pub restricted_dir: String,
}

impl From<&AppConfig> for ListingConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            listing_base_url: config.listing_base_url.clone(),
            raw_base_url: config.raw_base_url.clone(),
            general_dir: config.general_category.clone(),
            restricted_dir: config.restricted_category.clone(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// [`ListingSource`] backed by an HTTP directory listing.
pub struct DirectoryListing<H> {
    http: Arc<H>,
    config: ListingConfig,
}

impl<H: HttpSource> DirectoryListing<H> {
    pub fn new(http: Arc<H>, config: ListingConfig) -> Self {
        Self { http, config }
    }

    pub fn directory(&self, category: Category) -> &str {
        match category {
            Category::General => &self.config.general_dir,
            Category::Restricted => &self.config.restricted_dir,
        }
    }

    pub fn listing_url(&self, category: Category) -> String {
        format!("{}/{}", self.config.listing_base_url.trim_end_matches('/'), self.directory(category))
    }
}

#[async_trait]
impl<H: HttpSource> ListingSource for DirectoryListing<H> {
    async fn fetch_listing(&self, category: Category) -> Result<Vec<ListingEntry>, Error> {
        let url = self.listing_url(category);
        tracing::debug!(%category, %url, "requesting directory listing");

        let response = self.http.get(&url, ACCEPT_LISTING).await?;
        parse_listing(&response.bytes, &self.config.raw_base_url, self.directory(category))
    }
}
