//! Wallpaper acquisition pipeline.
//!
//! Composes the listing cache, random selector, dedup tracker, fetch
//! client and payload decoder into two run modes:
//!
//! - **Catalog**: draw URLs from a named API until one has not been served
//!   this session, bounded by `max_catalog_attempts`.
//! - **Listing**: pick a uniform random entry from the (optionally merged)
//!   directory listing and decode its payload. No dedup.
//!
//! Each run walks `Idle → Fetching → Selecting → Downloading → Decoding →
//! Done`, or stops at `Failed` with the stage that broke. Every suspension
//! point races the caller's [`CancellationToken`].

mod state;

pub use state::{Failure, Stage};

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use banner_core::{
    AppConfig, Category, DedupTracker, Error, ListingCache, ListingSource, RandomBackendKind, RandomSelector,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use state::Run;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::catalog::{NamedApi, fetch_api_list};
use crate::decode::{DecodedImage, decode_image};
use crate::fetch::{ACCEPT_ANY, FetchClient, FetchConfig, HttpSource};
use crate::listing::{DirectoryListing, ListingConfig};

/// Pipeline wired to the real HTTP stack.
pub type HttpPipeline = AcquisitionPipeline<FetchClient, DirectoryListing<FetchClient>>;

/// The mode a run was started in; `refresh` replays the last one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Mode {
    Catalog { endpoint: String, api_index: usize },
    Listing { extended: bool },
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Catalog { .. } => "catalog",
            Mode::Listing { .. } => "listing",
        }
    }
}

/// Outcome of a successful run. Only ever built fully populated.
#[derive(Debug, Clone)]
pub struct AcquisitionResult {
    /// 1-based position of the chosen entry.
    pub selected_index: usize,
    pub total_count: usize,
    pub display_name: String,
    pub source_location: Url,
    pub image: DecodedImage,
    /// RFC 3339 completion time.
    pub fetched_at: String,
    pub mode: Mode,
}

/// Orchestrates catalog and listing runs over shared session state.
pub struct AcquisitionPipeline<H, L> {
    http: Arc<H>,
    listings: ListingCache<L>,
    selector: RandomSelector,
    dedup: DedupTracker,
    max_catalog_attempts: usize,
    apis: Mutex<HashMap<String, Arc<Vec<NamedApi>>>>,
    active: Mutex<Option<Mode>>,
}

/// Default bound on catalog-mode draws.
pub const DEFAULT_MAX_CATALOG_ATTEMPTS: usize = 10;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn until_cancelled<T, F>(cancel: &CancellationToken, work: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = work => result,
    }
}

/// Decode on the blocking pool; a cancelled caller simply drops the result.
async fn decode_off_thread(payload: Bytes) -> Result<DecodedImage, Error> {
    tokio::task::spawn_blocking(move || decode_image(&payload))
        .await
        .map_err(|e| Error::Decode(format!("decode task aborted: {e}")))?
        .map_err(Error::from)
}

impl HttpPipeline {
    /// Build the production pipeline from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let http = Arc::new(FetchClient::new(FetchConfig::from(config))?);
        let listing = DirectoryListing::new(Arc::clone(&http), ListingConfig::from(config));

        Ok(Self::new(http, ListingCache::new(listing, config.cache_ttl()), RandomSelector::new(), DedupTracker::new())
            .with_max_catalog_attempts(config.max_catalog_attempts))
    }
}

impl<H: HttpSource, L: ListingSource> AcquisitionPipeline<H, L> {
    pub fn new(http: Arc<H>, listings: ListingCache<L>, selector: RandomSelector, dedup: DedupTracker) -> Self {
        Self {
            http,
            listings,
            selector,
            dedup,
            max_catalog_attempts: DEFAULT_MAX_CATALOG_ATTEMPTS,
            apis: Mutex::new(HashMap::new()),
            active: Mutex::new(None),
        }
    }

    pub fn with_max_catalog_attempts(mut self, attempts: usize) -> Self {
        self.max_catalog_attempts = attempts.max(1);
        self
    }

    /// Which generator the selector settled on at construction.
    pub fn rng_backend(&self) -> RandomBackendKind {
        self.selector.backend()
    }

    pub fn listings(&self) -> &ListingCache<L> {
        &self.listings
    }

    pub fn dedup(&self) -> &DedupTracker {
        &self.dedup
    }

    pub fn active_mode(&self) -> Option<Mode> {
        lock(&self.active).clone()
    }

    fn remember(&self, mode: Mode) {
        *lock(&self.active) = Some(mode);
    }

    /// Named-API list at `endpoint`, served from memory until the next reset.
    ///
    /// Empty lists are not kept; the endpoint answers with an error object
    /// (parsed as no APIs) while its backing file is missing.
    pub async fn load_apis(&self, endpoint: &str) -> Result<Arc<Vec<NamedApi>>, Error> {
        let cached = lock(&self.apis).get(endpoint).cloned();
        if let Some(apis) = cached {
            return Ok(apis);
        }

        let apis = Arc::new(fetch_api_list(self.http.as_ref(), endpoint).await?);
        if !apis.is_empty() {
            lock(&self.apis).insert(endpoint.to_string(), Arc::clone(&apis));
        }
        Ok(apis)
    }

    /// Catalog mode: an unseen wallpaper from API `api_index` of `endpoint`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an out-of-range index, `EmptyCatalog` for an empty
    /// list, `ExhaustedRetries` when every draw was a duplicate or failed,
    /// `Decode`/`EmptyPayload` when the chosen payload is unusable.
    pub async fn fetch_from_catalog(
        &self, endpoint: &str, api_index: usize, cancel: &CancellationToken,
    ) -> Result<AcquisitionResult, Failure> {
        let mode = Mode::Catalog { endpoint: endpoint.to_string(), api_index };
        self.remember(mode.clone());
        let mut run = Run::start("catalog");

        run.advance(Stage::Fetching);
        let apis = until_cancelled(cancel, self.load_apis(endpoint))
            .await
            .map_err(|e| run.fail(e))?;
        if apis.is_empty() {
            return Err(run.fail(Error::EmptyCatalog));
        }
        let Some(api) = apis.get(api_index) else {
            let message = format!("api index {} out of range for {} apis", api_index, apis.len());
            return Err(run.fail(Error::InvalidInput(message)));
        };

        // The final URL after redirects is the candidate; it is recorded as
        // served before its body is read, and a duplicate's body is never read.
        let claim = |candidate: &Url| self.dedup.check_and_record(candidate.as_str());

        for attempt in 1..=self.max_catalog_attempts {
            run.advance(Stage::Fetching);
            let response = match until_cancelled(cancel, self.http.get_claimed(&api.url, ACCEPT_ANY, &claim)).await {
                Ok(Some(response)) => response,
                Ok(None) => {
                    tracing::debug!(attempt, api = %api.name, "candidate already served, drawing again");
                    continue;
                }
                Err(Error::Cancelled) => return Err(run.fail(Error::Cancelled)),
                Err(err) => {
                    tracing::warn!(attempt, api = %api.name, error = %err, "catalog draw failed");
                    continue;
                }
            };

            run.advance(Stage::Selecting);
            let candidate = response.final_url;

            run.advance(Stage::Downloading);
            if response.bytes.is_empty() {
                return Err(run.fail(Error::EmptyPayload(candidate.to_string())));
            }

            run.advance(Stage::Decoding);
            let image = until_cancelled(cancel, decode_off_thread(response.bytes))
                .await
                .map_err(|e| run.fail(e))?;

            run.advance(Stage::Done);
            return Ok(AcquisitionResult {
                selected_index: api_index + 1,
                total_count: apis.len(),
                display_name: api.name.clone(),
                source_location: candidate,
                image,
                fetched_at: Utc::now().to_rfc3339(),
                mode,
            });
        }

        Err(run.fail(Error::ExhaustedRetries { attempts: self.max_catalog_attempts }))
    }

    /// Listing mode: a uniformly random entry of the general category,
    /// merged with the restricted one when `extended`.
    ///
    /// # Errors
    ///
    /// `CatalogUnavailable` when no listing can be produced, `EmptyCatalog`
    /// when it has no entries, `Network`/`EmptyPayload` for the download and
    /// `Decode` when the payload cannot be turned into pixels.
    pub async fn fetch_from_listing(
        &self, extended: bool, cancel: &CancellationToken,
    ) -> Result<AcquisitionResult, Failure> {
        let mode = Mode::Listing { extended };
        self.remember(mode.clone());
        let mut run = Run::start("listing");

        run.advance(Stage::Fetching);
        let entries = until_cancelled(cancel, self.listings.get_entries(Category::General, extended))
            .await
            .map_err(|e| run.fail(e))?;

        run.advance(Stage::Selecting);
        let total_count = entries.len();
        if total_count == 0 {
            return Err(run.fail(Error::EmptyCatalog));
        }
        let index = self.selector.uniform_index(total_count as i64);
        let position = usize::try_from(index).ok().and_then(|i| i.checked_sub(1));
        let Some((position, entry)) = position.and_then(|p| entries.get(p).map(|e| (p, e))) else {
            let message = format!("selector returned {index} outside 1..={total_count}");
            return Err(run.fail(Error::InvalidInput(message)));
        };
        tracing::debug!(index, total_count, name = %entry.name, "selected listing entry");

        run.advance(Stage::Downloading);
        let response = until_cancelled(cancel, self.http.get(entry.content_location.as_str(), ACCEPT_ANY))
            .await
            .map_err(|e| run.fail(e))?;
        if response.bytes.is_empty() {
            return Err(run.fail(Error::EmptyPayload(entry.content_location.to_string())));
        }

        run.advance(Stage::Decoding);
        let image = until_cancelled(cancel, decode_off_thread(response.bytes))
            .await
            .map_err(|e| run.fail(e))?;

        run.advance(Stage::Done);
        Ok(AcquisitionResult {
            selected_index: position + 1,
            total_count,
            display_name: entry.name.clone(),
            source_location: entry.content_location.clone(),
            image,
            fetched_at: Utc::now().to_rfc3339(),
            mode,
        })
    }

    /// Forget cached listings, named-API lists and served URLs.
    pub fn reset(&self) {
        self.listings.reset();
        self.dedup.reset();
        lock(&self.apis).clear();
        tracing::info!("pipeline session state reset");
    }

    /// Reset session state, then replay the last run's mode.
    pub async fn refresh(&self, cancel: &CancellationToken) -> Result<AcquisitionResult, Failure> {
        self.reset();
        match self.active_mode() {
            Some(Mode::Listing { extended }) => self.fetch_from_listing(extended, cancel).await,
            Some(Mode::Catalog { endpoint, api_index }) => self.fetch_from_catalog(&endpoint, api_index, cancel).await,
            None => Err(Failure::new(Stage::Idle, Error::InvalidInput("nothing to refresh: no run has started".into()))),
        }
    }
}
