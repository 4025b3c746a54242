//! Per-category listing snapshots.
//!
//! A snapshot is built completely before it is published, and publishing is
//! a single `Arc` replacement under the map mutex, so readers only ever see
//! a whole entry list. The mutex is never held across an await.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::Error;
use crate::model::{Category, ListingEntry};

/// Listing snapshot lifetime when the configuration does not override it.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Upstream that produces the entries of one category.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_listing(&self, category: Category) -> Result<Vec<ListingEntry>, Error>;
}

/// Immutable entry list of one category as of `fetched_at`.
#[derive(Debug)]
pub struct CategorySnapshot {
    entries: Vec<ListingEntry>,
    fetched_at: Instant,
}

impl CategorySnapshot {
    pub fn new(entries: Vec<ListingEntry>) -> Self {
        Self { entries, fetched_at: Instant::now() }
    }

    pub fn entries(&self) -> &[ListingEntry] {
        &self.entries
    }

    pub fn fetched_at(&self) -> Instant {
        self.fetched_at
    }

    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    /// A snapshot expires once its age reaches the TTL.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

/// TTL cache of listing snapshots with stale-on-error fallback.
pub struct ListingCache<S> {
    source: S,
    ttl: Duration,
    snapshots: Mutex<HashMap<Category, Arc<CategorySnapshot>>>,
}

impl<S: ListingSource> ListingCache<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self { source, ttl, snapshots: Mutex::new(HashMap::new()) }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Category, Arc<CategorySnapshot>>> {
        self.snapshots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn published(&self, category: Category) -> Option<Arc<CategorySnapshot>> {
        self.lock().get(&category).cloned()
    }

    fn publish(&self, category: Category, snapshot: CategorySnapshot) -> Arc<CategorySnapshot> {
        let snapshot = Arc::new(snapshot);
        self.lock().insert(category, Arc::clone(&snapshot));
        snapshot
    }

    fn fresh(&self, category: Category) -> Option<Arc<CategorySnapshot>> {
        self.published(category).filter(|s| s.is_fresh(self.ttl))
    }

    /// Fetch `category` from the source and publish it, falling back to the
    /// previous non-empty snapshot when the fetch fails.
    async fn refresh(&self, category: Category) -> Result<Arc<CategorySnapshot>, Error> {
        match self.source.fetch_listing(category).await {
            Ok(entries) => {
                tracing::debug!(%category, entries = entries.len(), "published listing snapshot");
                Ok(self.publish(category, CategorySnapshot::new(entries)))
            }
            Err(err) => match self.published(category) {
                Some(stale) if !stale.entries().is_empty() => {
                    tracing::warn!(
                        %category,
                        error = %err,
                        age_secs = stale.age().as_secs(),
                        "listing refresh failed, serving stale snapshot"
                    );
                    Ok(stale)
                }
                _ => Err(Error::CatalogUnavailable(format!("{category}: {err}"))),
            },
        }
    }

    /// Entries of `category`, with the counterpart category appended when
    /// `extended` is set.
    ///
    /// The counterpart follows the primary snapshot's freshness: it is
    /// reused while the primary is fresh and refetched whenever the primary
    /// is. A counterpart failure degrades the result to primary-only.
    ///
    /// # Errors
    ///
    /// Returns `Error::CatalogUnavailable` when the primary category has
    /// neither a fresh nor a stale snapshot to offer.
    pub async fn get_entries(&self, category: Category, extended: bool) -> Result<Vec<ListingEntry>, Error> {
        let (primary, primary_fresh) = match self.fresh(category) {
            Some(snapshot) => (snapshot, true),
            None => (self.refresh(category).await?, false),
        };

        let mut entries = primary.entries().to_vec();

        if extended {
            let secondary_category = category.counterpart();
            let secondary = match self.published(secondary_category) {
                Some(snapshot) if primary_fresh => Ok(snapshot),
                _ => self.refresh(secondary_category).await,
            };

            match secondary {
                Ok(snapshot) => entries.extend(snapshot.entries().iter().cloned()),
                Err(err) => {
                    tracing::warn!(category = %secondary_category, error = %err, "extended listing degraded to primary only");
                }
            }
        }

        Ok(entries)
    }

    /// Age of the published snapshot for `category`, if any.
    pub fn snapshot_age(&self, category: Category) -> Option<Duration> {
        self.published(category).map(|s| s.age())
    }

    /// Drop every snapshot; the next read goes to the network.
    pub fn reset(&self) {
        self.lock().clear();
        tracing::debug!("listing cache reset");
    }
}
