//! Core types and shared functionality for banner.
//!
//! This crate provides:
//! - Listing snapshot cache with stale-on-error fallback
//! - Session-scoped dedup tracking
//! - Random index selection with a probed backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod dedup;
pub mod error;
pub mod model;
pub mod random;

pub use cache::{CategorySnapshot, ListingCache, ListingSource};
pub use config::AppConfig;
pub use dedup::DedupTracker;
pub use error::Error;
pub use model::{Category, ListingEntry};
pub use random::{RandomBackend, RandomBackendKind, RandomSelector};
