//! In-memory listing cache.
//!
//! Keeps one immutable snapshot per category and supports:
//!
//! - Time-bounded freshness (default five minutes)
//! - Stale-on-error fallback when a refresh fails
//! - Read-time merge of the general and restricted categories
//! - SHA-256 URL fingerprints for dedup membership

pub mod hash;
pub mod snapshots;

pub use hash::{Fingerprint, fingerprint};
pub use snapshots::{CategorySnapshot, DEFAULT_TTL, ListingCache, ListingSource};
