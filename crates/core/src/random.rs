//! Uniform index selection with a probed backend.
//!
//! The backend is chosen once when the selector is built: a `SmallRng`
//! seeded from the operating system when entropy is available, otherwise a
//! clock-seeded `StdRng` for the selector's whole lifetime.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, SmallRng, StdRng};
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Which generator a selector draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomBackendKind {
    Native,
    ManagedFallback,
}

impl fmt::Display for RandomBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RandomBackendKind::Native => f.write_str("native"),
            RandomBackendKind::ManagedFallback => f.write_str("managed_fallback"),
        }
    }
}

/// Source of uniformly distributed integers.
pub trait RandomBackend: Send {
    /// Uniform draw from `[min, max]`. Callers guarantee `min <= max`.
    fn next_in_range(&mut self, min: i64, max: i64) -> i64;
}

struct NativeBackend(SmallRng);

impl RandomBackend for NativeBackend {
    fn next_in_range(&mut self, min: i64, max: i64) -> i64 {
        self.0.gen_range(min..=max)
    }
}

struct ManagedBackend(StdRng);

impl ManagedBackend {
    fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        let seed = nanos ^ (u64::from(std::process::id()) << 32);
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomBackend for ManagedBackend {
    fn next_in_range(&mut self, min: i64, max: i64) -> i64 {
        self.0.gen_range(min..=max)
    }
}

fn probe() -> (Box<dyn RandomBackend>, RandomBackendKind) {
    match SmallRng::from_rng(OsRng) {
        Ok(rng) => (Box::new(NativeBackend(rng)), RandomBackendKind::Native),
        Err(err) => {
            tracing::warn!(error = %err, "OS entropy unavailable, using managed generator");
            (Box::new(ManagedBackend::from_clock()), RandomBackendKind::ManagedFallback)
        }
    }
}

/// Uniform selector over 1-based indices and inclusive ranges.
pub struct RandomSelector {
    backend: Mutex<Box<dyn RandomBackend>>,
    kind: RandomBackendKind,
}

impl fmt::Debug for RandomSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomSelector").field("kind", &self.kind).finish_non_exhaustive()
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSelector {
    /// Probe for the native backend once and keep the outcome.
    pub fn new() -> Self {
        let (backend, kind) = probe();
        tracing::debug!(backend = %kind, "random selector initialised");
        Self { backend: Mutex::new(backend), kind }
    }

    /// Build a selector that always uses the managed generator.
    pub fn managed() -> Self {
        Self::with_backend(Box::new(ManagedBackend::from_clock()), RandomBackendKind::ManagedFallback)
    }

    /// Inject a specific backend, e.g. a seeded one for replays.
    pub fn with_backend(backend: Box<dyn RandomBackend>, kind: RandomBackendKind) -> Self {
        Self { backend: Mutex::new(backend), kind }
    }

    pub fn backend(&self) -> RandomBackendKind {
        self.kind
    }

    pub fn is_native(&self) -> bool {
        self.kind == RandomBackendKind::Native
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn RandomBackend>> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Uniform index in `[1, count]`, or `0` when there is nothing to select.
    pub fn uniform_index(&self, count: i64) -> i64 {
        if count <= 0 {
            return 0;
        }
        self.lock().next_in_range(1, count)
    }

    /// Uniform value in `[min, max]`; a reversed range yields `min`.
    pub fn uniform_range(&self, min: i64, max: i64) -> i64 {
        if min > max {
            return min;
        }
        self.lock().next_in_range(min, max)
    }
}
