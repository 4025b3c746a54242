//! Session-scoped record of URLs already served.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::cache::hash::{Fingerprint, fingerprint};

/// Seen-set keyed by URL fingerprint.
///
/// `check_and_record` is the entry point for concurrent callers: the
/// membership test and the insert happen under one lock, so two callers
/// racing on the same URL cannot both see it as new.
#[derive(Debug, Default)]
pub struct DedupTracker {
    seen: Mutex<HashSet<Fingerprint>>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Fingerprint>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `url` and report whether it was new.
    pub fn check_and_record(&self, url: &str) -> bool {
        self.lock().insert(fingerprint(url))
    }

    pub fn is_duplicate(&self, url: &str) -> bool {
        self.lock().contains(&fingerprint(url))
    }

    pub fn record(&self, url: &str) {
        self.lock().insert(fingerprint(url));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn reset(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_check_and_record_cycle() {
        let tracker = DedupTracker::new();
        assert!(tracker.check_and_record("A"));
        assert!(!tracker.check_and_record("A"));

        tracker.reset();
        assert!(tracker.check_and_record("A"));
    }

    #[test]
    fn test_single_threaded_helpers() {
        let tracker = DedupTracker::new();
        assert!(!tracker.is_duplicate("https://img.example.com/1.jpg"));

        tracker.record("https://img.example.com/1.jpg");
        assert!(tracker.is_duplicate("https://img.example.com/1.jpg"));
        assert!(!tracker.is_duplicate("https://img.example.com/2.jpg"));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_reset_empties_set() {
        let tracker = DedupTracker::new();
        tracker.record("a");
        tracker.record("b");
        tracker.reset();
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_concurrent_callers_see_one_winner() {
        let tracker = Arc::new(DedupTracker::new());
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                let winners = Arc::clone(&winners);
                std::thread::spawn(move || {
                    if tracker.check_and_record("https://img.example.com/shared.jpg") {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.len(), 1);
    }
}
