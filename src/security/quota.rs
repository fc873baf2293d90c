//! Per-credential daily quota with a process-wide reset boundary.

use std::hash::Hash;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Rejection from the quota tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaExceeded {
    pub limit: u64,
}

/// Counts admissions per key and clears every count together once the
/// window has elapsed.
///
/// The window start sits behind a read/write lock. A reset takes it
/// exclusively; check-and-increment holds it shared while mutating the
/// key's entry. A reset therefore never lands between another request's
/// check and its increment.
#[derive(Debug)]
pub struct QuotaTracker<K: Eq + Hash> {
    counts: DashMap<K, u64>,
    window_start: RwLock<Instant>,
    window: Duration,
    limit: u64,
}

impl<K: Eq + Hash + Clone> QuotaTracker<K> {
    pub fn new(limit: u64, window: Duration) -> Self {
        Self::starting_at(limit, window, Instant::now())
    }

    /// Tracker whose first window opens at `start`.
    pub fn starting_at(limit: u64, window: Duration, start: Instant) -> Self {
        Self {
            counts: DashMap::new(),
            window_start: RwLock::new(start),
            window,
            limit,
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Admit one request for `key`. Returns the remaining allowance.
    pub fn check_and_increment(&self, key: &K) -> Result<u64, QuotaExceeded> {
        self.check_and_increment_at(key, Instant::now())
    }

    /// Like [`check_and_increment`](Self::check_and_increment) with an
    /// explicit clock reading.
    pub fn check_and_increment_at(&self, key: &K, now: Instant) -> Result<u64, QuotaExceeded> {
        self.roll_window(now);

        let _window = self
            .window_start
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut count = self.counts.entry(key.clone()).or_insert(0);
        if *count >= self.limit {
            return Err(QuotaExceeded { limit: self.limit });
        }
        *count += 1;
        Ok(self.limit - *count)
    }

    /// Admissions recorded for `key` in the current window.
    pub fn used(&self, key: &K) -> u64 {
        self.counts.get(key).map(|c| *c).unwrap_or(0)
    }

    /// Clear all counts if the window has elapsed at `now`.
    fn roll_window(&self, now: Instant) {
        let expired = |start: Instant| now.saturating_duration_since(start) > self.window;

        let start = *self
            .window_start
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if !expired(start) {
            return;
        }

        let mut start = self
            .window_start
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Another request may have rolled the window while we waited.
        if expired(*start) {
            self.counts.clear();
            *start = now;
            tracing::info!("Daily quota window reset");
        }
    }
}
