//! Token bucket rate limiting keyed by origin address or credential.

use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Which limiter denied a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateScope {
    Origin,
    Credential,
}

impl RateScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateScope::Origin => "origin",
            RateScope::Credential => "credential",
        }
    }
}

impl fmt::Display for RateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A continuously refilling token bucket.
#[derive(Debug, Clone, Copy)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_per_sec: f64, now: Instant) -> bool {
        // A clock reading older than the last refill counts as no time passed.
        let now = now.max(self.last_refill);
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();

        self.tokens = (self.tokens + elapsed * refill_per_sec).min(capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Per-key token bucket limiter.
///
/// Buckets are created full on first sight of a key. The refill-and-consume
/// step runs under the map entry's shard lock, so concurrent checks for the
/// same key are serialized while different keys proceed in parallel.
#[derive(Debug)]
pub struct TokenBucketLimiter<K: Eq + Hash> {
    buckets: DashMap<K, TokenBucket>,
    burst: f64,
    refill_per_minute: f64,
}

impl<K: Eq + Hash + Clone> TokenBucketLimiter<K> {
    pub fn new(burst: f64, refill_per_minute: f64) -> Self {
        Self {
            buckets: DashMap::new(),
            burst,
            refill_per_minute,
        }
    }

    pub fn burst(&self) -> f64 {
        self.burst
    }

    pub fn refill_per_minute(&self) -> f64 {
        self.refill_per_minute
    }

    /// Take one token for `key`. Returns false when the bucket is empty.
    ///
    /// The clock is read once the entry lock is held.
    pub fn check(&self, key: &K) -> bool {
        let refill_per_sec = self.refill_per_minute / 60.0;
        let mut bucket = self
            .buckets
            .entry(key.clone())
            .or_insert_with(|| TokenBucket::new(self.burst, Instant::now()));
        bucket.try_acquire(self.burst, refill_per_sec, Instant::now())
    }

    /// Like [`check`](Self::check) with an explicit clock reading.
    pub fn check_at(&self, key: &K, now: Instant) -> bool {
        let refill_per_sec = self.refill_per_minute / 60.0;
        let mut bucket = self
            .buckets
            .entry(key.clone())
            .or_insert_with(|| TokenBucket::new(self.burst, now));
        bucket.try_acquire(self.burst, refill_per_sec, now)
    }

    /// Tokens currently stored for `key`, without refilling.
    pub fn tokens(&self, key: &K) -> Option<f64> {
        self.buckets.get(key).map(|b| b.tokens)
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Time an empty bucket needs to refill to `burst`. Saturates at
    /// [`Duration::MAX`] when the refill rate is vanishingly small.
    pub fn time_to_full(&self) -> Duration {
        Duration::try_from_secs_f64(self.burst / self.refill_per_minute * 60.0)
            .unwrap_or(Duration::MAX)
    }

    /// Drop buckets untouched for `idle_ttl`.
    ///
    /// The TTL is raised to at least [`time_to_full`](Self::time_to_full):
    /// any bucket idle that long is full again, identical to a fresh one.
    /// Returns the number of evicted buckets.
    pub fn evict_idle(&self, now: Instant, idle_ttl: Duration) -> usize {
        let ttl = idle_ttl.max(self.time_to_full());
        let before = self.buckets.len();
        self.buckets
            .retain(|_, b| now.saturating_duration_since(b.last_refill) < ttl);
        before.saturating_sub(self.buckets.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_then_deny() {
        let limiter = TokenBucketLimiter::new(12.0, 6.0);
        let now = Instant::now();
        for i in 0..12 {
            assert!(limiter.check_at(&"10.0.0.1", now), "request {i} should pass");
        }
        assert!(!limiter.check_at(&"10.0.0.1", now));
        // Other keys are unaffected.
        assert!(limiter.check_at(&"10.0.0.2", now));
    }

    #[test]
    fn test_refill_proportional_to_elapsed() {
        let limiter = TokenBucketLimiter::new(2.0, 6.0);
        let start = Instant::now();
        assert!(limiter.check_at(&"k", start));
        assert!(limiter.check_at(&"k", start));
        assert!(!limiter.check_at(&"k", start));

        // 6 per minute: one token every 10 seconds.
        assert!(!limiter.check_at(&"k", start + Duration::from_secs(9)));
        assert!(limiter.check_at(&"k", start + Duration::from_secs(10)));
        assert!(!limiter.check_at(&"k", start + Duration::from_secs(10)));
    }

    #[test]
    fn test_tokens_stay_within_bounds() {
        let limiter = TokenBucketLimiter::new(3.0, 60.0);
        let start = Instant::now();
        for step in 0..200u64 {
            let now = start + Duration::from_millis(step * 370);
            limiter.check_at(&"k", now);
            if step % 7 == 0 {
                // Long idle period must not overfill.
                limiter.check_at(&"k", now + Duration::from_secs(3600));
            }
            let tokens = limiter.tokens(&"k").unwrap();
            assert!((0.0..=3.0).contains(&tokens), "tokens out of range: {tokens}");
        }
    }

    #[test]
    fn test_stale_clock_reading_does_not_double_refill() {
        let limiter = TokenBucketLimiter::new(2.0, 6.0);
        let start = Instant::now();
        assert!(limiter.check_at(&"k", start));
        assert!(limiter.check_at(&"k", start));
        assert!(limiter.check_at(&"k", start + Duration::from_secs(10)));

        // A request that read the clock earlier but got the lock later.
        assert!(!limiter.check_at(&"k", start + Duration::from_secs(5)));

        // Only 5s have passed since the last refill: half a token.
        assert!(!limiter.check_at(&"k", start + Duration::from_secs(15)));
        assert!(limiter.check_at(&"k", start + Duration::from_secs(20)));
    }

    #[test]
    fn test_time_to_full_saturates() {
        let limiter = TokenBucketLimiter::<u8>::new(12.0, 1e-300);
        assert_eq!(limiter.time_to_full(), Duration::MAX);

        // Eviction with a saturated TTL keeps every bucket.
        let now = Instant::now();
        limiter.check_at(&1, now);
        assert_eq!(limiter.evict_idle(now + Duration::from_secs(86_400), Duration::ZERO), 0);
        assert_eq!(limiter.len(), 1);

        let limiter = TokenBucketLimiter::<u8>::new(12.0, 6.0);
        assert_eq!(limiter.time_to_full(), Duration::from_secs(120));
    }

    #[test]
    fn test_denied_check_does_not_go_negative() {
        let limiter = TokenBucketLimiter::new(1.0, 1.0);
        let now = Instant::now();
        assert!(limiter.check_at(&"k", now));
        for _ in 0..10 {
            assert!(!limiter.check_at(&"k", now));
        }
        assert_eq!(limiter.tokens(&"k"), Some(0.0));
    }

    #[test]
    fn test_evict_idle_respects_refill_time() {
        let limiter = TokenBucketLimiter::new(12.0, 6.0);
        let start = Instant::now();
        limiter.check_at(&"a", start);
        limiter.check_at(&"b", start + Duration::from_secs(100));

        // Requested TTL of 1s is raised to the 120s refill time.
        let evicted = limiter.evict_idle(start + Duration::from_secs(119), Duration::from_secs(1));
        assert_eq!(evicted, 0);

        let evicted = limiter.evict_idle(start + Duration::from_secs(130), Duration::from_secs(1));
        assert_eq!(evicted, 1);
        assert!(limiter.tokens(&"a").is_none());
        assert!(limiter.tokens(&"b").is_some());
    }

    #[test]
    fn test_concurrent_checks_never_overdraw() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let limiter = Arc::new(TokenBucketLimiter::new(50.0, 0.001));
        let allowed = Arc::new(AtomicUsize::new(0));
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                let allowed = allowed.clone();
                std::thread::spawn(move || {
                    for _ in 0..20 {
                        if limiter.check_at(&"shared".to_string(), now) {
                            allowed.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(allowed.load(Ordering::SeqCst), 50);
    }
}
