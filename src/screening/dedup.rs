//! Near-duplicate suppression over a bounded fingerprint ring.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};

use sha2::{Digest, Sha256};

/// 128-bit content fingerprint.
pub type Fingerprint = [u8; 16];

/// Rejection from the dedup filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateRejected;

/// Fingerprint of the lowercase, trimmed text.
pub fn fingerprint(normalized: &str) -> Fingerprint {
    let digest = Sha256::digest(normalized.trim().to_lowercase().as_bytes());
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest[..16]);
    out
}

/// Fixed-capacity FIFO set.
#[derive(Debug)]
struct FingerprintRing {
    order: VecDeque<Fingerprint>,
    members: HashSet<Fingerprint>,
    capacity: usize,
}

impl FingerprintRing {
    fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert unless present. Returns false for a member.
    fn insert_new(&mut self, fp: Fingerprint) -> bool {
        if self.members.contains(&fp) {
            return false;
        }
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
        self.order.push_back(fp);
        self.members.insert(fp);
        true
    }
}

/// Rejects prompts whose fingerprint was seen among the last `capacity`
/// distinct prompts. Membership check and insertion happen under one lock.
#[derive(Debug)]
pub struct DedupFilter {
    ring: Mutex<FingerprintRing>,
}

impl DedupFilter {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Mutex::new(FingerprintRing::new(capacity.max(1))),
        }
    }

    /// Record `normalized`, or reject it if already recorded.
    ///
    /// A rejected prompt keeps its original position in the ring.
    pub fn check(&self, normalized: &str) -> Result<Fingerprint, DuplicateRejected> {
        let fp = fingerprint(normalized);
        let mut ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);
        if ring.insert_new(fp) {
            Ok(fp)
        } else {
            Err(DuplicateRejected)
        }
    }

    /// Number of remembered fingerprints.
    pub fn len(&self) -> usize {
        self.ring
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.ring
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_rejected() {
        let dedup = DedupFilter::new(4096);
        assert!(dedup.check("Task: hello").is_ok());
        assert_eq!(dedup.check("Task: hello"), Err(DuplicateRejected));
    }

    #[test]
    fn test_case_and_outer_whitespace_ignored() {
        let dedup = DedupFilter::new(16);
        assert!(dedup.check("Task: Hello World").is_ok());
        assert!(dedup.check("  task: hello world \t").is_err());
        // Inner whitespace is significant.
        assert!(dedup.check("Task: Hello  World").is_ok());
    }

    #[test]
    fn test_forgotten_after_capacity_distinct_prompts() {
        let dedup = DedupFilter::new(4096);
        assert!(dedup.check("Task: original").is_ok());
        for i in 0..4096 {
            assert!(dedup.check(&format!("Task: filler {i}")).is_ok());
        }
        assert_eq!(dedup.len(), 4096);
        assert!(dedup.check("Task: original").is_ok());
    }

    #[test]
    fn test_rejection_does_not_refresh_position() {
        let dedup = DedupFilter::new(3);
        dedup.check("a").unwrap();
        dedup.check("b").unwrap();
        dedup.check("c").unwrap();
        // Re-submitting "a" must not move it to the back.
        assert!(dedup.check("a").is_err());
        dedup.check("d").unwrap();
        assert!(dedup.check("a").is_ok(), "a should have been evicted first");
    }

    #[test]
    fn test_size_never_exceeds_capacity() {
        let dedup = DedupFilter::new(10);
        for i in 0..100 {
            let _ = dedup.check(&i.to_string());
            assert!(dedup.len() <= 10);
        }
        assert_eq!(dedup.capacity(), 10);
    }
}
