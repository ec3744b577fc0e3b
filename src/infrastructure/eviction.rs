//! Eviction adapters for bounding tracked keys.
//!
//! A public signup endpoint sees an unbounded stream of client keys; without
//! a bound the attempt map grows until the process dies. These adapters
//! decide which entry to forget when the bound is reached.

use crate::application::ports::{EvictionCandidate, EvictionPolicy};
use std::sync::Arc;

/// Function type for scoring an eviction candidate.
///
/// Higher score = kept longer; the lowest-scored candidate is evicted first.
pub type PriorityFn<K> = Arc<dyn Fn(&EvictionCandidate<K>) -> u32 + Send + Sync>;

/// LRU eviction policy with an entry count limit.
///
/// Evicts the key that made an attempt longest ago. Forgetting a stale key
/// resets its quota, so the limit should be sized well above the number of
/// clients active within one window.
#[derive(Debug, Clone)]
pub struct LruEviction {
    max_keys: usize,
}

impl LruEviction {
    /// Create a new LRU eviction policy with the given key limit.
    pub fn new(max_keys: usize) -> Self {
        Self { max_keys }
    }
}

impl<K> EvictionPolicy<K> for LruEviction
where
    K: Clone,
{
    fn select_victim(&self, candidates: &[EvictionCandidate<K>]) -> Option<K> {
        candidates
            .iter()
            .min_by_key(|candidate| candidate.last_seen)
            .map(|candidate| candidate.key.clone())
    }

    fn should_evict(&self, current_entries: usize) -> bool {
        current_entries >= self.max_keys
    }
}

/// Priority-based eviction using a caller-supplied scoring function.
///
/// When the limit is reached, the candidate with the lowest score is evicted;
/// ties are broken by least-recent attempt. The default facade wiring scores
/// by rejection count, so active abusers are the last keys to be forgotten.
#[derive(Clone)]
pub struct PriorityEviction<K> {
    max_keys: usize,
    priority_fn: PriorityFn<K>,
}

impl<K> PriorityEviction<K> {
    /// Create a new priority eviction policy.
    ///
    /// # Arguments
    /// * `max_keys` - Maximum number of tracked keys
    /// * `priority_fn` - Scores candidates; lowest score is evicted first
    pub fn new(max_keys: usize, priority_fn: PriorityFn<K>) -> Self {
        Self {
            max_keys,
            priority_fn,
        }
    }
}

impl<K> std::fmt::Debug for PriorityEviction<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityEviction")
            .field("max_keys", &self.max_keys)
            .field("priority_fn", &"<fn>")
            .finish()
    }
}

impl<K> EvictionPolicy<K> for PriorityEviction<K>
where
    K: Clone + Send + Sync,
{
    fn select_victim(&self, candidates: &[EvictionCandidate<K>]) -> Option<K> {
        candidates
            .iter()
            .min_by_key(|candidate| ((self.priority_fn)(candidate), candidate.last_seen))
            .map(|candidate| candidate.key.clone())
    }

    fn should_evict(&self, current_entries: usize) -> bool {
        current_entries >= self.max_keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn candidate(key: &str, last_seen: Instant, rejected: u64) -> EvictionCandidate<String> {
        EvictionCandidate {
            key: key.to_string(),
            last_seen,
            rejected,
        }
    }

    #[test]
    fn test_lru_selects_least_recent() {
        let policy = LruEviction::new(10);
        let base = Instant::now();

        let candidates = vec![
            candidate("fresh", base + Duration::from_secs(300), 0),
            candidate("stale", base, 0),
            candidate("middle", base + Duration::from_secs(60), 0),
        ];

        assert_eq!(policy.select_victim(&candidates), Some("stale".to_string()));
    }

    #[test]
    fn test_lru_should_evict_at_limit() {
        let policy = LruEviction::new(3);
        assert!(!<LruEviction as EvictionPolicy<String>>::should_evict(
            &policy, 2
        ));
        assert!(<LruEviction as EvictionPolicy<String>>::should_evict(
            &policy, 3
        ));
        assert!(<LruEviction as EvictionPolicy<String>>::should_evict(
            &policy, 4
        ));
    }

    #[test]
    fn test_lru_empty_candidates() {
        let policy = LruEviction::new(10);
        let candidates: Vec<EvictionCandidate<String>> = vec![];
        assert_eq!(policy.select_victim(&candidates), None);
    }

    #[test]
    fn test_priority_selects_lowest_score() {
        // Keep heavily-rejected keys; forget clean ones first
        let policy = PriorityEviction::new(
            10,
            Arc::new(|c: &EvictionCandidate<String>| c.rejected.min(u32::MAX as u64) as u32),
        );
        let base = Instant::now();

        let candidates = vec![
            candidate("abuser", base, 40),
            candidate("clean", base + Duration::from_secs(500), 0),
            candidate("mild", base + Duration::from_secs(400), 2),
        ];

        assert_eq!(policy.select_victim(&candidates), Some("clean".to_string()));
    }

    #[test]
    fn test_priority_ties_break_by_age() {
        let policy = PriorityEviction::new(10, Arc::new(|_: &EvictionCandidate<String>| 7));
        let base = Instant::now();

        let candidates = vec![
            candidate("newer", base + Duration::from_secs(120), 0),
            candidate("older", base, 0),
        ];

        assert_eq!(policy.select_victim(&candidates), Some("older".to_string()));
    }
}
