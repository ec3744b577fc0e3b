//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the
//! application layer needs. Infrastructure adapters implement these ports.

use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

/// Port for obtaining current time.
///
/// Injected so the application layer never touches the system clock directly,
/// and tests can control elapsing time (see `MockClock`).
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// Port for concurrent key-value storage.
///
/// The closure-based `with_entry_mut` is the load-bearing method: it gives
/// callers an atomic read-modify-write per key, which is what makes
/// concurrent `check_and_record` calls race-free.
pub trait Storage<K, V>: Send + Sync + Debug
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Access an entry with mutable access, creating it if necessary.
    ///
    /// The accessor runs while the entry's shard lock is held, so two
    /// concurrent calls for the same key are serialized.
    ///
    /// # Arguments
    /// * `key` - The key to look up
    /// * `factory` - Creates the value if the key doesn't exist yet
    /// * `accessor` - Receives mutable access to the value
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R;

    /// Check if a key is currently tracked.
    fn contains(&self, key: &K) -> bool;

    /// Remove a key. Returns true if an entry was removed.
    fn remove(&self, key: &K) -> bool;

    /// Get the number of entries in the storage.
    fn len(&self) -> usize;

    /// Check if the storage is empty.
    fn is_empty(&self) -> bool;

    /// Clear all entries from the storage.
    fn clear(&self);

    /// Iterate over all entries, providing access to both key and value.
    fn for_each<F>(&self, f: F)
    where
        F: FnMut(&K, &V);

    /// Remove entries for which the predicate returns false.
    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool;
}

/// Candidate entry for eviction consideration.
///
/// Carries the fields eviction decisions actually need, copied out of the
/// entry so no shard lock is held while a victim is selected.
#[derive(Debug, Clone)]
pub struct EvictionCandidate<K> {
    /// The key of the entry
    pub key: K,
    /// When the key last made an attempt
    pub last_seen: Instant,
    /// How many of its attempts have been rejected
    pub rejected: u64,
}

/// Port for eviction policy decisions.
///
/// The facade delegates to this when the tracked-key bound is reached, so
/// the strategy for what to forget (oldest key, least-abusive key) stays
/// pluggable. Infrastructure provides `LruEviction` and `PriorityEviction`.
pub trait EvictionPolicy<K>: Send + Sync + Debug
where
    K: Clone,
{
    /// Select a victim from the given candidates for eviction.
    ///
    /// # Returns
    /// The key of the entry to evict, or None if no eviction should occur.
    fn select_victim(&self, candidates: &[EvictionCandidate<K>]) -> Option<K>;

    /// Check if eviction should be triggered at the given entry count.
    fn should_evict(&self, current_entries: usize) -> bool;
}
