//! Central registry for per-client attempt state.
//!
//! The registry maintains one entry per client key: the key's policy state
//! (window bookkeeping) and its rejection counter.

use crate::application::ports::{Clock, Storage};
use crate::domain::{
    key::ClientKey,
    policy::{Policy, RateLimitPolicy},
    rejection::RejectionCounter,
};
use std::sync::Arc;
use std::time::Instant;

/// State tracked for each client key.
#[derive(Debug)]
pub struct AttemptState {
    /// Policy state for this key (window anchor and attempt count)
    pub policy: Policy,
    /// Counter tracking rejected attempts
    pub rejections: RejectionCounter,
    /// When this key last made an attempt; drives LRU eviction
    pub last_seen: Instant,
}

impl AttemptState {
    /// Create new state for a key first seen at `now`.
    pub fn new(policy: Policy, now: Instant) -> Self {
        Self {
            policy,
            rejections: RejectionCounter::new(),
            last_seen: now,
        }
    }
}

/// Registry managing attempt state for all client keys.
///
/// Owns the storage, the clock, and the policy template. This is the
/// explicitly injected component the registration handler's limiter is built
/// around — there is no module-level state anywhere in the crate.
///
/// Generic over the storage implementation; in production use
/// `Arc<ShardedStorage>`.
#[derive(Clone)]
pub struct AttemptRegistry<S>
where
    S: Storage<ClientKey, AttemptState> + Clone,
{
    storage: S,
    clock: Arc<dyn Clock>,
    default_policy: Policy,
}

impl<S> AttemptRegistry<S>
where
    S: Storage<ClientKey, AttemptState> + Clone,
{
    /// Create a new registry with storage, clock, and the policy template.
    ///
    /// Every new key gets a fresh clone of `default_policy`.
    pub fn new(storage: S, clock: Arc<dyn Clock>, default_policy: Policy) -> Self {
        Self {
            storage,
            clock,
            default_policy,
        }
    }

    /// Access or create attempt state for a key with a callback.
    ///
    /// The callback receives the state and the current timestamp, and runs
    /// under the entry's lock: the whole read-modify-write is atomic with
    /// respect to other calls for the same key. `last_seen` is refreshed
    /// before the callback runs.
    pub fn with_attempt_state<F, R>(&self, key: ClientKey, f: F) -> R
    where
        F: FnOnce(&mut AttemptState, Instant) -> R,
    {
        let now = self.clock.now();
        let default_policy = self.default_policy.clone();
        self.storage.with_entry_mut(
            key,
            || AttemptState::new(default_policy, now),
            |state| {
                state.last_seen = now;
                f(state, now)
            },
        )
    }

    /// Current timestamp from the injected clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Get the policy template used for new keys.
    pub fn default_policy(&self) -> &Policy {
        &self.default_policy
    }

    /// Check if a key is currently tracked.
    pub fn contains(&self, key: &ClientKey) -> bool {
        self.storage.contains(key)
    }

    /// Drop a key's state. Returns true if an entry existed.
    pub fn remove(&self, key: &ClientKey) -> bool {
        self.storage.remove(key)
    }

    /// Get the number of tracked keys.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Clear all tracked state.
    pub fn clear(&self) {
        self.storage.clear();
    }

    /// Iterate over all attempt states with a callback.
    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&ClientKey, &AttemptState),
    {
        self.storage.for_each(f);
    }

    /// Remove entries for which the predicate returns false.
    pub fn cleanup<F>(&self, f: F)
    where
        F: FnMut(&ClientKey, &mut AttemptState) -> bool,
    {
        self.storage.retain(f);
    }

    /// Drop every entry whose window has fully elapsed.
    ///
    /// Returns how many entries were removed. This is the "periodic sweep"
    /// half of cleanup; the policies already expire windows lazily on access.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.storage.len();
        self.storage
            .retain(|_, state| !state.policy.window_expired(now));
        before.saturating_sub(self.storage.len())
    }
}
