//! Assembled registration throttle.
//!
//! Wires storage, clock, policy, metrics, eviction and the sweeper into a
//! single component the registration handler can hold. Configuration happens
//! through the builder; invalid configurations fail at build time.

use crate::application::{
    limiter::RegistrationLimiter,
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, EvictionCandidate, EvictionPolicy},
    registry::{AttemptRegistry, AttemptState},
    sweeper::{SweeperConfig, SweeperConfigError, WindowSweeper},
};
use crate::domain::{
    key::ClientKey,
    policy::{AttemptDecision, Policy},
    rejection::RejectionSummary,
};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::eviction::{LruEviction, PriorityEviction, PriorityFn};
use crate::infrastructure::storage::ShardedStorage;

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Storage shape the assembled throttle runs on.
type Store = Arc<ShardedStorage<ClientKey, AttemptState>>;

/// Error returned when building a `RegistrationThrottle` fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// `max_keys` must be greater than zero
    ZeroMaxKeys,
    /// Sweeper configuration validation failed
    Sweeper(SweeperConfigError),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::ZeroMaxKeys => write!(f, "max_keys must be greater than 0"),
            BuildError::Sweeper(e) => write!(f, "sweeper configuration error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {}

impl From<SweeperConfigError> for BuildError {
    fn from(e: SweeperConfigError) -> Self {
        BuildError::Sweeper(e)
    }
}

/// Eviction strategy configuration for the throttle.
///
/// This enum provides a user-friendly API that internally creates the
/// appropriate `EvictionPolicy` adapter.
#[derive(Clone)]
pub enum EvictionStrategy {
    /// LRU eviction with a key count limit.
    Lru {
        /// Maximum number of tracked keys
        max_keys: usize,
    },
    /// Priority-based eviction using a custom scoring function.
    ///
    /// # Example: keep heavily-rejected keys longest
    ///
    /// ```
    /// use signup_throttle::{EvictionStrategy, RegistrationThrottle};
    /// use std::sync::Arc;
    ///
    /// let throttle = RegistrationThrottle::builder()
    ///     .with_eviction_strategy(EvictionStrategy::Priority {
    ///         max_keys: 5_000,
    ///         priority_fn: Arc::new(|candidate| candidate.rejected.min(100) as u32),
    ///     })
    ///     .build()
    ///     .unwrap();
    /// # let _ = throttle;
    /// ```
    Priority {
        /// Maximum number of tracked keys
        max_keys: usize,
        /// Scores candidates; lowest score is evicted first
        priority_fn: PriorityFn<ClientKey>,
    },
}

impl std::fmt::Debug for EvictionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvictionStrategy::Lru { max_keys } => f
                .debug_struct("Lru")
                .field("max_keys", max_keys)
                .finish(),
            EvictionStrategy::Priority {
                max_keys,
                priority_fn: _,
            } => f
                .debug_struct("Priority")
                .field("max_keys", max_keys)
                .field("priority_fn", &"<fn>")
                .finish(),
        }
    }
}

/// Builder for constructing a `RegistrationThrottle`.
pub struct RegistrationThrottleBuilder {
    policy: Policy,
    clock: Option<Arc<dyn Clock>>,
    max_keys: Option<usize>,
    eviction_strategy: Option<EvictionStrategy>,
    sweep_interval: Duration,
}

impl RegistrationThrottleBuilder {
    /// Set the rate limiting policy applied to each client key.
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the maximum number of tracked client keys.
    ///
    /// When the limit is reached, the least recently seen key is evicted
    /// (unless a custom eviction strategy is configured). The limit is
    /// validated when `build()` is called.
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = Some(max_keys);
        self
    }

    /// Track keys without bound.
    ///
    /// Every distinct client key stays in memory until its window elapses
    /// and the sweeper drops it. Only suitable when the key space is known
    /// to be small.
    pub fn with_unlimited_keys(mut self) -> Self {
        self.max_keys = None;
        self.eviction_strategy = None;
        self
    }

    /// Set a custom eviction strategy for tracked keys.
    ///
    /// If not set, LRU eviction with the configured `max_keys` limit is used.
    pub fn with_eviction_strategy(mut self, strategy: EvictionStrategy) -> Self {
        self.eviction_strategy = Some(strategy);
        self
    }

    /// Set how often the background sweeper reclaims expired entries.
    ///
    /// The interval is validated when `build()` is called.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Build the throttle.
    ///
    /// # Errors
    /// Returns `BuildError` if `max_keys` is zero or the sweep interval is
    /// zero.
    pub fn build(self) -> Result<RegistrationThrottle, BuildError> {
        if let Some(0) = self.max_keys {
            return Err(BuildError::ZeroMaxKeys);
        }

        let eviction: Option<Arc<dyn EvictionPolicy<ClientKey>>> = match self.eviction_strategy {
            Some(EvictionStrategy::Lru { max_keys }) => {
                if max_keys == 0 {
                    return Err(BuildError::ZeroMaxKeys);
                }
                Some(Arc::new(LruEviction::new(max_keys)))
            }
            Some(EvictionStrategy::Priority {
                max_keys,
                priority_fn,
            }) => {
                if max_keys == 0 {
                    return Err(BuildError::ZeroMaxKeys);
                }
                Some(Arc::new(PriorityEviction::new(max_keys, priority_fn)))
            }
            None => self
                .max_keys
                .map(|max| Arc::new(LruEviction::new(max)) as Arc<dyn EvictionPolicy<ClientKey>>),
        };

        let sweeper_config = SweeperConfig::new(self.sweep_interval)?;

        let storage: Store = Arc::new(ShardedStorage::new());
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()) as Arc<dyn Clock>);
        let registry = AttemptRegistry::new(storage, clock, self.policy);
        let metrics = Metrics::new();
        let limiter = RegistrationLimiter::new(registry.clone(), metrics.clone());
        let sweeper = WindowSweeper::new(registry, metrics, sweeper_config);

        Ok(RegistrationThrottle {
            limiter,
            eviction,
            sweeper,
        })
    }
}

/// Per-client registration throttle with bounded in-memory state.
///
/// The registration handler calls [`check_and_record`] with the caller's
/// key (typically the remote IP) before creating an account; a `Rejected`
/// decision maps to a "too many requests" response.
///
/// Cloning is cheap and clones share all state, so one throttle can be
/// handed to every request handler task.
///
/// [`check_and_record`]: RegistrationThrottle::check_and_record
///
/// # Example
///
/// ```
/// use signup_throttle::{ClientKey, Policy, RegistrationThrottle};
/// use std::time::Duration;
///
/// let throttle = RegistrationThrottle::builder()
///     .with_policy(Policy::fixed_window(3, Duration::from_secs(60)).unwrap())
///     .build()
///     .unwrap();
///
/// let ip = ClientKey::new("203.0.113.7").unwrap();
/// assert!(throttle.check_and_record(&ip).is_allowed());
/// ```
#[derive(Clone)]
pub struct RegistrationThrottle {
    limiter: RegistrationLimiter<Store>,
    eviction: Option<Arc<dyn EvictionPolicy<ClientKey>>>,
    sweeper: WindowSweeper<Store>,
}

impl std::fmt::Debug for RegistrationThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationThrottle")
            .field("has_eviction", &self.eviction.is_some())
            .finish_non_exhaustive()
    }
}

impl RegistrationThrottle {
    /// Default maximum attempts per window.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
    /// Default window length.
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);
    /// Default bound on tracked keys.
    pub const DEFAULT_MAX_KEYS: usize = 10_000;
    /// Default sweep interval.
    pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

    /// Create a throttle with default settings: a fixed window of 5 attempts
    /// per 15 minutes, up to 10,000 tracked keys with LRU eviction, and a
    /// 60-second sweep interval.
    pub fn new() -> Self {
        Self::builder()
            .build()
            .unwrap_or_else(|e| unreachable!("default configuration is valid: {}", e))
    }

    /// Create a builder for custom configuration.
    pub fn builder() -> RegistrationThrottleBuilder {
        RegistrationThrottleBuilder {
            policy: Policy::fixed_window(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_WINDOW)
                .unwrap_or_else(|e| unreachable!("default policy is valid: {}", e)),
            clock: None,
            max_keys: Some(Self::DEFAULT_MAX_KEYS),
            eviction_strategy: None,
            sweep_interval: Self::DEFAULT_SWEEP_INTERVAL,
        }
    }

    /// Record an attempt for a key and decide whether to allow it.
    ///
    /// See [`RegistrationLimiter::check_and_record`] for the atomicity
    /// guarantees; on top of those, this enforces the tracked-key bound by
    /// evicting a victim before a new key would exceed it.
    pub fn check_and_record(&self, key: &ClientKey) -> AttemptDecision {
        self.evict_if_full(key);
        self.limiter.check_and_record(key)
    }

    /// Evict one entry if admitting `incoming` would exceed the key bound.
    ///
    /// The len/insert pair is not atomic, so a concurrent burst of brand-new
    /// keys can overshoot the bound by a few entries; the next call brings it
    /// back down. Eviction never touches the incoming key's own entry.
    fn evict_if_full(&self, incoming: &ClientKey) {
        let Some(eviction) = &self.eviction else {
            return;
        };

        let registry = self.limiter.registry();
        if !eviction.should_evict(registry.len()) || registry.contains(incoming) {
            return;
        }

        let mut candidates = Vec::with_capacity(registry.len());
        registry.for_each(|key, state| {
            candidates.push(EvictionCandidate {
                key: key.clone(),
                last_seen: state.last_seen,
                rejected: state.rejections.count(),
            });
        });

        if let Some(victim) = eviction.select_victim(&candidates) {
            if registry.remove(&victim) {
                self.limiter.metrics().record_eviction();
                debug!(client = %victim, "evicted key to stay under tracked-key bound");
            }
        }
    }

    /// Sweep expired entries immediately.
    ///
    /// Returns how many entries were removed. Useful in deployments that
    /// prefer explicit cleanup over the background task.
    pub fn sweep_expired(&self) -> usize {
        self.sweeper.sweep_once()
    }

    /// Spawn the background sweeper task.
    ///
    /// Sweeps at the configured interval until the returned handle is
    /// aborted.
    #[cfg(feature = "async")]
    pub fn start_sweeper(&self) -> tokio::task::JoinHandle<()> {
        self.sweeper.clone().start()
    }

    /// Rejection summaries for currently tracked keys with at least
    /// `min_rejections` rejected attempts.
    pub fn rejection_summaries(&self, min_rejections: u64) -> Vec<RejectionSummary> {
        self.sweeper.collect_summaries(min_rejections)
    }

    /// Number of client keys currently tracked.
    pub fn key_count(&self) -> usize {
        self.limiter.registry().len()
    }

    /// Get a reference to the limiter metrics.
    pub fn metrics(&self) -> &Metrics {
        self.limiter.metrics()
    }

    /// Get a point-in-time snapshot of the limiter metrics.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.limiter.metrics().snapshot()
    }
}

impl Default for RegistrationThrottle {
    fn default() -> Self {
        Self::new()
    }
}
