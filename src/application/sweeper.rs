//! Periodic sweeping of expired attempt windows.
//!
//! The policies expire windows lazily on access, but a key that stops making
//! attempts would otherwise stay in storage forever. The sweeper reclaims
//! that memory and logs a rejection summary for any abuser it drops.

use crate::application::metrics::Metrics;
use crate::application::ports::Storage;
use crate::application::registry::{AttemptRegistry, AttemptState};
use crate::domain::key::ClientKey;
use crate::domain::policy::RateLimitPolicy;
use crate::domain::rejection::RejectionSummary;
use std::time::Duration;
use tracing::debug;

#[cfg(feature = "async")]
use tokio::time::interval;

/// Error returned when sweeper configuration validation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweeperConfigError {
    /// Sweep interval must be greater than zero
    ZeroInterval,
}

impl std::fmt::Display for SweeperConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweeperConfigError::ZeroInterval => {
                write!(f, "sweep interval must be greater than 0")
            }
        }
    }
}

impl std::error::Error for SweeperConfigError {}

/// Configuration for the window sweeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweeperConfig {
    /// How often to sweep
    pub interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

impl SweeperConfig {
    /// Create a sweeper config with the specified interval.
    ///
    /// # Errors
    /// Returns `SweeperConfigError::ZeroInterval` if `interval` is zero.
    pub fn new(interval: Duration) -> Result<Self, SweeperConfigError> {
        if interval.is_zero() {
            return Err(SweeperConfigError::ZeroInterval);
        }
        Ok(Self { interval })
    }
}

/// Sweeps expired attempt windows out of the registry.
#[derive(Clone)]
pub struct WindowSweeper<S>
where
    S: Storage<ClientKey, AttemptState> + Clone,
{
    registry: AttemptRegistry<S>,
    metrics: Metrics,
    config: SweeperConfig,
}

impl<S> WindowSweeper<S>
where
    S: Storage<ClientKey, AttemptState> + Clone,
{
    /// Create a new sweeper.
    pub fn new(registry: AttemptRegistry<S>, metrics: Metrics, config: SweeperConfig) -> Self {
        Self {
            registry,
            metrics,
            config,
        }
    }

    /// Sweep once, dropping every entry whose window has fully elapsed.
    ///
    /// Entries that accumulated rejections are logged before being dropped,
    /// so abuse episodes remain visible after the state is gone.
    ///
    /// Returns how many entries were removed.
    pub fn sweep_once(&self) -> usize {
        let now = self.registry.now();
        let mut removed = 0usize;

        self.registry.cleanup(|key, state| {
            if state.policy.window_expired(now) {
                if let Some(summary) = RejectionSummary::from_counter(key.clone(), &state.rejections)
                {
                    debug!(
                        client = %summary.key,
                        rejected = summary.count,
                        over = ?summary.duration,
                        "dropping expired key with rejection history"
                    );
                }
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            self.metrics.record_expired(removed as u64);
            debug!(removed, remaining = self.registry.len(), "window sweep");
        }

        removed
    }

    /// Collect rejection summaries for all currently tracked keys.
    ///
    /// Only keys with at least `min_rejections` rejected attempts are
    /// included. Useful for operator tooling and periodic reports.
    pub fn collect_summaries(&self, min_rejections: u64) -> Vec<RejectionSummary> {
        let mut summaries = Vec::new();

        self.registry.for_each(|key, state| {
            if state.rejections.count() >= min_rejections {
                if let Some(summary) = RejectionSummary::from_counter(key.clone(), &state.rejections)
                {
                    summaries.push(summary);
                }
            }
        });

        summaries
    }

    /// Start sweeping periodically on a background task.
    ///
    /// Spawns a `tokio` task that calls [`sweep_once`](Self::sweep_once) at
    /// the configured interval until the handle is aborted or dropped at
    /// shutdown.
    #[cfg(feature = "async")]
    pub fn start(self) -> tokio::task::JoinHandle<()>
    where
        S: 'static,
    {
        tokio::spawn(async move {
            let mut ticker = interval(self.config.interval);
            // First tick fires immediately; skip it so a fresh registry
            // isn't swept at startup.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                self.sweep_once();
            }
        })
    }

    /// Get the sweeper configuration.
    pub fn config(&self) -> &SweeperConfig {
        &self.config
    }

    /// Get a reference to the registry.
    pub fn registry(&self) -> &AttemptRegistry<S> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::policy::Policy;
    use crate::infrastructure::mocks::MockClock;
    use crate::infrastructure::storage::ShardedStorage;
    use std::sync::Arc;
    use std::time::Instant;

    fn key(raw: &str) -> ClientKey {
        ClientKey::new(raw).unwrap()
    }

    fn registry_with_clock(
        clock: Arc<MockClock>,
    ) -> AttemptRegistry<Arc<ShardedStorage<ClientKey, AttemptState>>> {
        let storage = Arc::new(ShardedStorage::new());
        let policy = Policy::fixed_window(2, Duration::from_secs(60)).unwrap();
        AttemptRegistry::new(storage, clock, policy)
    }

    #[test]
    fn test_sweep_empty_registry() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let sweeper = WindowSweeper::new(
            registry_with_clock(clock),
            Metrics::new(),
            SweeperConfig::default(),
        );

        assert_eq!(sweeper.sweep_once(), 0);
    }

    #[test]
    fn test_sweep_removes_expired_and_counts() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let registry = registry_with_clock(clock.clone());
        let metrics = Metrics::new();

        for i in 0..4 {
            registry.with_attempt_state(key(&format!("10.0.0.{}", i)), |state, now| {
                state.policy.register_attempt(now);
            });
        }

        let sweeper = WindowSweeper::new(registry, metrics.clone(), SweeperConfig::default());

        // Windows are 60s; nothing should go at +59s
        clock.advance(Duration::from_secs(59));
        assert_eq!(sweeper.sweep_once(), 0);

        clock.advance(Duration::from_secs(1));
        assert_eq!(sweeper.sweep_once(), 4);
        assert!(sweeper.registry().is_empty());
        assert_eq!(metrics.keys_expired(), 4);
    }

    #[test]
    fn test_collect_summaries_filters_by_min() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let registry = registry_with_clock(clock);
        let sweeper = WindowSweeper::new(registry, Metrics::new(), SweeperConfig::default());

        // "quiet" never gets rejected; "noisy" does, repeatedly
        sweeper
            .registry()
            .with_attempt_state(key("quiet"), |state, now| {
                state.policy.register_attempt(now);
            });
        sweeper
            .registry()
            .with_attempt_state(key("noisy"), |state, now| {
                for _ in 0..5 {
                    state.policy.register_attempt(now);
                }
                for _ in 0..3 {
                    state.rejections.record_rejection(now);
                }
            });

        let all = sweeper.collect_summaries(1);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].key, key("noisy"));
        assert_eq!(all[0].count, 3);

        assert!(sweeper.collect_summaries(4).is_empty());
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert_eq!(
            SweeperConfig::new(Duration::ZERO),
            Err(SweeperConfigError::ZeroInterval)
        );
        let config = SweeperConfig::new(Duration::from_secs(30)).unwrap();
        assert_eq!(config.interval, Duration::from_secs(30));
    }

    #[cfg(feature = "async")]
    #[tokio::test(flavor = "multi_thread")]
    async fn test_background_sweeping() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let registry = registry_with_clock(clock.clone());
        let metrics = Metrics::new();

        registry.with_attempt_state(key("10.1.1.1"), |state, now| {
            state.policy.register_attempt(now);
        });

        let sweeper = WindowSweeper::new(
            registry.clone(),
            metrics.clone(),
            SweeperConfig::new(Duration::from_millis(20)).unwrap(),
        );
        let handle = sweeper.start();

        // Let the window lapse on the mock clock, then wait for a few ticks
        clock.advance(Duration::from_secs(61));
        tokio::time::sleep(Duration::from_millis(100)).await;

        handle.abort();

        assert!(registry.is_empty());
        assert_eq!(metrics.keys_expired(), 1);
    }
}
