//! # signup-throttle
//!
//! Per-client registration attempt limiting for web backends.
//!
//! This crate tracks registration attempts per client key (typically the
//! caller's IP address) against a configurable time window and rejects
//! attempts once a threshold is exceeded. It is the component a registration
//! handler consults before creating an account; a rejection maps to a
//! client-facing "too many requests" response, not an error.
//!
//! ## Quick Start
//!
//! ```rust
//! use signup_throttle::{AttemptDecision, ClientKey, Policy, RegistrationThrottle};
//! use std::time::Duration;
//!
//! // 3 attempts per minute per client, up to 10k tracked keys (LRU-evicted)
//! let throttle = RegistrationThrottle::builder()
//!     .with_policy(Policy::fixed_window(3, Duration::from_secs(60)).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let ip = ClientKey::new("203.0.113.7").unwrap();
//! match throttle.check_and_record(&ip) {
//!     AttemptDecision::Allowed { remaining } => {
//!         // proceed with registration; `remaining` fits an
//!         // X-RateLimit-Remaining header
//!         let _ = remaining;
//!     }
//!     AttemptDecision::Rejected { retry_after } => {
//!         // respond 429 Too Many Requests; `retry_after` fits a
//!         // Retry-After header
//!         let _ = retry_after;
//!     }
//! }
//! ```
//!
//! `RegistrationThrottle` is `Clone` and all clones share state, so a single
//! instance can be handed to every request handler task. There is no
//! module-level state anywhere: the map, clock and policy are owned by the
//! throttle you construct, which is what makes isolated tests and
//! multi-instance deployments possible.
//!
//! ## Policies
//!
//! - **Fixed window** (default): the window is anchored at a key's first
//!   attempt; when it elapses the count resets in one step. Cheapest state
//!   (a counter and a timestamp per key).
//! - **Sliding window**: one timestamp per allowed attempt; allowance
//!   recovers gradually as attempts age out instead of all at once.
//!
//! ```rust
//! use signup_throttle::Policy;
//! use std::time::Duration;
//!
//! let fixed = Policy::fixed_window(5, Duration::from_secs(900)).unwrap();
//! let sliding = Policy::sliding_window(5, Duration::from_secs(900)).unwrap();
//! # let _ = (fixed, sliding);
//! ```
//!
//! Zero attempts or a zero window are configuration mistakes and fail at
//! construction with a [`PolicyError`].
//!
//! ## Concurrency
//!
//! The per-key read-modify-write runs under a sharded map's entry lock, so
//! two concurrent attempts from the same client cannot both observe a count
//! below the threshold and both be allowed. Distinct keys land on different
//! shards and proceed without contention. The whole operation is synchronous
//! and non-blocking; no `async` is required on the request path.
//!
//! ## Memory
//!
//! A public signup endpoint sees an unbounded stream of client keys, so the
//! attempt map is bounded (default 10,000 keys) and evicts least-recently
//! seen keys when full. Evicting a key forgets its window, so size the bound
//! well above the number of clients active within one window — or use
//! priority eviction to keep actively-rejected keys tracked longest:
//!
//! ```rust
//! use signup_throttle::{EvictionStrategy, RegistrationThrottle};
//! use std::sync::Arc;
//!
//! let throttle = RegistrationThrottle::builder()
//!     .with_eviction_strategy(EvictionStrategy::Priority {
//!         max_keys: 50_000,
//!         priority_fn: Arc::new(|candidate| candidate.rejected.min(100) as u32),
//!     })
//!     .build()
//!     .unwrap();
//! # let _ = throttle;
//! ```
//!
//! Keys whose window has fully elapsed are dead weight; reclaim them either
//! by calling [`RegistrationThrottle::sweep_expired`] from your own
//! maintenance path, or by spawning the background sweeper (requires the
//! `async` feature):
//!
//! ```rust,ignore
//! let handle = throttle.start_sweeper(); // tokio task, sweeps every 60s
//! ```
//!
//! ## Observability
//!
//! Counters for allowed/rejected attempts and evicted/expired keys are
//! available at any time:
//!
//! ```rust
//! # use signup_throttle::RegistrationThrottle;
//! # let throttle = RegistrationThrottle::new();
//! let snapshot = throttle.metrics_snapshot();
//! println!("allowed:  {}", snapshot.attempts_allowed);
//! println!("rejected: {}", snapshot.attempts_rejected);
//! println!("rejection rate: {:.2}%", snapshot.rejection_rate() * 100.0);
//! ```
//!
//! Per-key rejection history is tracked too; `rejection_summaries(min)`
//! returns which clients are hitting the limit and for how long. The sweeper
//! logs a summary (via `tracing`) whenever it drops a key that had attempts
//! rejected.
//!
//! ## Testing with a controlled clock
//!
//! Time is injected through the [`Clock`] port, so tests advance it
//! explicitly instead of sleeping. Enable the `test-helpers` feature to use
//! [`MockClock`](infrastructure::mocks::MockClock) from integration tests:
//!
//! ```rust
//! use signup_throttle::infrastructure::mocks::MockClock;
//! use signup_throttle::{ClientKey, Policy, RegistrationThrottle};
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//!
//! let clock = Arc::new(MockClock::new(Instant::now()));
//! let throttle = RegistrationThrottle::builder()
//!     .with_policy(Policy::fixed_window(3, Duration::from_secs(60)).unwrap())
//!     .with_clock(clock.clone())
//!     .build()
//!     .unwrap();
//!
//! let ip = ClientKey::new("203.0.113.7").unwrap();
//! for _ in 0..3 {
//!     assert!(throttle.check_and_record(&ip).is_allowed());
//! }
//! assert!(throttle.check_and_record(&ip).is_rejected());
//!
//! clock.advance(Duration::from_secs(61));
//! assert!(throttle.check_and_record(&ip).is_allowed());
//! ```
//!
//! ## Multi-process deployments
//!
//! The in-memory map is per-process; restarts forget all attempt state,
//! which is acceptable for registration limiting. When several processes
//! must share one quota, use the Redis-backed store (requires the
//! `redis-storage` feature):
//!
//! ```rust,ignore
//! use signup_throttle::{ClientKey, RedisAttemptStore, RedisThrottleConfig};
//! use std::time::Duration;
//!
//! let config = RedisThrottleConfig::new(3, Duration::from_secs(60)).unwrap();
//! let store = RedisAttemptStore::connect_with_config("redis://127.0.0.1/", config).await?;
//!
//! let ip = ClientKey::new("203.0.113.7").unwrap();
//! let decision = store.check_and_record(&ip).await?;
//! ```

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    key::{ClientKey, KeyError},
    policy::{
        AttemptDecision, FixedWindowPolicy, Policy, PolicyError, RateLimitPolicy,
        SlidingWindowPolicy,
    },
    rejection::{RejectionCounter, RejectionSummary},
};

pub use application::{
    limiter::RegistrationLimiter,
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, EvictionCandidate, EvictionPolicy, Storage},
    registry::{AttemptRegistry, AttemptState},
    sweeper::{SweeperConfig, SweeperConfigError, WindowSweeper},
};

pub use infrastructure::{
    clock::SystemClock,
    eviction::{LruEviction, PriorityEviction, PriorityFn},
    storage::ShardedStorage,
    throttle::{
        BuildError, EvictionStrategy, RegistrationThrottle, RegistrationThrottleBuilder,
    },
};

#[cfg(feature = "redis-storage")]
pub use infrastructure::redis::{RedisAttemptStore, RedisThrottleConfig};
