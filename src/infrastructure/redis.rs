//! Redis-backed attempt limiting.
//!
//! A single-process deployment keeps attempt state in the in-memory sharded
//! map. When registration is served by multiple processes, the state has to
//! live in a shared store instead; this adapter implements the same
//! fixed-window decision against Redis.
//!
//! ## Architecture
//!
//! Fixed windows map directly onto Redis primitives:
//! - `INCR` on a per-key counter records the attempt atomically
//! - `PEXPIRE`, armed when the counter is created, anchors the window at the
//!   first attempt
//! - `PTTL` supplies `retry_after` for rejected attempts
//!
//! The counter keeps incrementing on rejected attempts, but the decision caps
//! at `max_attempts` and the TTL is never re-armed, so rejections do not
//! extend the window.
//!
//! This adapter deliberately does not implement the in-process `Storage`
//! port: the port's closure-based read-modify-write cannot be made atomic
//! across a network round-trip, while `INCR` is atomic on the server.
//!
//! ## Error handling
//!
//! Unlike the in-memory limiter, every decision involves I/O, so
//! [`check_and_record`](RedisAttemptStore::check_and_record) returns a
//! `Result`. How to treat a Redis outage (fail open or fail closed) is a
//! deployment decision that belongs to the caller.
//!
//! ## Example
//!
//! ```rust,ignore
//! use signup_throttle::{ClientKey, RedisAttemptStore, RedisThrottleConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RedisThrottleConfig::new(3, Duration::from_secs(60))
//!         .expect("valid limits");
//!
//!     let store = RedisAttemptStore::connect_with_config("redis://127.0.0.1/", config)
//!         .await
//!         .expect("Failed to connect to Redis");
//!
//!     let ip = ClientKey::new("203.0.113.7").unwrap();
//!     match store.check_and_record(&ip).await {
//!         Ok(decision) if decision.is_allowed() => { /* create the account */ }
//!         Ok(_) => { /* respond 429 */ }
//!         Err(e) => { /* Redis unavailable; pick a failure mode */ }
//!     }
//! }
//! ```

use crate::domain::key::ClientKey;
use crate::domain::policy::{AttemptDecision, PolicyError};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Configuration for Redis-backed limiting.
#[derive(Debug, Clone)]
pub struct RedisThrottleConfig {
    max_attempts: u32,
    window: Duration,
    key_prefix: String,
}

impl RedisThrottleConfig {
    /// Create a config with the given limits and the default key prefix.
    ///
    /// # Errors
    /// Returns `PolicyError` if `max_attempts` or `window` is zero.
    pub fn new(max_attempts: u32, window: Duration) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::ZeroMaxAttempts);
        }
        if window.is_zero() {
            return Err(PolicyError::ZeroWindow);
        }
        Ok(Self {
            max_attempts,
            window,
            key_prefix: "signup-throttle:".to_string(),
        })
    }

    /// Set the prefix prepended to every Redis key.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Maximum attempts allowed per window.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for RedisThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(15 * 60),
            key_prefix: "signup-throttle:".to_string(),
        }
    }
}

/// Redis-backed fixed-window limiter for multi-process deployments.
///
/// All processes sharing the same Redis instance and key prefix enforce one
/// combined quota per client key. Cloning is cheap; clones share the
/// underlying connection manager.
#[derive(Clone)]
pub struct RedisAttemptStore {
    connection: ConnectionManager,
    config: RedisThrottleConfig,
}

impl fmt::Debug for RedisAttemptStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisAttemptStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RedisAttemptStore {
    /// Connect to Redis with the default configuration.
    ///
    /// # Arguments
    /// * `url` - Redis connection URL (e.g., "redis://127.0.0.1/")
    ///
    /// # Errors
    /// Returns error if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, RedisError> {
        Self::connect_with_config(url, RedisThrottleConfig::default()).await
    }

    /// Connect to Redis with a custom configuration.
    ///
    /// # Errors
    /// Returns error if the connection fails.
    pub async fn connect_with_config(
        url: &str,
        config: RedisThrottleConfig,
    ) -> Result<Self, RedisError> {
        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self { connection, config })
    }

    /// Get the Redis key for a client key.
    fn redis_key(&self, key: &ClientKey) -> String {
        format!("{}{}", self.config.key_prefix, key)
    }

    /// Record an attempt for a key and decide whether to allow it.
    ///
    /// # Errors
    /// Returns the underlying `RedisError` if any command fails. No state is
    /// rolled back on partial failure; the worst case is one uncounted
    /// attempt.
    pub async fn check_and_record(&self, key: &ClientKey) -> Result<AttemptDecision, RedisError> {
        let redis_key = self.redis_key(key);
        let mut conn = self.connection.clone();

        let count: u64 = conn.incr(&redis_key, 1u32).await?;

        if count == 1 {
            // First attempt creates the counter; the TTL anchors the window
            let _: () = conn
                .pexpire(&redis_key, self.config.window.as_millis() as i64)
                .await?;
            return Ok(AttemptDecision::Allowed {
                remaining: self.config.max_attempts - 1,
            });
        }

        if count <= u64::from(self.config.max_attempts) {
            return Ok(AttemptDecision::Allowed {
                remaining: self.config.max_attempts - count as u32,
            });
        }

        let ttl_ms: i64 = conn.pttl(&redis_key).await?;
        let retry_after = match ttl_ms {
            ms if ms >= 0 => Duration::from_millis(ms as u64),
            // -1: counter exists without TTL, meaning a previous process
            // died between INCR and PEXPIRE. Re-arm so the key recovers.
            -1 => {
                warn!(client = %key, "attempt counter had no TTL; re-arming window");
                let _: () = conn
                    .pexpire(&redis_key, self.config.window.as_millis() as i64)
                    .await?;
                self.config.window
            }
            // -2: the key expired between INCR and PTTL; window just ended
            _ => Duration::ZERO,
        };

        Ok(AttemptDecision::Rejected { retry_after })
    }

    /// Forget a key's attempts, restoring its full quota.
    ///
    /// # Errors
    /// Returns the underlying `RedisError` if the delete fails.
    pub async fn reset(&self, key: &ClientKey) -> Result<(), RedisError> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(self.redis_key(key)).await?;
        Ok(())
    }

    /// Get the configuration.
    pub fn config(&self) -> &RedisThrottleConfig {
        &self.config
    }
}
