//! Observability metrics for the registration limiter.
//!
//! Provides counters about limiter behavior for monitoring and debugging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking limiter statistics.
///
/// All counters use atomic operations for thread-safe updates and reads.
/// Clones share the same underlying counters.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    /// Total attempts allowed through
    attempts_allowed: AtomicU64,
    /// Total attempts rejected
    attempts_rejected: AtomicU64,
    /// Keys evicted to stay under the tracked-key bound
    keys_evicted: AtomicU64,
    /// Keys dropped by the sweeper after their window elapsed
    keys_expired: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an allowed attempt.
    pub(crate) fn record_allowed(&self) {
        self.inner.attempts_allowed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected attempt.
    pub(crate) fn record_rejected(&self) {
        self.inner.attempts_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a capacity eviction.
    pub(crate) fn record_eviction(&self) {
        self.inner.keys_evicted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record keys dropped by a sweep.
    pub(crate) fn record_expired(&self, count: u64) {
        self.inner.keys_expired.fetch_add(count, Ordering::Relaxed);
    }

    /// Get the total number of attempts allowed.
    pub fn attempts_allowed(&self) -> u64 {
        self.inner.attempts_allowed.load(Ordering::Relaxed)
    }

    /// Get the total number of attempts rejected.
    pub fn attempts_rejected(&self) -> u64 {
        self.inner.attempts_rejected.load(Ordering::Relaxed)
    }

    /// Get the total number of keys evicted for capacity.
    pub fn keys_evicted(&self) -> u64 {
        self.inner.keys_evicted.load(Ordering::Relaxed)
    }

    /// Get the total number of keys dropped by sweeps.
    pub fn keys_expired(&self) -> u64 {
        self.inner.keys_expired.load(Ordering::Relaxed)
    }

    /// Get a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            attempts_allowed: self.attempts_allowed(),
            attempts_rejected: self.attempts_rejected(),
            keys_evicted: self.keys_evicted(),
            keys_expired: self.keys_expired(),
        }
    }

    /// Reset all counters to zero.
    ///
    /// Useful for testing or when starting a new monitoring period.
    pub fn reset(&self) {
        self.inner.attempts_allowed.store(0, Ordering::Relaxed);
        self.inner.attempts_rejected.store(0, Ordering::Relaxed);
        self.inner.keys_evicted.store(0, Ordering::Relaxed);
        self.inner.keys_expired.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of limiter metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total attempts allowed through
    pub attempts_allowed: u64,
    /// Total attempts rejected
    pub attempts_rejected: u64,
    /// Keys evicted to stay under the tracked-key bound
    pub keys_evicted: u64,
    /// Keys dropped by the sweeper
    pub keys_expired: u64,
}

impl MetricsSnapshot {
    /// Total attempts processed (allowed + rejected).
    pub fn total_attempts(&self) -> u64 {
        self.attempts_allowed.saturating_add(self.attempts_rejected)
    }

    /// Ratio of rejected attempts to total attempts (0.0 to 1.0).
    ///
    /// Returns 0.0 if no attempts have been processed.
    pub fn rejection_rate(&self) -> f64 {
        let total = self.total_attempts();
        if total == 0 {
            0.0
        } else {
            self.attempts_rejected as f64 / total as f64
        }
    }
}
