//! Rejection counters and summaries.
//!
//! Tracks how many attempts a client key has had rejected, so operators can
//! see which clients are hitting the limit and for how long.

use crate::domain::key::ClientKey;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Thread-safe counter for rejected attempts on a single client key.
///
/// Uses atomics for lock-free updates; the entry lock held during the
/// allow/reject decision is released before summaries are read.
#[derive(Debug, Default)]
pub struct RejectionCounter {
    /// Total rejected attempts since the entry was created
    rejected_count: AtomicU64,
    /// Timestamp of the first rejection (nanoseconds, see `instant_to_nanos`)
    first_rejected_nanos: AtomicU64,
    /// Timestamp of the most recent rejection
    last_rejected_nanos: AtomicU64,
}

impl RejectionCounter {
    /// Create a counter with no rejections recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rejected attempt.
    pub fn record_rejection(&self, now: Instant) {
        let nanos = Self::instant_to_nanos(now);
        let previous = self.rejected_count.fetch_add(1, Ordering::Relaxed);
        if previous == 0 {
            self.first_rejected_nanos.store(nanos, Ordering::Relaxed);
        }
        self.last_rejected_nanos.store(nanos, Ordering::Relaxed);
    }

    /// Get the current rejection count.
    pub fn count(&self) -> u64 {
        self.rejected_count.load(Ordering::Relaxed)
    }

    /// Get the timestamp of the first rejection, if any.
    pub fn first_rejected(&self) -> Option<Instant> {
        if self.count() == 0 {
            return None;
        }
        let nanos = self.first_rejected_nanos.load(Ordering::Relaxed);
        Some(Self::nanos_to_instant(nanos))
    }

    /// Get the timestamp of the most recent rejection, if any.
    pub fn last_rejected(&self) -> Option<Instant> {
        if self.count() == 0 {
            return None;
        }
        let nanos = self.last_rejected_nanos.load(Ordering::Relaxed);
        Some(Self::nanos_to_instant(nanos))
    }

    /// Reset the counter for a new tracking period.
    pub fn reset(&self) {
        self.rejected_count.store(0, Ordering::Relaxed);
        self.first_rejected_nanos.store(0, Ordering::Relaxed);
        self.last_rejected_nanos.store(0, Ordering::Relaxed);
    }

    /// Convert an `Instant` to nanoseconds for atomic storage.
    ///
    /// Stored relative to a process-wide base instant so the value fits a u64.
    fn instant_to_nanos(instant: Instant) -> u64 {
        static BASE: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
        let base = BASE.get_or_init(Instant::now);

        instant
            .saturating_duration_since(*base)
            .as_nanos()
            .try_into()
            .unwrap_or(u64::MAX)
    }

    /// Convert stored nanoseconds back to an `Instant`.
    fn nanos_to_instant(nanos: u64) -> Instant {
        static BASE: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
        let base = BASE.get_or_init(Instant::now);

        *base + Duration::from_nanos(nanos)
    }
}

/// A rollup of rejection activity for one client key.
///
/// Produced by the sweeper when it drops an expired entry, and available on
/// demand for operator tooling.
#[derive(Debug, Clone)]
pub struct RejectionSummary {
    /// The client key that was rejected
    pub key: ClientKey,
    /// Number of rejected attempts
    pub count: u64,
    /// When the first rejection occurred
    pub first_rejected: Instant,
    /// When the most recent rejection occurred
    pub last_rejected: Instant,
    /// Span between first and last rejection
    pub duration: Duration,
}

impl RejectionSummary {
    /// Build a summary from a counter.
    ///
    /// Returns `None` if the key never had an attempt rejected.
    pub fn from_counter(key: ClientKey, counter: &RejectionCounter) -> Option<Self> {
        let count = counter.count();
        let first = counter.first_rejected()?;
        let last = counter.last_rejected()?;
        let duration = last.saturating_duration_since(first);

        Some(Self {
            key,
            count,
            first_rejected: first,
            last_rejected: last,
            duration,
        })
    }

    /// Format the summary as a human-readable message.
    pub fn format_message(&self) -> String {
        format!(
            "client {} had {} attempts rejected over {:?}",
            self.key, self.count, self.duration
        )
    }
}
