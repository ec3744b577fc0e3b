//! Rate limiting policies for registration attempts.
//!
//! This module defines the core trait for rate limiting policies and the two
//! built-in window implementations.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// Decision made by a rate limiting policy for a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptDecision {
    /// Allow the attempt to proceed
    Allowed {
        /// Attempts left in the current window after this one.
        /// Useful for an `X-RateLimit-Remaining` response header.
        remaining: u32,
    },
    /// Reject the attempt
    Rejected {
        /// How long the caller should wait before retrying.
        /// Useful for a `Retry-After` response header.
        retry_after: Duration,
    },
}

impl AttemptDecision {
    /// Check if this decision is an allowance.
    pub fn is_allowed(&self) -> bool {
        matches!(self, AttemptDecision::Allowed { .. })
    }

    /// Check if this decision is a rejection.
    pub fn is_rejected(&self) -> bool {
        matches!(self, AttemptDecision::Rejected { .. })
    }
}

/// Error returned when policy parameters fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyError {
    /// `max_attempts` must be greater than zero
    ZeroMaxAttempts,
    /// Window duration must be greater than zero
    ZeroWindow,
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::ZeroMaxAttempts => write!(f, "max_attempts must be greater than 0"),
            PolicyError::ZeroWindow => write!(f, "window duration must be greater than 0"),
        }
    }
}

impl std::error::Error for PolicyError {}

/// Trait for implementing rate limiting policies.
///
/// A policy instance holds the attempt history for a single client key and
/// decides whether each new attempt is allowed or rejected.
pub trait RateLimitPolicy: Send + Sync {
    /// Register a new attempt and decide whether to allow or reject it.
    ///
    /// # Arguments
    /// * `now` - When the attempt occurred
    fn register_attempt(&mut self, now: Instant) -> AttemptDecision;

    /// Check whether the tracked window has fully elapsed.
    ///
    /// An expired policy holds no live attempt history; its entry can be
    /// dropped from storage without changing any future decision.
    fn window_expired(&self, now: Instant) -> bool;

    /// Reset the policy state, forgetting all recorded attempts.
    fn reset(&mut self);
}

/// Fixed-window rate limiting policy.
///
/// Counts attempts against a window anchored at the first attempt. Once the
/// window elapses, the next attempt starts a fresh window with count = 1.
/// Rejected attempts do not increment the count, so the recorded count never
/// exceeds `max_attempts` within a window.
///
/// # Example
/// ```
/// use signup_throttle::{FixedWindowPolicy, RateLimitPolicy};
/// use std::time::{Duration, Instant};
///
/// let mut policy = FixedWindowPolicy::new(3, Duration::from_secs(60)).unwrap();
/// let t0 = Instant::now();
///
/// // First 3 attempts allowed
/// assert!(policy.register_attempt(t0).is_allowed());
/// assert!(policy.register_attempt(t0 + Duration::from_secs(1)).is_allowed());
/// assert!(policy.register_attempt(t0 + Duration::from_secs(2)).is_allowed());
///
/// // 4th attempt within the window rejected
/// assert!(policy.register_attempt(t0 + Duration::from_secs(3)).is_rejected());
///
/// // After the window elapses, a new window begins
/// assert!(policy.register_attempt(t0 + Duration::from_secs(61)).is_allowed());
/// ```
#[derive(Debug, Clone)]
pub struct FixedWindowPolicy {
    max_attempts: u32,
    window: Duration,
    count: u32,
    window_start: Option<Instant>,
}

impl FixedWindowPolicy {
    /// Create a new fixed-window policy.
    ///
    /// # Arguments
    /// * `max_attempts` - Maximum attempts allowed per window
    /// * `window` - Length of the window
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
            count: 0,
            window_start: None,
        })
    }
}

impl RateLimitPolicy for FixedWindowPolicy {
    fn register_attempt(&mut self, now: Instant) -> AttemptDecision {
        match self.window_start {
            // Active window: elapsed time is still below the window length
            Some(start) if now.saturating_duration_since(start) < self.window => {
                if self.count < self.max_attempts {
                    self.count += 1;
                    AttemptDecision::Allowed {
                        remaining: self.max_attempts - self.count,
                    }
                } else {
                    // At the threshold: reject without incrementing further
                    AttemptDecision::Rejected {
                        retry_after: self.window - now.saturating_duration_since(start),
                    }
                }
            }
            // No window yet, or the previous one elapsed
            _ => {
                self.window_start = Some(now);
                self.count = 1;
                AttemptDecision::Allowed {
                    remaining: self.max_attempts - 1,
                }
            }
        }
    }

    fn window_expired(&self, now: Instant) -> bool {
        match self.window_start {
            Some(start) => now.saturating_duration_since(start) >= self.window,
            None => true,
        }
    }

    fn reset(&mut self) {
        self.count = 0;
        self.window_start = None;
    }
}

/// Sliding-window rate limiting policy.
///
/// Retains a timestamp per allowed attempt and permits up to `max_attempts`
/// inside the trailing window. Timestamps that age out of the window are
/// dropped on access, so allowance recovers gradually rather than all at once.
///
/// # Example
/// ```
/// use signup_throttle::{SlidingWindowPolicy, RateLimitPolicy};
/// use std::time::{Duration, Instant};
///
/// let mut policy = SlidingWindowPolicy::new(2, Duration::from_secs(60)).unwrap();
/// let t0 = Instant::now();
///
/// assert!(policy.register_attempt(t0).is_allowed());
/// assert!(policy.register_attempt(t0 + Duration::from_secs(30)).is_allowed());
/// assert!(policy.register_attempt(t0 + Duration::from_secs(40)).is_rejected());
///
/// // At t0+60 the first attempt has aged out; one slot is free again
/// assert!(policy.register_attempt(t0 + Duration::from_secs(60)).is_allowed());
/// ```
#[derive(Debug, Clone)]
pub struct SlidingWindowPolicy {
    max_attempts: u32,
    window: Duration,
    attempt_times: VecDeque<Instant>,
}

impl SlidingWindowPolicy {
    /// Create a new sliding-window policy.
    ///
    /// # Arguments
    /// * `max_attempts` - Maximum attempts allowed in the trailing window
    /// * `window` - Length of the trailing window
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
            attempt_times: VecDeque::new(),
        })
    }

    /// Drop attempts that have aged out of the window.
    fn expire_old_attempts(&mut self, now: Instant) {
        while let Some(&oldest) = self.attempt_times.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.attempt_times.pop_front();
            } else {
                break;
            }
        }
    }
}

impl RateLimitPolicy for SlidingWindowPolicy {
    fn register_attempt(&mut self, now: Instant) -> AttemptDecision {
        self.expire_old_attempts(now);

        if (self.attempt_times.len() as u32) < self.max_attempts {
            self.attempt_times.push_back(now);
            AttemptDecision::Allowed {
                remaining: self.max_attempts - self.attempt_times.len() as u32,
            }
        } else {
            // Oldest retained attempt is the next one to age out
            let retry_after = match self.attempt_times.front() {
                Some(&oldest) => self
                    .window
                    .saturating_sub(now.saturating_duration_since(oldest)),
                None => Duration::ZERO,
            };
            AttemptDecision::Rejected { retry_after }
        }
    }

    fn window_expired(&self, now: Instant) -> bool {
        match self.attempt_times.back() {
            Some(&newest) => now.saturating_duration_since(newest) >= self.window,
            None => true,
        }
    }

    fn reset(&mut self) {
        self.attempt_times.clear();
    }
}

/// Convenience enum over the built-in policy types.
///
/// Cloning a `Policy` clones its recorded state; the registry uses a pristine
/// `Policy` as a template and clones it for each new client key.
#[derive(Debug, Clone)]
pub enum Policy {
    /// Fixed-window policy
    FixedWindow(FixedWindowPolicy),
    /// Sliding-window policy
    SlidingWindow(SlidingWindowPolicy),
}

impl Policy {
    /// Create a fixed-window policy.
    ///
    /// # Errors
    /// Returns `PolicyError` if `max_attempts` or `window` is zero.
    pub fn fixed_window(max_attempts: u32, window: Duration) -> Result<Self, PolicyError> {
        Ok(Policy::FixedWindow(FixedWindowPolicy::new(
            max_attempts,
            window,
        )?))
    }

    /// Create a sliding-window policy.
    ///
    /// # Errors
    /// Returns `PolicyError` if `max_attempts` or `window` is zero.
    pub fn sliding_window(max_attempts: u32, window: Duration) -> Result<Self, PolicyError> {
        Ok(Policy::SlidingWindow(SlidingWindowPolicy::new(
            max_attempts,
            window,
        )?))
    }
}

impl RateLimitPolicy for Policy {
    fn register_attempt(&mut self, now: Instant) -> AttemptDecision {
        match self {
            Policy::FixedWindow(p) => p.register_attempt(now),
            Policy::SlidingWindow(p) => p.register_attempt(now),
        }
    }

    fn window_expired(&self, now: Instant) -> bool {
        match self {
            Policy::FixedWindow(p) => p.window_expired(now),
            Policy::SlidingWindow(p) => p.window_expired(now),
        }
    }

    fn reset(&mut self) {
        match self {
            Policy::FixedWindow(p) => p.reset(),
            Policy::SlidingWindow(p) => p.reset(),
        }
    }
}
