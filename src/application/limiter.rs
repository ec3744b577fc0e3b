//! Registration limiter coordination logic.
//!
//! The limiter decides whether each registration attempt is allowed or
//! rejected, records rejections, and updates metrics.

use crate::application::metrics::Metrics;
use crate::application::ports::Storage;
use crate::application::registry::{AttemptRegistry, AttemptState};
use crate::domain::{
    key::ClientKey,
    policy::{AttemptDecision, RateLimitPolicy},
};

/// Coordinates rate limiting decisions for registration attempts.
///
/// This is the component the registration handler calls before creating an
/// account: a `Rejected` decision maps to a client-facing "too many requests"
/// response, not an error.
#[derive(Clone)]
pub struct RegistrationLimiter<S>
where
    S: Storage<ClientKey, AttemptState> + Clone,
{
    registry: AttemptRegistry<S>,
    metrics: Metrics,
}

impl<S> RegistrationLimiter<S>
where
    S: Storage<ClientKey, AttemptState> + Clone,
{
    /// Create a new limiter.
    ///
    /// # Arguments
    /// * `registry` - The attempt registry (which owns the clock)
    /// * `metrics` - Metrics tracker
    pub fn new(registry: AttemptRegistry<S>, metrics: Metrics) -> Self {
        Self { registry, metrics }
    }

    /// Record an attempt for a key and decide whether to allow it.
    ///
    /// The read-modify-write on the key's attempt record runs under the
    /// entry's lock, so concurrent calls for the same key never allow more
    /// than the configured maximum within one window.
    ///
    /// # Performance
    /// Designed for the request hot path: one sharded-map lookup, no
    /// allocations for existing keys.
    pub fn check_and_record(&self, key: &ClientKey) -> AttemptDecision {
        let decision = self
            .registry
            .with_attempt_state(key.clone(), |state, now| {
                let decision = state.policy.register_attempt(now);
                if decision.is_rejected() {
                    state.rejections.record_rejection(now);
                }
                decision
            });

        match decision {
            AttemptDecision::Allowed { .. } => self.metrics.record_allowed(),
            AttemptDecision::Rejected { .. } => self.metrics.record_rejected(),
        }

        decision
    }

    /// Get a reference to the registry.
    pub fn registry(&self) -> &AttemptRegistry<S> {
        &self.registry
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
