//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages runtime behavior:
//! - Attempt registry (per-key policy state)
//! - Registration limiter (decision making)
//! - Window sweeper (periodic cleanup of expired entries)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod limiter;
pub mod metrics;
pub mod ports;
pub mod registry;
pub mod sweeper;
