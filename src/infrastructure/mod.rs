//! Infrastructure layer - external adapters and integrations.
//!
//! This layer provides adapters for:
//! - Clock abstraction (system time vs mock)
//! - Storage implementations (sharded maps)
//! - Eviction strategies for bounding tracked keys
//! - The assembled throttle facade
//! - Redis-backed limiting for multi-process deployments

pub mod clock;
pub mod eviction;
pub mod storage;
pub mod throttle;

#[cfg(feature = "redis-storage")]
pub mod redis;

/// Mock implementations for testing.
///
/// This module is only available when the `test-helpers` feature is enabled,
/// or during test builds. It provides controllable test doubles for testing
/// window expiry deterministically.
///
/// To use these mocks in integration tests, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// signup-throttle = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
