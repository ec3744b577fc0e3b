//! Basic example demonstrating fixed-window registration limiting.
//!
//! This example shows how a registration handler consults the throttle
//! before creating an account: up to 3 attempts per client key are allowed
//! within the window, further attempts are rejected.

use signup_throttle::{AttemptDecision, ClientKey, Policy, RegistrationThrottle};
use std::time::Duration;

fn main() {
    tracing_subscriber::fmt::init();

    // 3 attempts per 60 seconds per client
    let throttle = RegistrationThrottle::builder()
        .with_policy(Policy::fixed_window(3, Duration::from_secs(60)).unwrap())
        .build()
        .unwrap();

    println!("=== Basic Registration Limiting Example ===\n");
    println!("Policy: allow 3 attempts per 60s window per client\n");

    let ip = ClientKey::new("203.0.113.7").unwrap();

    // Simulate 6 registration attempts from the same address
    println!("6 attempts from {}:", ip);
    for i in 1..=6 {
        match throttle.check_and_record(&ip) {
            AttemptDecision::Allowed { remaining } => {
                println!("  attempt {}: allowed ({} remaining)", i, remaining);
            }
            AttemptDecision::Rejected { retry_after } => {
                println!("  attempt {}: rejected (retry after {:?})", i, retry_after);
            }
        }
    }

    // A different client is unaffected
    let other = ClientKey::new("198.51.100.23").unwrap();
    println!("\n1 attempt from {}:", other);
    match throttle.check_and_record(&other) {
        AttemptDecision::Allowed { remaining } => {
            println!("  attempt 1: allowed ({} remaining)", remaining);
        }
        AttemptDecision::Rejected { retry_after } => {
            println!("  attempt 1: rejected (retry after {:?})", retry_after);
        }
    }

    let snapshot = throttle.metrics_snapshot();
    println!("\n=== Metrics ===");
    println!("allowed:  {}", snapshot.attempts_allowed);
    println!("rejected: {}", snapshot.attempts_rejected);
    println!("rejection rate: {:.0}%", snapshot.rejection_rate() * 100.0);
}
