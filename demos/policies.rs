//! Example demonstrating the difference between the window policies.
//!
//! - Fixed window: quota resets in one step when the window elapses
//! - Sliding window: allowance recovers gradually as attempts age out

use signup_throttle::infrastructure::mocks::MockClock;
use signup_throttle::{ClientKey, Policy, RegistrationThrottle};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn run_scenario(label: &str, policy: Policy) {
    println!("\n=== {} ===", label);

    // A mock clock makes elapsing time visible without sleeping
    let clock = Arc::new(MockClock::new(Instant::now()));
    let throttle = RegistrationThrottle::builder()
        .with_policy(policy)
        .with_clock(clock.clone())
        .build()
        .unwrap();

    let ip = ClientKey::new("203.0.113.7").unwrap();
    let offsets = [0u64, 30, 45, 60, 61, 90];

    let mut last = 0u64;
    for &t in &offsets {
        clock.advance(Duration::from_secs(t - last));
        last = t;
        let decision = throttle.check_and_record(&ip);
        println!("  t={:>3}s  {:?}", t, decision);
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    println!("Two attempts per 60s window, attempts at t=0,30,45,60,61,90");

    run_scenario(
        "Fixed window (resets all at once)",
        Policy::fixed_window(2, Duration::from_secs(60)).unwrap(),
    );

    run_scenario(
        "Sliding window (recovers gradually)",
        Policy::sliding_window(2, Duration::from_secs(60)).unwrap(),
    );
}
