//! Example demonstrating the tracked-key bound and eviction strategies.
//!
//! The attempt map is bounded; when the bound is reached a victim is
//! forgotten. LRU forgets the least recently seen key, priority eviction
//! keeps actively-rejected keys tracked longest.

use signup_throttle::{ClientKey, EvictionStrategy, Policy, RegistrationThrottle};
use std::sync::Arc;
use std::time::Duration;

fn demonstrate_lru() {
    println!("\n=== LRU eviction ===");
    println!("Bound of 3 tracked keys; the 4th key evicts the oldest\n");

    let throttle = RegistrationThrottle::builder()
        .with_policy(Policy::fixed_window(5, Duration::from_secs(600)).unwrap())
        .with_max_keys(3)
        .build()
        .unwrap();

    for raw in ["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"] {
        let key = ClientKey::new(raw).unwrap();
        throttle.check_and_record(&key);
        println!(
            "  after {}: {} keys tracked, {} evicted",
            raw,
            throttle.key_count(),
            throttle.metrics().keys_evicted()
        );
    }
}

fn demonstrate_priority() {
    println!("\n=== Priority eviction ===");
    println!("Keys with rejection history score higher and are kept\n");

    let throttle = RegistrationThrottle::builder()
        .with_policy(Policy::fixed_window(1, Duration::from_secs(600)).unwrap())
        .with_eviction_strategy(EvictionStrategy::Priority {
            max_keys: 2,
            priority_fn: Arc::new(|candidate| candidate.rejected.min(100) as u32),
        })
        .build()
        .unwrap();

    // "abuser" exhausts its quota and keeps trying
    let abuser = ClientKey::new("203.0.113.66").unwrap();
    for _ in 0..5 {
        throttle.check_and_record(&abuser);
    }
    println!("  abuser made 5 attempts (4 rejected)");

    let clean = ClientKey::new("198.51.100.9").unwrap();
    throttle.check_and_record(&clean);
    println!("  clean key made 1 attempt");

    // The bound is reached; a new key forces an eviction
    let newcomer = ClientKey::new("192.0.2.55").unwrap();
    throttle.check_and_record(&newcomer);
    println!("  newcomer arrived; clean key was evicted, abuser kept");

    println!(
        "  abuser still rejected: {}",
        throttle.check_and_record(&abuser).is_rejected()
    );

    for summary in throttle.rejection_summaries(1) {
        println!("  summary: {}", summary.format_message());
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    demonstrate_lru();
    demonstrate_priority();
}
