//! Example demonstrating the background window sweeper.
//!
//! Keys whose window has elapsed are dead weight; the sweeper reclaims them
//! on an interval so idle keys don't accumulate. Requires the `async`
//! feature: `cargo run --example sweeper --features async`

use signup_throttle::{ClientKey, Policy, RegistrationThrottle};
use std::time::Duration;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("signup_throttle=debug")
        .init();

    // Short window and sweep interval so the demo runs in seconds
    let throttle = RegistrationThrottle::builder()
        .with_policy(Policy::fixed_window(2, Duration::from_secs(2)).unwrap())
        .with_sweep_interval(Duration::from_secs(1))
        .build()
        .unwrap();

    println!("=== Window Sweeper Example ===\n");

    let handle = throttle.start_sweeper();

    // A burst of attempts from several clients, one of them abusive
    for raw in ["10.0.0.1", "10.0.0.2", "10.0.0.3"] {
        let key = ClientKey::new(raw).unwrap();
        for _ in 0..4 {
            throttle.check_and_record(&key);
        }
    }
    println!("after burst: {} keys tracked", throttle.key_count());

    // Windows elapse; the sweeper reclaims the entries and logs rejection
    // summaries for the abusive keys
    tokio::time::sleep(Duration::from_secs(4)).await;
    println!("after sweep: {} keys tracked", throttle.key_count());
    println!("keys expired: {}", throttle.metrics().keys_expired());

    handle.abort();
}
