//! Tests for expired-window cleanup, manual and background.

use signup_throttle::infrastructure::mocks::MockClock;
use signup_throttle::{ClientKey, Policy, RegistrationThrottle};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn key(raw: &str) -> ClientKey {
    ClientKey::new(raw).unwrap()
}

#[test]
fn test_manual_sweep_reclaims_only_expired() {
    let clock = Arc::new(MockClock::new(Instant::now()));
    let throttle = RegistrationThrottle::builder()
        .with_policy(Policy::fixed_window(3, Duration::from_secs(60)).unwrap())
        .with_clock(clock.clone())
        .build()
        .unwrap();

    throttle.check_and_record(&key("early"));
    clock.advance(Duration::from_secs(40));
    throttle.check_and_record(&key("late"));

    // +70s from start: "early" expired at +60, "late" expires at +100
    clock.advance(Duration::from_secs(30));
    assert_eq!(throttle.sweep_expired(), 1);
    assert_eq!(throttle.key_count(), 1);

    clock.advance(Duration::from_secs(30));
    assert_eq!(throttle.sweep_expired(), 1);
    assert_eq!(throttle.key_count(), 0);
    assert_eq!(throttle.metrics().keys_expired(), 2);
}

#[test]
fn test_sweep_does_not_disturb_active_quota() {
    let clock = Arc::new(MockClock::new(Instant::now()));
    let throttle = RegistrationThrottle::builder()
        .with_policy(Policy::fixed_window(2, Duration::from_secs(60)).unwrap())
        .with_clock(clock.clone())
        .build()
        .unwrap();

    let ip = key("203.0.113.30");
    throttle.check_and_record(&ip);
    throttle.check_and_record(&ip);

    clock.advance(Duration::from_secs(30));
    assert_eq!(throttle.sweep_expired(), 0);

    // Mid-window state survived the sweep: still exhausted
    assert!(throttle.check_and_record(&ip).is_rejected());
}

#[test]
fn test_swept_key_starts_fresh() {
    let clock = Arc::new(MockClock::new(Instant::now()));
    let throttle = RegistrationThrottle::builder()
        .with_policy(Policy::fixed_window(1, Duration::from_secs(60)).unwrap())
        .with_clock(clock.clone())
        .build()
        .unwrap();

    let ip = key("203.0.113.31");
    throttle.check_and_record(&ip);
    assert!(throttle.check_and_record(&ip).is_rejected());

    clock.advance(Duration::from_secs(61));
    throttle.sweep_expired();

    assert!(throttle.check_and_record(&ip).is_allowed());
}

#[cfg(feature = "async")]
mod background {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_background_sweeper_reclaims_expired_keys() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let throttle = RegistrationThrottle::builder()
            .with_policy(Policy::fixed_window(3, Duration::from_secs(60)).unwrap())
            .with_clock(clock.clone())
            .with_sweep_interval(Duration::from_millis(20))
            .build()
            .unwrap();

        for i in 0..10 {
            throttle.check_and_record(&key(&format!("10.2.0.{}", i)));
        }
        assert_eq!(throttle.key_count(), 10);

        let handle = throttle.start_sweeper();

        clock.advance(Duration::from_secs(61));
        tokio::time::sleep(Duration::from_millis(120)).await;

        handle.abort();

        assert_eq!(throttle.key_count(), 0);
        assert_eq!(throttle.metrics().keys_expired(), 10);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_limiter_usable_while_sweeper_runs() {
        let throttle = RegistrationThrottle::builder()
            .with_policy(Policy::fixed_window(2, Duration::from_secs(60)).unwrap())
            .with_sweep_interval(Duration::from_millis(10))
            .build()
            .unwrap();

        let handle = throttle.start_sweeper();

        let ip = key("203.0.113.32");
        assert!(throttle.check_and_record(&ip).is_allowed());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(throttle.check_and_record(&ip).is_allowed());
        assert!(throttle.check_and_record(&ip).is_rejected());

        handle.abort();
    }
}
