use procwatch_core::{BackoffConfig, BackoffStrategy};
use std::time::Duration;

#[test]
fn test_backoff_max_delay() {
    let mut backoff = BackoffStrategy::new()
        .with_base_delay(Duration::from_secs(1))
        .with_max_delay(Duration::from_secs(5))
        .with_jitter(0.0)
        .with_multiplier(10.0);

    assert_eq!(backoff.next_delay(), Duration::from_secs(1));
    assert_eq!(backoff.next_delay(), Duration::from_secs(5)); // Capped at max
    assert_eq!(backoff.next_delay(), Duration::from_secs(5));
}

#[test]
fn test_backoff_with_jitter() {
    let mut backoff = BackoffStrategy::new()
        .with_base_delay(Duration::from_millis(1000))
        .with_jitter(0.5)
        .with_multiplier(1.0);

    for _ in 0..10 {
        let delay = backoff.next_delay();
        assert!(delay >= Duration::from_millis(500));
        assert!(delay <= Duration::from_millis(1500));
        backoff.reset();
    }
}

#[test]
fn test_backoff_never_exhausts() {
    let mut backoff = BackoffStrategy::new()
        .with_base_delay(Duration::from_millis(1))
        .with_max_delay(Duration::from_millis(10))
        .with_jitter(0.0);

    for _ in 0..1000 {
        assert!(backoff.next_delay() <= Duration::from_millis(10));
    }
    assert_eq!(backoff.attempt(), 1000);
}

#[test]
fn test_from_config() {
    let config = BackoffConfig {
        base_delay_ms: 50,
        max_delay_ms: 400,
        multiplier: 3.0,
        jitter: 0.0,
    };
    let mut backoff = BackoffStrategy::from_config(&config);

    assert_eq!(backoff.next_delay(), Duration::from_millis(50));
    assert_eq!(backoff.next_delay(), Duration::from_millis(150));
    assert_eq!(backoff.next_delay(), Duration::from_millis(400));
    assert_eq!(backoff.max_delay(), Duration::from_millis(400));
}

#[test]
fn test_multiplier_and_jitter_are_clamped() {
    let mut backoff = BackoffStrategy::new()
        .with_base_delay(Duration::from_millis(200))
        .with_multiplier(0.1)
        .with_jitter(-3.0);

    // Multiplier below 1.0 would shrink delays; it is raised to 1.0
    assert_eq!(backoff.next_delay(), Duration::from_millis(200));
    assert_eq!(backoff.next_delay(), Duration::from_millis(200));
}
