use std::time::Duration;

use crate::BackoffConfig;

/// Exponential restart delay with jitter. Never exhausts: a supervised
/// process is always restarted eventually.
#[derive(Debug, Clone)]
pub struct BackoffStrategy {
    base_delay: Duration,
    max_delay: Duration,
    jitter_factor: f64,
    multiplier: f64,
    attempt: u32,
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            jitter_factor: 0.3,
            multiplier: 2.0,
            attempt: 0,
        }
    }
}

impl BackoffStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &BackoffConfig) -> Self {
        Self::new()
            .with_base_delay(Duration::from_millis(config.base_delay_ms))
            .with_max_delay(Duration::from_millis(config.max_delay_ms))
            .with_multiplier(config.multiplier)
            .with_jitter(config.jitter)
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, factor: f64) -> Self {
        self.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    pub fn next_delay(&mut self) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let exponent = self.attempt.min(i32::MAX as u32) as i32;
        let delay_ms = base_ms * self.multiplier.powi(exponent);
        let delay_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        let jitter_range = delay_ms * self.jitter_factor;
        let jitter = if jitter_range > 0.0 {
            use rand::Rng;
            rand::rng().random_range(-jitter_range..=jitter_range)
        } else {
            0.0
        };
        let final_delay_ms = (delay_ms + jitter).max(0.0) as u64;

        self.attempt = self.attempt.saturating_add(1);
        Duration::from_millis(final_delay_ms)
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff() {
        let mut backoff = BackoffStrategy::new()
            .with_base_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(10))
            .with_jitter(0.0)
            .with_multiplier(2.0);

        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
        assert_eq!(backoff.next_delay(), Duration::from_millis(200));
        assert_eq!(backoff.next_delay(), Duration::from_millis(400));
        assert_eq!(backoff.next_delay(), Duration::from_millis(800));
    }

    #[test]
    fn test_reset() {
        let mut backoff = BackoffStrategy::new().with_jitter(0.0);

        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.attempt(), 2);

        backoff.reset();
        assert_eq!(backoff.attempt(), 0);
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
    }
}
