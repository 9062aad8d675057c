//! Backoff policy for transient upstream failures.
//!
//! Delay for attempt `n` (0-indexed) is `min(base_delay * 2^n, max_delay)` plus
//! up to `jitter_factor` of that value in random jitter. A `Retry-After` hint
//! from the server replaces the exponential part.

use crate::error::FetchError;
use rand::Rng;
use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);
const DEFAULT_JITTER_FACTOR: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero behaves like one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Fraction of the delay added as random jitter (0.0 - 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            jitter_factor: DEFAULT_JITTER_FACTOR,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            jitter_factor: DEFAULT_JITTER_FACTOR,
        }
    }

    /// A policy that gives up after the first failure.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    pub fn with_jitter(mut self, jitter_factor: f64) -> Self {
        self.jitter_factor = jitter_factor;
        self
    }

    /// Whether a failure on attempt `attempt` (0-indexed) should be retried.
    pub fn should_retry(&self, attempt: u32, error: &FetchError) -> bool {
        error.is_transient() && attempt.saturating_add(1) < self.max_attempts.max(1)
    }

    pub fn delay_for(&self, attempt: u32, error: &FetchError) -> Duration {
        let base = match error.retry_after() {
            Some(retry_after) => retry_after,
            None => self
                .base_delay
                .saturating_mul(2_u32.saturating_pow(attempt))
                .min(self.max_delay),
        };
        base.saturating_add(self.jitter(base))
    }

    fn jitter(&self, delay: Duration) -> Duration {
        let factor = self.jitter_factor.clamp(0.0, 1.0);
        if factor <= 0.0 || delay.is_zero() {
            return Duration::ZERO;
        }
        let fraction = rand::thread_rng().gen_range(0.0..factor);
        delay.mul_f64(fraction)
    }
}
