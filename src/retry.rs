use std::time::Duration;

use crate::ClientOptions;

/// Attempt budget and backoff schedule for one logical call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy. A budget of zero attempts is raised to one.
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Returns `true` when `attempt` (0-based) is the last one allowed.
    pub fn is_last(&self, attempt: usize) -> bool {
        attempt + 1 >= self.max_attempts
    }

    /// Delay to wait after failed attempt `attempt` (0-based), or `None` when
    /// that attempt was the last one.
    ///
    /// The delay is `base_delay * 2^attempt`; the exponent saturates at 16.
    pub fn delay_after(&self, attempt: usize) -> Option<Duration> {
        if self.is_last(attempt) {
            return None;
        }
        let exp = attempt.min(16) as u32;
        let multiplier = 1u32 << exp;
        Some(self.base_delay.saturating_mul(multiplier))
    }
}

impl From<&ClientOptions> for RetryPolicy {
    fn from(options: &ClientOptions) -> Self {
        Self::new(
            options.max_attempts,
            Duration::from_millis(options.retry_backoff_ms),
        )
    }
}
