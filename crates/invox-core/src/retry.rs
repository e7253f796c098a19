//! Retry policy for extraction attempts
//!
//! Backoff grows linearly: the wait after the n-th failed attempt is
//! `delay_unit * n`.

use std::time::Duration;

/// Retry bounds shared by every extraction call.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts before giving up
    pub max_attempts: u32,
    /// Base delay; the wait after attempt n is `delay_unit * n`
    pub delay_unit: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_unit: Duration::from_millis(1000),
        }
    }
}

impl RetryConfig {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.delay_unit * attempt
    }
}

/// Whether a failed attempt is worth repeating.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
