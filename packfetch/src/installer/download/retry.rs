//! Retry policy for downloads.

use std::time::Duration;

/// Bounded attempts with exponential backoff.
///
/// Attempts are numbered from 1. After attempt `n` fails, the wait before
/// attempt `n + 1` is `backoff_unit * 2^n`: two units after the first
/// failure, four after the second, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_unit: Duration,
}

impl RetryPolicy {
    /// Create a policy allowing `max_attempts` attempts in total (at least 1).
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_unit,
        }
    }

    /// Maximum number of attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before retrying after attempt `attempt` failed.
    ///
    /// Returns `None` when `attempt` was the last one allowed.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        Some(self.backoff_unit.saturating_mul(2u32.saturating_pow(attempt)))
    }
}
