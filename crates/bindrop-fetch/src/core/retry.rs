use std::time::Duration;

use crate::data::AttemptState;
use crate::error::Error;

/// Calculate the delay before a retry attempt using exponential backoff.
///
/// The delay formula is: `base * 2^retry_count`, with `retry_count` 0-indexed
/// (0 = first retry).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use bindrop_fetch::retry_delay;
///
/// assert_eq!(retry_delay(0, Duration::from_secs(2)), Duration::from_secs(2));
/// assert_eq!(retry_delay(1, Duration::from_secs(2)), Duration::from_secs(4));
/// assert_eq!(retry_delay(4, Duration::from_secs(2)), Duration::from_secs(32));
/// ```
pub fn retry_delay(retry_count: u32, base: Duration) -> Duration {
    let multiplier = 2_u32.saturating_pow(retry_count);
    base.saturating_mul(multiplier)
}

/// The retry schedule for blob downloads.
///
/// Five retries after the first attempt, waiting 2^k seconds before retry k.
/// The schedule is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self { Self::FIXED }
}

impl RetryPolicy {
    pub const FIXED: Self = Self {
        max_retries: 5,
        base_delay: Duration::from_secs(2),
    };

    pub fn max_retries(&self) -> u32 { self.max_retries }

    pub fn max_attempts(&self) -> u32 { self.max_retries + 1 }

    /// Delay before retry `retry` (1-based): 2, 4, 8, 16, 32 seconds.
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        retry_delay(retry.saturating_sub(1), self.base_delay)
    }

    /// Transition taken once the failed attempt's partial file is gone.
    pub fn after_cleanup(&self, attempt: u32, error: Error) -> AttemptState {
        if !error.is_transient() {
            AttemptState::Rejected {
                attempts: attempt,
                error,
            }
        } else if attempt < self.max_attempts() {
            AttemptState::Retrying {
                attempt: attempt + 1,
                delay: self.delay_before_retry(attempt),
            }
        } else {
            AttemptState::Exhausted {
                attempts: attempt,
                error,
            }
        }
    }
}
