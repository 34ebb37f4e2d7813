//! Reconnection policy: backoff delays and the exhaustion decision
//!
//! `delay(n) = min(base * 2^n, cap)` where `n` is the 1-based number of the
//! failed attempt being retried. With the defaults that is 2s, 4s, 8s, then
//! 10s for every later attempt.

use std::time::Duration;

use crate::config::ReconnectSettings;

/// Initial backoff base.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1_000);

/// Maximum reconnection backoff (cap).
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(10_000);

/// Failed reconnection attempts tolerated before exhaustion.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Outcome of consulting the policy after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Retry once after `delay`; `attempt` is the new counter value.
    Retry { attempt: u32, delay: Duration },
    /// Stop retrying the primary transport.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    base: Duration,
    cap: Duration,
    max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY, DEFAULT_MAX_ATTEMPTS)
    }
}

impl ReconnectPolicy {
    pub fn new(base: Duration, cap: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            cap,
            max_attempts,
        }
    }

    pub fn from_settings(settings: &ReconnectSettings) -> Self {
        Self::new(
            Duration::from_millis(settings.base_delay_ms),
            Duration::from_millis(settings.max_delay_ms),
            settings.max_attempts,
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Backoff before retry number `n`.
    pub fn delay(&self, n: u32) -> Duration {
        // checked_shl returns None once the shift reaches the bit width.
        let multiplier: u64 = 1u64.checked_shl(n).unwrap_or(u64::MAX);
        let base_ms = u64::try_from(self.base.as_millis()).unwrap_or(u64::MAX);
        let cap_ms = u64::try_from(self.cap.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(multiplier).min(cap_ms))
    }

    /// Decide what to do after a failure, given the failed attempts so far.
    pub fn decide(&self, failed_attempts: u32) -> Decision {
        if failed_attempts < self.max_attempts {
            let attempt = failed_attempts + 1;
            Decision::Retry {
                attempt,
                delay: self.delay(attempt),
            }
        } else {
            Decision::Exhausted
        }
    }
}
