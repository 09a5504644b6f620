//! Retry policy for review generation

use std::time::Duration;

/// Decides how many attempts a review gets and how each is configured
pub trait RetryPolicy: Send + Sync {
    /// Total attempts, including the first
    fn max_attempts(&self) -> u32;

    /// Sampling temperature for a zero-based attempt number
    fn temperature(&self, attempt: u32) -> f64;

    /// Pause before a zero-based attempt number
    fn delay(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}

/// Re-attempts immediately, cooling the temperature on every retry
///
/// Attempt 0 uses the base temperature; attempt `i` uses
/// `max(floor, base - step * i)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImmediateRetry {
    pub max_attempts: u32,
    pub base_temperature: f64,
    pub step: f64,
    pub floor: f64,
}

impl Default for ImmediateRetry {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_temperature: 0.7,
            step: 0.1,
            floor: 0.3,
        }
    }
}

impl RetryPolicy for ImmediateRetry {
    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn temperature(&self, attempt: u32) -> f64 {
        if attempt == 0 {
            self.base_temperature
        } else {
            (self.base_temperature - self.step * f64::from(attempt)).max(self.floor)
        }
    }
}
