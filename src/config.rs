//! # Retry configuration.
//!
//! Provides [`RetryConfig`], the immutable settings that drive the attempt loop.
//!
//! Config is used in two ways:
//! 1. **Scheduler creation**: `Scheduler::new(&config)` derives the backoff curve
//! 2. **Orchestrator creation**: `Orchestrator::new(config, relay, subscribers)`
//!
//! ## Sentinel values
//! - `max_timeout = None` → unbounded delay cap
//! - `min_timeout = 0ms` → retries start immediately (never blocks)

use std::time::Duration;

use crate::error::RetryError;

/// Configuration of the retry loop.
///
/// ## Field semantics
/// - `retries`: retries after the first attempt (total attempts = `retries + 1`)
/// - `factor`: exponential multiplier applied per attempt (`> 0`)
/// - `min_timeout`: delay before the first retry
/// - `max_timeout`: cap for any delay (`None` = unbounded)
/// - `randomize`: multiply each delay by a random factor in `[1.0, 2.0)`
///
/// ## Notes
/// All fields are public for flexibility. Call [`RetryConfig::validate`] before
/// handing a hand-built config to the orchestrator.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt.
    pub retries: u32,

    /// Exponential growth factor between successive delays.
    pub factor: f64,

    /// Delay before the first retry.
    pub min_timeout: Duration,

    /// Upper bound for every delay.
    ///
    /// - `None` = unbounded
    /// - `Some(d)` = no delay exceeds `d`, jitter included
    pub max_timeout: Option<Duration>,

    /// Enables jitter (`1×`–`2×` multiplier).
    pub randomize: bool,
}

impl RetryConfig {
    /// Checks the invariants the scheduler relies on.
    ///
    /// Rejects a non-finite or non-positive `factor` and `min_timeout > max_timeout`.
    pub fn validate(&self) -> Result<(), RetryError> {
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(RetryError::InvalidConfig {
                reason: format!("factor must be a positive number, got {}", self.factor),
            });
        }
        if let Some(max) = self.max_timeout {
            if self.min_timeout > max {
                return Err(RetryError::InvalidConfig {
                    reason: format!(
                        "min timeout {}ms exceeds max timeout {}ms",
                        self.min_timeout.as_millis(),
                        max.as_millis()
                    ),
                });
            }
        }
        Ok(())
    }

    /// Returns `self` after [`validate`](Self::validate) succeeds.
    pub fn validated(self) -> Result<Self, RetryError> {
        self.validate()?;
        Ok(self)
    }
}

impl Default for RetryConfig {
    /// Default configuration:
    ///
    /// - `retries = 10`
    /// - `factor = 2.0`
    /// - `min_timeout = 1000ms`
    /// - `max_timeout = None` (unbounded)
    /// - `randomize = false`
    fn default() -> Self {
        Self {
            retries: 10,
            factor: 2.0,
            min_timeout: Duration::from_millis(1000),
            max_timeout: None,
            randomize: false,
        }
    }
}
