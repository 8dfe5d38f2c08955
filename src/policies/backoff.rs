//! # Backoff policy and retry scheduler.
//!
//! [`BackoffPolicy`] controls how retry delays grow after repeated failures.
//! It is parameterized by:
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::first`] the initial delay;
//! - [`BackoffPolicy::max`] the optional delay cap.
//!
//! The delay for retry `n` (0-indexed) is computed as `first × factor^n`, clamped
//! to `max`, then jitter is applied and the result is clamped again. The base
//! delay is derived purely from the index, so jitter never feeds back into later
//! delays.
//!
//! [`Scheduler`] pairs a policy with the retry limit and speaks in 1-based
//! attempt numbers: attempt 1 is the initial run, so `should_retry(n)` holds
//! while `n <= retries` and total attempts are `retries + 1`.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use retry_cli::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Some(Duration::from_secs(10)),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(100));
//! assert_eq!(backoff.next(1), Duration::from_millis(200));
//!
//! // 100ms × 2^10 = 102_400ms → capped at max=10s
//! assert_eq!(backoff.next(10), Duration::from_secs(10));
//! ```

use std::time::Duration;

use crate::{config::RetryConfig, policies::jitter::JitterPolicy};

/// Retry backoff policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Initial delay before the first retry.
    pub first: Duration,
    /// Maximum delay cap (`None` = unbounded).
    pub max: Option<Duration>,
    /// Multiplicative growth factor (`>= 1.0` for non-decreasing delays).
    pub factor: f64,
    /// Jitter policy applied after capping.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a policy with:
    /// - `factor = 2.0`;
    /// - `first = 1s`;
    /// - `max = None` (unbounded).
    fn default() -> Self {
        Self {
            first: Duration::from_secs(1),
            max: None,
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay for the given retry index (0-indexed).
    ///
    /// # Notes
    /// - If `factor` equals 1.0, delay remains constant at `first` (up to `max`).
    /// - Overflow and non-finite intermediates clamp to `max`, or to
    ///   [`Duration::MAX`] when unbounded.
    pub fn next(&self, retry: u32) -> Duration {
        let exp = retry.min(i32::MAX as u32) as i32;
        let unclamped_secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let ceiling = self.max.unwrap_or(Duration::MAX);
        let base = if !unclamped_secs.is_finite()
            || unclamped_secs < 0.0
            || unclamped_secs > ceiling.as_secs_f64()
        {
            ceiling
        } else {
            Duration::try_from_secs_f64(unclamped_secs).unwrap_or(ceiling)
        };

        self.jitter.apply(base, self.max)
    }
}

/// Pure retry policy: whether another attempt is allowed, and after how long.
///
/// No I/O, no side effects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scheduler {
    retries: u32,
    backoff: BackoffPolicy,
}

impl Scheduler {
    /// Creates a scheduler from a retry limit and a backoff curve.
    pub fn new(retries: u32, backoff: BackoffPolicy) -> Self {
        Self { retries, backoff }
    }

    /// Derives the scheduler from a [`RetryConfig`].
    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self::new(
            cfg.retries,
            BackoffPolicy {
                first: cfg.min_timeout,
                max: cfg.max_timeout,
                factor: cfg.factor,
                jitter: JitterPolicy::from_randomize(cfg.randomize),
            },
        )
    }

    /// Returns `true` if attempt `attempt` (1-based) may be followed by another one.
    #[inline]
    pub fn should_retry(&self, attempt: u64) -> bool {
        attempt <= u64::from(self.retries)
    }

    /// Delay to wait after failed attempt `attempt` (1-based) before the next one.
    ///
    /// `min_timeout × factor^(attempt - 1)`, capped, jittered, re-capped.
    pub fn next_delay(&self, attempt: u64) -> Duration {
        let retry = attempt.saturating_sub(1).min(u64::from(u32::MAX)) as u32;
        self.backoff.next(retry)
    }
}
