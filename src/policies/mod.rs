//! Retry policies.
//!
//! This module groups the knobs that control **whether** another attempt is
//! allowed and **how long** to wait before it.
//!
//! ## Contents
//! - [`Scheduler`]     retry limit + delay per attempt (pure logic)
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization strategy to avoid synchronized retries
//!
//! ## Quick wiring
//! ```text
//! RetryConfig { retries, factor, min_timeout, max_timeout, randomize }
//!      └─► Scheduler::from_config()
//!           └─► core::orchestrator::Orchestrator uses:
//!                - should_retry(attempt) to decide continue/stop
//!                - next_delay(attempt) to schedule the next attempt
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=1s, factor=2.0, max=unbounded, jitter=None.
//! - `JitterPolicy::None` by default; `--randomize` selects `Multiply`.

mod backoff;
mod jitter;

pub use backoff::{BackoffPolicy, Scheduler};
pub use jitter::JitterPolicy;
