//! # retry-cli
//!
//! Runs an external command and, if it fails, runs it again with exponential
//! backoff. Termination signals sent to the supervisor are forwarded to the
//! running child, and when retries run out the supervisor exits the way the
//! last attempt did: with its exit code, or by dying from the same signal.
//!
//! ## Architecture
//! ```text
//!   RetryConfig ──► Scheduler ─────────────┐
//!                                          ▼
//!   argv ────────► Executor ◄──────── Orchestrator ────► SubscriberSet ──► LogWriter
//!                     │  ▲                 │  ▲                             (stderr)
//!        spawn/wait   │  │ attach(pid)     │  │ cancelled()
//!                     ▼  │ next_signal()   ▼  │
//!                   child ◄── kill(sig) ── SignalRelay ◄── SIGINT/SIGTERM/SIGQUIT/SIGHUP
//!                                              │
//!                                              ▼
//!                                   TerminalStatus::terminate()
//!                                   (exit(n) | raise(s) | exit(128+s))
//! ```
//!
//! ### Lifecycle
//! ```text
//! loop {
//!   ├─► signal received? ─► TerminatedBySignal(s)
//!   ├─► attempt += 1, publish AttemptStarting
//!   ├─► executor.run(argv)  (forwards signals to the child while it runs)
//!   │       │
//!   │       ├─ Success ──► publish AttemptSucceeded ─► ExitCode(0)
//!   │       └─ failure ──► publish AttemptFailed
//!   │                      ├─ !retryable || !should_retry(attempt) ─► RetriesExhausted, synthesize status
//!   │                      └─ publish BackoffScheduled, sleep(next_delay) (cancellable)
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                | Key types                                   |
//! |-------------------|------------------------------------------------------------|---------------------------------------------|
//! | **Policies**      | Retry limit, exponential delays, jitter.                   | [`Scheduler`], [`BackoffPolicy`], [`JitterPolicy`] |
//! | **Execution**     | One child per attempt, inherited stdio.                    | [`Executor`], [`ChildOutcome`]              |
//! | **Signals**       | Forwarding, cancellation, terminal status.                 | [`SignalRelay`], [`TerminalStatus`]         |
//! | **Orchestration** | The attempt loop.                                          | [`Orchestrator`], [`RunSummary`]            |
//! | **Subscriber API**| Hook into attempt lifecycle events.                        | [`Subscribe`], [`LogWriter`]                |
//! | **Errors**        | Typed errors for the runtime and for attempts.             | [`RetryError`], [`AttemptError`]            |
//! | **Configuration** | Validated retry settings.                                  | [`RetryConfig`]                             |
//!
//! ## Example
//! ```rust,no_run
//! use retry_cli::{Orchestrator, RetryConfig, SignalRelay};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = RetryConfig { retries: 3, ..RetryConfig::default() };
//!     let argv = vec!["curl".to_string(), "-f".to_string(), "http://localhost/health".to_string()];
//!
//!     let relay = SignalRelay::install()?;
//!     let summary = Orchestrator::new(&cfg, argv, relay, Vec::new())?.run().await?;
//!     summary.status.terminate()
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use config::RetryConfig;
pub use self::core::{
    AttemptState, ChildOutcome, Executor, Orchestrator, RunSummary, SignalRelay, SignalTrigger,
    TerminalStatus,
};
pub use error::{AttemptError, RetryError};
pub use events::{Event, EventKind};
pub use policies::{BackoffPolicy, JitterPolicy, Scheduler};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
