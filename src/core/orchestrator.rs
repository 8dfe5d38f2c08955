//! # Orchestrator: the attempt loop.
//!
//! Drives attempts of one command with:
//! - retry limit and delays per [`Scheduler`],
//! - one child at a time via [`Executor`],
//! - signal forwarding and terminal status via [`SignalRelay`].
//!
//! ## State machine
//! ```text
//! Idle ──► Attempting(attempt = 1)
//!              │
//!              ├─ Success ─────────────────────────────► Done(ExitCode(0))
//!              │
//!              └─ failure ─► retryable && should_retry(attempt)?
//!                               ├─ yes ─► FailedRetryable
//!                               │           ├─ sleep(next_delay(attempt)) (cancellable)
//!                               │           └─ attempt += 1 ─► Attempting
//!                               └─ no  ─► FailedTerminal ─► synthesize(last outcome)
//!
//! external signal s (any state) ─► forward s to child, cancel sleep,
//!                                  ─► TerminatedBySignal(s)
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially** (never concurrent)
//! - Attempt counter **increments on each spawn** (monotonic, 1-based)
//! - Cancellation is checked before every spawn and races every suspension point

use std::sync::Arc;

use tokio::{select, time};

use crate::{
    config::RetryConfig,
    core::{
        executor::{ChildOutcome, Executor},
        relay::{SignalRelay, TerminalStatus},
    },
    error::{AttemptError, RetryError},
    events::{Event, EventKind},
    policies::Scheduler,
    subscribers::{Subscribe, SubscriberSet},
};

/// Progress of the attempt loop.
///
/// Mutated only by the orchestrator, one attempt at a time.
#[derive(Debug, Default)]
pub struct AttemptState {
    /// Number of the current (or last) attempt, 1-based; `0` before the first.
    pub attempt: u64,
    /// Why the last attempt failed, if it did.
    pub last_failure: Option<AttemptError>,
}

/// What a finished run looked like.
#[derive(Debug)]
pub struct RunSummary {
    /// Status the supervisor should terminate with.
    pub status: TerminalStatus,
    /// Number of attempts that were spawned (or tried to spawn).
    pub attempts: u64,
    /// Failure of the last attempt, or the external signal that stopped the run.
    pub last_failure: Option<AttemptError>,
}

impl RunSummary {
    fn new(status: TerminalStatus, state: AttemptState) -> Self {
        Self {
            status,
            attempts: state.attempt,
            last_failure: state.last_failure,
        }
    }
}

/// Runs a command until it succeeds, retries run out, or the supervisor is signalled.
pub struct Orchestrator {
    scheduler: Scheduler,
    executor: Executor,
    relay: SignalRelay,
    subscribers: SubscriberSet,
}

impl Orchestrator {
    /// Creates an orchestrator.
    ///
    /// Validates `config` and `argv`. Spawns subscriber workers, so it must be
    /// called from within a tokio runtime.
    pub fn new(
        config: &RetryConfig,
        argv: Vec<String>,
        relay: SignalRelay,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Result<Self, RetryError> {
        config.validate()?;
        Ok(Self {
            scheduler: Scheduler::from_config(config),
            executor: Executor::new(argv)?,
            relay,
            subscribers: SubscriberSet::new(subscribers),
        })
    }

    /// Runs the attempt loop to completion and returns how it ended.
    ///
    /// The caller decides what to do with [`RunSummary::status`]; the binary
    /// passes it to [`TerminalStatus::terminate`].
    ///
    /// ### Exit conditions
    /// - The command exits 0 → `ExitCode(0)`
    /// - A failing attempt with no retries left → status synthesized from its outcome
    /// - A termination signal → `TerminatedBySignal(s)`, no further attempts
    pub async fn run(mut self) -> Result<RunSummary, RetryError> {
        let res = self.drive().await;
        self.subscribers.shutdown().await;
        res
    }

    async fn drive(&mut self) -> Result<RunSummary, RetryError> {
        let mut state = AttemptState::default();

        loop {
            if let Some(signal) = self.relay.received() {
                return Ok(self.interrupted(signal, state));
            }

            state.attempt += 1;
            self.subscribers.emit(
                Event::new(EventKind::AttemptStarting)
                    .with_command(self.executor.program())
                    .with_attempt(state.attempt),
            );

            let outcome = self
                .executor
                .run(&mut self.relay, &self.subscribers)
                .await?;

            if let Some(signal) = self.relay.received() {
                return Ok(self.interrupted(signal, state));
            }

            let status = SignalRelay::synthesize(&outcome);
            let attempt = state.attempt;
            let Some(failure) = self.record(outcome, &mut state) else {
                return Ok(RunSummary::new(status, state));
            };

            if !(failure.is_retryable() && self.scheduler.should_retry(attempt)) {
                self.subscribers.emit(
                    Event::new(EventKind::RetriesExhausted)
                        .with_command(self.executor.program())
                        .with_attempt(attempt)
                        .with_failure(failure),
                );
                return Ok(RunSummary::new(status, state));
            }

            let delay = self.scheduler.next_delay(attempt);
            self.subscribers.emit(
                Event::new(EventKind::BackoffScheduled)
                    .with_command(self.executor.program())
                    .with_attempt(attempt)
                    .with_delay(delay)
                    .with_failure(failure),
            );

            if !delay.is_zero() {
                let sleep = time::sleep(delay);
                tokio::pin!(sleep);
                select! {
                    biased;
                    _ = self.relay.cancelled() => {}
                    _ = &mut sleep => {}
                }
            }
        }
    }

    /// Publishes the attempt's result and stores its failure in `state`.
    fn record<'s>(
        &self,
        outcome: ChildOutcome,
        state: &'s mut AttemptState,
    ) -> Option<&'s AttemptError> {
        let program = self.executor.program();
        state.last_failure = outcome.into_failure(program);
        let ev = match &state.last_failure {
            None => Event::new(EventKind::AttemptSucceeded),
            Some(err) => Event::new(EventKind::AttemptFailed).with_failure(err),
        };
        self.subscribers
            .emit(ev.with_command(program).with_attempt(state.attempt));
        state.last_failure.as_ref()
    }

    fn interrupted(&self, signal: i32, mut state: AttemptState) -> RunSummary {
        self.subscribers
            .emit(Event::new(EventKind::SignalReceived).with_signal(signal));
        state.last_failure = Some(AttemptError::ExternalSignal { signal });
        RunSummary::new(TerminalStatus::TerminatedBySignal(signal), state)
    }
}
