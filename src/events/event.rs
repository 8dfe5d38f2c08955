//! # Events emitted by the orchestrator while it drives attempts.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Attempt events**: one attempt's lifecycle (starting, succeeded, failed)
//! - **Scheduling events**: backoff decisions and retry exhaustion
//! - **Signal events**: signals received by the supervisor and forwarded to the child
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! program name, the attempt number, and backoff delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use retry_cli::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_command("ls")
//!     .with_attempt(2)
//!     .with_delay(Duration::from_millis(200))
//!     .with_reason("exited with code 2");
//!
//! assert_eq!(ev.kind, EventKind::BackoffScheduled);
//! assert_eq!(ev.command.as_deref(), Some("ls"));
//! assert_eq!(ev.delay_ms, Some(200));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::error::AttemptError;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Attempt events ===
    /// An attempt is about to spawn the command.
    ///
    /// Sets:
    /// - `command`: program name
    /// - `attempt`: attempt number (1-based)
    AttemptStarting,

    /// The command exited with status 0.
    ///
    /// Sets:
    /// - `command`, `attempt`
    AttemptSucceeded,

    /// The attempt failed (spawn error, non-zero exit, or signal death).
    ///
    /// Sets:
    /// - `command`, `attempt`
    /// - `label`, `reason`: failure kind and message
    AttemptFailed,

    // === Scheduling events ===
    /// Next attempt scheduled after a failure.
    ///
    /// Sets:
    /// - `command`
    /// - `attempt`: the attempt that just failed
    /// - `delay_ms`: delay before the next attempt (ms)
    /// - `label`, `reason`: last failure kind and message
    BackoffScheduled,

    /// No retries left; the supervisor is about to terminate.
    ///
    /// Sets:
    /// - `command`, `attempt`
    /// - `label`, `reason`: last failure kind and message
    RetriesExhausted,

    // === Signal events ===
    /// The supervisor received a termination signal.
    ///
    /// Sets:
    /// - `signal`: raw signal number
    SignalReceived,

    /// A received signal was delivered to the running child.
    ///
    /// Sets:
    /// - `signal`: raw signal number
    /// - `pid`: child process id
    SignalForwarded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Program being supervised.
    pub command: Option<Arc<str>>,
    /// Attempt number (starting from 1).
    pub attempt: Option<u64>,
    /// Backoff delay before next attempt in milliseconds.
    pub delay_ms: Option<u64>,
    /// Human-readable reason (failure message).
    pub reason: Option<Arc<str>>,
    /// Stable failure label, see [`AttemptError::as_label`].
    pub label: Option<&'static str>,
    /// Raw signal number.
    pub signal: Option<i32>,
    /// Child process id.
    pub pid: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            command: None,
            attempt: None,
            delay_ms: None,
            reason: None,
            label: None,
            signal: None,
            pid: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a failed attempt's label and message.
    #[inline]
    pub fn with_failure(self, err: &AttemptError) -> Self {
        let mut ev = self.with_reason(err.to_string());
        ev.label = Some(err.as_label());
        ev
    }

    /// Attaches the program name.
    #[inline]
    pub fn with_command(mut self, command: impl Into<Arc<str>>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u64::MAX)) as u64;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches an attempt number.
    #[inline]
    pub fn with_attempt(mut self, n: u64) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a signal number.
    #[inline]
    pub fn with_signal(mut self, signal: i32) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Attaches a child process id.
    #[inline]
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::AttemptStarting);
        let b = Event::new(EventKind::AttemptFailed);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builder_sets_fields() {
        let ev = Event::new(EventKind::SignalForwarded)
            .with_signal(15)
            .with_pid(4242);
        assert_eq!(ev.signal, Some(15));
        assert_eq!(ev.pid, Some(4242));
        assert!(ev.command.is_none());
    }

    #[test]
    fn test_failure_sets_label_and_reason() {
        let ev = Event::new(EventKind::AttemptFailed)
            .with_failure(&AttemptError::NonZeroExit { code: 2 });
        assert_eq!(ev.label, Some("attempt_non_zero_exit"));
        assert_eq!(ev.reason.as_deref(), Some("exited with code 2"));
    }
}
