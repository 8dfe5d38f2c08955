//! # SignalRelay: bridges OS signals into the attempt loop and back out.
//!
//! The relay has two jobs.
//!
//! **Inbound forwarding.** A listener task turns every termination signal the
//! supervisor receives into two things: a cancelled [`CancellationToken`] (sticky,
//! so a signal that lands between "child exited" and "timer started" is still
//! seen before the next spawn) and a new value on a `watch` channel (so repeated
//! signals are forwarded again to a child that survived the first one). While an
//! attempt runs, the executor [`attach`](SignalRelay::attach)es the child's pid
//! and [`forward`](SignalRelay::forward)s each delivery to it.
//!
//! **Outbound status synthesis.** Once no more attempts will run,
//! [`SignalRelay::synthesize`] turns the last [`ChildOutcome`] into a
//! [`TerminalStatus`], and [`TerminalStatus::terminate`] ends the process with it:
//!
//! ```text
//! Success            ─► ExitCode(0)
//! ExitedNonZero{n}   ─► ExitCode(n)
//! Killed{s}          ─► TerminatedBySignal(s) ─► raise(s) on self
//!                                                  └─ still alive? exit(128 + s)
//! SpawnFailed{_}     ─► ExitCode(1)
//! external signal s  ─► TerminatedBySignal(s)
//! ```

#[cfg(unix)]
use std::io;
use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{core::executor::ChildOutcome, core::shutdown::ShutdownSignals, error::RetryError};

/// Final, externally observable outcome of the whole supervised run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalStatus {
    /// Exit normally with this status code.
    ExitCode(i32),
    /// Die from this signal, mirroring the child's death mode.
    TerminatedBySignal(i32),
}

impl TerminalStatus {
    /// Numeric exit code equivalent: the code itself, or `128 + signal`.
    ///
    /// # Example
    /// ```
    /// use retry_cli::TerminalStatus;
    ///
    /// assert_eq!(TerminalStatus::ExitCode(3).code(), 3);
    /// assert_eq!(TerminalStatus::TerminatedBySignal(15).code(), 143);
    /// ```
    pub fn code(&self) -> i32 {
        match *self {
            TerminalStatus::ExitCode(code) => code,
            TerminalStatus::TerminatedBySignal(signal) => 128 + signal,
        }
    }

    /// Terminates the current process with this status.
    ///
    /// For [`TerminalStatus::TerminatedBySignal`] the signal is re-raised against
    /// the supervisor with its default disposition restored. If the process
    /// survives that (the signal's default action is not to terminate, or the
    /// platform cannot raise it), it exits with `128 + signal` instead.
    pub fn terminate(self) -> ! {
        if let TerminalStatus::TerminatedBySignal(signal) = self {
            raise_default(signal);
        }
        std::process::exit(self.code())
    }
}

#[cfg(unix)]
fn raise_default(signal: i32) {
    use nix::sys::signal::Signal;

    if signal == Signal::SIGKILL as i32 {
        let _ = signal_hook::low_level::raise(signal);
    } else {
        let _ = signal_hook::low_level::emulate_default_handler(signal);
    }
}

#[cfg(not(unix))]
fn raise_default(_signal: i32) {}

/// Cloneable handle that injects a termination signal into a [`SignalRelay`].
///
/// The OS listener task holds one; embedders and tests can take another via
/// [`SignalRelay::handle`] and fire it from anywhere.
#[derive(Clone, Debug)]
pub struct SignalTrigger {
    tx: Arc<watch::Sender<Option<i32>>>,
    token: CancellationToken,
}

impl SignalTrigger {
    /// Records `signal` as received by the supervisor and cancels the token.
    pub fn fire(&self, signal: i32) {
        self.tx.send_replace(Some(signal));
        self.token.cancel();
    }
}

/// Shared cancellation state between the OS listener and the attempt loop.
///
/// Owned by the orchestrator; the executor borrows it mutably for the duration
/// of one attempt.
pub struct SignalRelay {
    trigger: SignalTrigger,
    rx: watch::Receiver<Option<i32>>,
    active: Option<u32>,
    listener: Option<JoinHandle<()>>,
}

impl SignalRelay {
    /// Creates a relay that is not connected to OS signals.
    ///
    /// Signals can still be injected through [`handle`](Self::handle), which is
    /// how embedders and tests drive it.
    pub fn detached() -> Self {
        let (tx, rx) = watch::channel(None);
        Self {
            trigger: SignalTrigger {
                tx: Arc::new(tx),
                token: CancellationToken::new(),
            },
            rx,
            active: None,
            listener: None,
        }
    }

    /// Creates a relay and starts listening for termination signals.
    ///
    /// Must be called from within a tokio runtime, before the first attempt.
    pub fn install() -> Result<Self, RetryError> {
        let mut signals =
            ShutdownSignals::install().map_err(|source| RetryError::SignalSetup { source })?;
        let mut relay = Self::detached();

        let trigger = relay.handle();
        relay.listener = Some(tokio::spawn(async move {
            loop {
                trigger.fire(signals.recv().await);
            }
        }));
        Ok(relay)
    }

    /// A handle that can inject signals while the relay is borrowed by an attempt.
    pub fn handle(&self) -> SignalTrigger {
        self.trigger.clone()
    }

    /// The most recent signal received, if any.
    pub fn received(&self) -> Option<i32> {
        *self.rx.borrow()
    }

    /// Completes once a termination signal has been received (immediately if one already was).
    pub async fn cancelled(&self) {
        self.trigger.token.cancelled().await
    }

    /// Waits for a signal that has not been handed out yet and returns it.
    ///
    /// Cancel safe: used inside `select!` alongside the child's `wait`.
    pub(crate) async fn next_signal(&mut self) -> i32 {
        loop {
            if self.rx.changed().await.is_err() {
                return std::future::pending::<i32>().await;
            }
            if let Some(signal) = *self.rx.borrow_and_update() {
                return signal;
            }
        }
    }

    /// Registers the pid of the child that is currently running.
    pub(crate) fn attach(&mut self, pid: Option<u32>) {
        self.active = pid;
    }

    /// Clears the registered child once it has been reaped.
    pub(crate) fn detach(&mut self) {
        self.active = None;
    }

    /// The pid of the child currently running, if any.
    pub fn active_child(&self) -> Option<u32> {
        self.active
    }

    /// Delivers `signal` to the attached child.
    ///
    /// Returns the pid it was sent to, or `None` if no child is attached.
    #[cfg(unix)]
    pub(crate) fn forward(&self, signal: i32) -> io::Result<Option<u32>> {
        use nix::{sys::signal::Signal, unistd::Pid};

        let Some(pid) = self.active else {
            return Ok(None);
        };
        let signal = Signal::try_from(signal).map_err(io::Error::from)?;
        let raw = i32::try_from(pid).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        nix::sys::signal::kill(Pid::from_raw(raw), signal).map_err(io::Error::from)?;
        Ok(Some(pid))
    }

    /// Maps the last attempt's outcome onto the status the supervisor exits with.
    pub fn synthesize(outcome: &ChildOutcome) -> TerminalStatus {
        match outcome {
            ChildOutcome::Success => TerminalStatus::ExitCode(0),
            ChildOutcome::ExitedNonZero { code } => TerminalStatus::ExitCode(*code),
            ChildOutcome::Killed { signal } => TerminalStatus::TerminatedBySignal(*signal),
            ChildOutcome::SpawnFailed { .. } => TerminalStatus::ExitCode(1),
        }
    }
}

impl Drop for SignalRelay {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{io, time::Duration};

    #[test]
    fn test_synthesize_maps_every_outcome() {
        assert_eq!(
            SignalRelay::synthesize(&ChildOutcome::Success),
            TerminalStatus::ExitCode(0)
        );
        assert_eq!(
            SignalRelay::synthesize(&ChildOutcome::ExitedNonZero { code: 2 }),
            TerminalStatus::ExitCode(2)
        );
        assert_eq!(
            SignalRelay::synthesize(&ChildOutcome::Killed { signal: 9 }),
            TerminalStatus::TerminatedBySignal(9)
        );
        assert_eq!(
            SignalRelay::synthesize(&ChildOutcome::SpawnFailed {
                error: io::Error::from(io::ErrorKind::NotFound)
            }),
            TerminalStatus::ExitCode(1)
        );
    }

    #[test]
    fn test_signal_fallback_code() {
        assert_eq!(TerminalStatus::TerminatedBySignal(2).code(), 130);
        assert_eq!(TerminalStatus::TerminatedBySignal(9).code(), 137);
        assert_eq!(TerminalStatus::ExitCode(0).code(), 0);
    }

    #[tokio::test]
    async fn test_trigger_cancels_and_records() {
        let relay = SignalRelay::detached();
        assert_eq!(relay.received(), None);

        relay.handle().fire(15);
        assert_eq!(relay.received(), Some(15));
        tokio::time::timeout(Duration::from_secs(1), relay.cancelled())
            .await
            .expect("token should already be cancelled");
    }

    #[tokio::test]
    async fn test_next_signal_sees_signal_sent_before_waiting() {
        let mut relay = SignalRelay::detached();
        let trigger = relay.handle();
        trigger.fire(2);
        let sig = tokio::time::timeout(Duration::from_secs(1), relay.next_signal())
            .await
            .expect("pending signal must not be dropped");
        assert_eq!(sig, 2);

        let again = tokio::time::timeout(Duration::from_millis(50), relay.next_signal()).await;
        assert!(again.is_err(), "a signal is handed out once");

        trigger.fire(2);
        assert_eq!(relay.next_signal().await, 2);
    }

    #[test]
    fn test_forward_without_child_is_noop() {
        let relay = SignalRelay::detached();
        assert_eq!(relay.active_child(), None);
        #[cfg(unix)]
        assert_eq!(relay.forward(15).unwrap(), None);
    }
}
