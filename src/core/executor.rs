//! # Run a single attempt of the supervised command.
//!
//! [`Executor::run`] spawns one child, waits for it, and reports how it ended as a
//! [`ChildOutcome`]. Standard streams are inherited unmodified.
//!
//! ## Flow
//! ```text
//! spawn(argv) ──Err──► SpawnFailed{error}
//!     │
//!     Ok ──► relay.attach(pid)
//!     │
//!     loop select! {
//!         child.wait()        ──► break
//!         relay.next_signal() ──► kill(pid, sig), publish SignalForwarded
//!     }
//!     │
//!     relay.detach() ──► Success | ExitedNonZero{code} | Killed{signal}
//! ```
//!
//! ## Rules
//! - Exactly one child is alive at a time; its pid is attached to the relay for
//!   the whole wait and detached only after it has been reaped.
//! - Every signal the relay hands out while the child runs is forwarded, so a
//!   child that ignores the first `SIGINT` still sees the second.
//! - A spawn failure is an outcome, never an `Err`.

use std::{io, process::ExitStatus};

use tokio::process::Command;

use crate::{
    core::relay::SignalRelay,
    error::{AttemptError, RetryError},
    events::{Event, EventKind},
    subscribers::SubscriberSet,
};

/// How one attempt ended.
#[derive(Debug)]
pub enum ChildOutcome {
    /// Exited with status 0.
    Success,
    /// Exited normally with a non-zero status.
    ExitedNonZero {
        /// The exit status code.
        code: i32,
    },
    /// Terminated by a signal without calling exit.
    Killed {
        /// Raw signal number.
        signal: i32,
    },
    /// The program could not be started.
    SpawnFailed {
        /// The OS error from spawning.
        error: io::Error,
    },
}

impl ChildOutcome {
    /// Classifies a reaped child's exit status.
    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(0) => ChildOutcome::Success,
            Some(code) => ChildOutcome::ExitedNonZero { code },
            None => match exit_signal(&status) {
                Some(signal) => ChildOutcome::Killed { signal },
                None => ChildOutcome::ExitedNonZero { code: 1 },
            },
        }
    }

    /// Converts a failing outcome into its [`AttemptError`]; `None` on success.
    pub fn into_failure(self, program: &str) -> Option<AttemptError> {
        match self {
            ChildOutcome::Success => None,
            ChildOutcome::ExitedNonZero { code } => Some(AttemptError::NonZeroExit { code }),
            ChildOutcome::Killed { signal } => Some(AttemptError::SignalDeath { signal }),
            ChildOutcome::SpawnFailed { error } => Some(AttemptError::Spawn {
                program: program.to_string(),
                source: error,
            }),
        }
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

/// Spawns the supervised command, one attempt per [`run`](Executor::run) call.
#[derive(Clone, Debug)]
pub struct Executor {
    argv: Vec<String>,
}

impl Executor {
    /// Creates an executor for `argv`; `argv[0]` is the program.
    pub fn new(argv: Vec<String>) -> Result<Self, RetryError> {
        match argv.first() {
            Some(program) if !program.is_empty() => Ok(Self { argv }),
            _ => Err(RetryError::EmptyCommand),
        }
    }

    /// The program name (`argv[0]`).
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Runs one attempt and waits for it to terminate.
    ///
    /// Signals delivered through `relay` while the child runs are forwarded to it.
    /// Only a failure to wait on an already spawned child is an `Err`.
    pub async fn run(
        &self,
        relay: &mut SignalRelay,
        subscribers: &SubscriberSet,
    ) -> Result<ChildOutcome, RetryError> {
        let mut child = match Command::new(&self.argv[0]).args(&self.argv[1..]).spawn() {
            Ok(child) => child,
            Err(error) => return Ok(ChildOutcome::SpawnFailed { error }),
        };
        relay.attach(child.id());

        let status = loop {
            tokio::select! {
                biased;
                res = child.wait() => break res,
                signal = relay.next_signal() => {
                    #[cfg(unix)]
                    forward(relay, signal, subscribers);
                    #[cfg(not(unix))]
                    forward(&mut child, relay, signal, subscribers);
                }
            }
        };
        relay.detach();

        let status = status.map_err(|source| RetryError::Wait { source })?;
        Ok(ChildOutcome::from_status(status))
    }
}

#[cfg(unix)]
fn forward(relay: &SignalRelay, signal: i32, subscribers: &SubscriberSet) {
    // ESRCH: the child exited between wakeups; its wait() reports how.
    if let Ok(Some(pid)) = relay.forward(signal) {
        subscribers.emit(
            Event::new(EventKind::SignalForwarded)
                .with_signal(signal)
                .with_pid(pid),
        );
    }
}

/// No pid-addressed signals here: any termination signal kills the child.
#[cfg(not(unix))]
fn forward(
    child: &mut tokio::process::Child,
    relay: &SignalRelay,
    signal: i32,
    subscribers: &SubscriberSet,
) {
    if child.start_kill().is_ok() {
        let mut ev = Event::new(EventKind::SignalForwarded).with_signal(signal);
        if let Some(pid) = relay.active_child() {
            ev = ev.with_pid(pid);
        }
        subscribers.emit(ev);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    async fn run(parts: &[&str]) -> ChildOutcome {
        let exec = Executor::new(argv(parts)).unwrap();
        let mut relay = SignalRelay::detached();
        let subs = SubscriberSet::default();
        exec.run(&mut relay, &subs).await.unwrap()
    }

    #[test]
    fn test_empty_argv_rejected() {
        assert!(matches!(
            Executor::new(vec![]),
            Err(RetryError::EmptyCommand)
        ));
        assert!(matches!(
            Executor::new(vec![String::new()]),
            Err(RetryError::EmptyCommand)
        ));
    }

    #[tokio::test]
    async fn test_success() {
        assert!(matches!(run(&["true"]).await, ChildOutcome::Success));
    }

    #[tokio::test]
    async fn test_non_zero_exit() {
        match run(&["sh", "-c", "exit 3"]).await {
            ChildOutcome::ExitedNonZero { code } => assert_eq!(code, 3),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_killed_by_signal() {
        match run(&["sh", "-c", "kill -TERM $$"]).await {
            ChildOutcome::Killed { signal } => assert_eq!(signal, 15),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_spawn_failure_is_an_outcome() {
        match run(&["/definitely/not/a/real/program"]).await {
            ChildOutcome::SpawnFailed { error } => {
                assert_eq!(error.kind(), io::ErrorKind::NotFound)
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_signal_is_forwarded_to_child() {
        let exec = Executor::new(argv(&["sleep", "10"])).unwrap();
        let mut relay = SignalRelay::detached();
        let subs = SubscriberSet::default();

        let trigger = relay.handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.fire(15);
        });

        let started = Instant::now();
        let outcome = exec.run(&mut relay, &subs).await.unwrap();
        match outcome {
            ChildOutcome::Killed { signal } => assert_eq!(signal, 15),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(relay.active_child(), None);
    }

    #[tokio::test]
    async fn test_repeated_signal_reaches_stubborn_child() {
        let script = "trap 'trap - INT' INT; while :; do sleep 0.05; done";
        let exec = Executor::new(argv(&["sh", "-c", script])).unwrap();
        let mut relay = SignalRelay::detached();
        let subs = SubscriberSet::default();

        let trigger = relay.handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.fire(2);
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.fire(2);
        });

        let outcome = tokio::time::timeout(Duration::from_secs(5), exec.run(&mut relay, &subs))
            .await
            .expect("second SIGINT should end the child")
            .unwrap();
        assert!(matches!(outcome, ChildOutcome::Killed { signal: 2 }), "{outcome:?}");
    }

    #[tokio::test]
    async fn test_into_failure() {
        assert!(ChildOutcome::Success.into_failure("x").is_none());
        let err = ChildOutcome::Killed { signal: 9 }.into_failure("x").unwrap();
        assert_eq!(err.as_label(), "attempt_signal_death");
    }
}
