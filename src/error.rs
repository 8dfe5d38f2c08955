//! Error types used by the retry runtime and by individual attempts.
//!
//! This module defines two main error enums:
//!
//! - [`RetryError`]: errors raised by the supervisor itself (bad config, signal setup, wait failure).
//! - [`AttemptError`]: why a single attempt of the command did not succeed.
//!
//! Attempt failures carry a stable [`AttemptError::as_label`] for log lines, and
//! [`AttemptError::is_retryable`] gates whether the orchestrator schedules another attempt.

use std::io;

use thiserror::Error;

/// # Errors produced by the retry runtime.
///
/// These represent failures of the supervisor, not of the supervised command.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RetryError {
    /// Configuration failed validation.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the configuration.
        reason: String,
    },

    /// No command was given to run.
    #[error("no command given")]
    EmptyCommand,

    /// Termination signal listeners could not be installed.
    #[error("failed to install signal handlers: {source}")]
    SignalSetup {
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Waiting on a spawned child failed.
    #[error("failed to wait for child process: {source}")]
    Wait {
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },
}

/// # Why one attempt of the command did not succeed.
///
/// The first three kinds are retried identically up to the configured limit;
/// the scheduler only counts attempts. [`AttemptError::ExternalSignal`] always
/// short-circuits retries.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AttemptError {
    /// The program could not be started (missing, not executable, permission denied).
    #[error("failed to spawn {program:?}: {source}")]
    Spawn {
        /// Program name as given on the command line.
        program: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The program ran and exited with a non-zero status code.
    #[error("exited with code {code}")]
    NonZeroExit {
        /// The exit status code.
        code: i32,
    },

    /// The program was terminated by an OS signal.
    #[error("killed by signal {signal}")]
    SignalDeath {
        /// Raw signal number.
        signal: i32,
    },

    /// The supervisor itself was asked to terminate.
    #[error("interrupted by signal {signal}")]
    ExternalSignal {
        /// Raw signal number received by the supervisor.
        signal: i32,
    },
}

impl AttemptError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use retry_cli::AttemptError;
    ///
    /// let err = AttemptError::NonZeroExit { code: 2 };
    /// assert_eq!(err.as_label(), "attempt_non_zero_exit");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            AttemptError::Spawn { .. } => "attempt_spawn_error",
            AttemptError::NonZeroExit { .. } => "attempt_non_zero_exit",
            AttemptError::SignalDeath { .. } => "attempt_signal_death",
            AttemptError::ExternalSignal { .. } => "attempt_external_signal",
        }
    }

    /// Indicates whether another attempt may follow this failure.
    ///
    /// Returns `true` for spawn errors, non-zero exits and signal deaths,
    /// `false` for [`AttemptError::ExternalSignal`].
    ///
    /// # Example
    /// ```
    /// use retry_cli::AttemptError;
    ///
    /// assert!(AttemptError::SignalDeath { signal: 9 }.is_retryable());
    /// assert!(!AttemptError::ExternalSignal { signal: 15 }.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        !matches!(self, AttemptError::ExternalSignal { .. })
    }
}
