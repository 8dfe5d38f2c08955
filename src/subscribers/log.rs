//! # LogWriter: one stderr line per event
//!
//! A minimal subscriber that prints incoming [`Event`]s to **stderr**.
//! Stdout belongs to the supervised command and is never touched.
//!
//! ## Example output
//! ```text
//! [starting] cmd="ls" attempt=1
//! [failed] cmd="ls" kind=attempt_non_zero_exit err="exited with code 2" attempt=1
//! [backoff] cmd="ls" delay=100ms after_attempt=1 kind=attempt_non_zero_exit err="exited with code 2"
//! [signal] sig=15
//! [forwarded] sig=15 pid=4242
//! [exhausted] cmd="ls" attempts=4 kind=attempt_non_zero_exit err="exited with code 2"
//! [succeeded] cmd="ls" attempt=2
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders one event as a single log line.
    pub fn format(e: &Event) -> String {
        let cmd = e.command.as_deref().unwrap_or("?");
        let err = e.reason.as_deref().unwrap_or("");
        let kind = e.label.unwrap_or("unknown");
        let attempt = e.attempt.unwrap_or(0);
        match e.kind {
            EventKind::AttemptStarting => format!("[starting] cmd={cmd:?} attempt={attempt}"),
            EventKind::AttemptSucceeded => format!("[succeeded] cmd={cmd:?} attempt={attempt}"),
            EventKind::AttemptFailed => {
                format!("[failed] cmd={cmd:?} kind={kind} err={err:?} attempt={attempt}")
            }
            EventKind::BackoffScheduled => format!(
                "[backoff] cmd={cmd:?} delay={}ms after_attempt={attempt} kind={kind} err={err:?}",
                e.delay_ms.unwrap_or(0)
            ),
            EventKind::RetriesExhausted => {
                format!("[exhausted] cmd={cmd:?} attempts={attempt} kind={kind} err={err:?}")
            }
            EventKind::SignalReceived => format!("[signal] sig={}", e.signal.unwrap_or(0)),
            EventKind::SignalForwarded => format!(
                "[forwarded] sig={} pid={}",
                e.signal.unwrap_or(0),
                e.pid.unwrap_or(0)
            ),
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        eprintln!("{}", Self::format(e));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
