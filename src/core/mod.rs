//! Runtime core: attempts, signals, orchestration.
//!
//! Internal modules:
//! - [`executor`]: spawns one child per attempt and reports its [`ChildOutcome`];
//! - [`relay`]: forwards termination signals to the child and synthesizes the [`TerminalStatus`];
//! - [`orchestrator`]: runs the attempt loop with retry limit and backoff;
//! - [`shutdown`]: cross-platform termination signal listeners.

mod executor;
mod orchestrator;
mod relay;
mod shutdown;

pub use executor::{ChildOutcome, Executor};
pub use orchestrator::{AttemptState, Orchestrator, RunSummary};
pub use relay::{SignalRelay, SignalTrigger, TerminalStatus};
