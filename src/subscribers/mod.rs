//! # Observers of the attempt loop.
//!
//! The orchestrator reports progress as [`Event`]s. It never waits on an
//! observer: [`SubscriberSet`] queues each event for one background worker,
//! which hands it to every [`Subscribe`] in registration order.
//!
//! ```text
//! Orchestrator ── emit(Event) ──► SubscriberSet ──► worker ──► LogWriter (stderr)
//!                                                          └─► custom subscribers
//! ```
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use retry_cli::{Event, EventKind, Subscribe};
//!
//! struct Failures;
//!
//! #[async_trait]
//! impl Subscribe for Failures {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::AttemptFailed {
//!             eprintln!("attempt {:?} failed: {:?}", ev.attempt, ev.label);
//!         }
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

mod log;
mod set;

pub use log::LogWriter;
pub use set::SubscriberSet;

/// Receives attempt lifecycle events.
///
/// Stdout belongs to the supervised command; implementations must not write to it.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    async fn on_event(&self, event: &Event);

    /// Name used when reporting a panic in [`on_event`](Subscribe::on_event).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
