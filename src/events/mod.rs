//! Runtime events: types emitted by the orchestrator.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publishers**: `Orchestrator` (attempts, backoff, signals), `SubscriberSet`
//!   workers (panics).
//! - **Consumers**: every [`Subscribe`](crate::Subscribe) in the `SubscriberSet`.

mod event;

pub use event::{Event, EventKind};
