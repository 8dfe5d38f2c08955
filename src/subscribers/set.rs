//! # SubscriberSet: the orchestrator's event outlet.
//!
//! ```text
//! emit(Event) ──► [unbounded queue] ──► worker ──► subs[0].on_event ─► subs[1].on_event ─► ...
//! ```
//!
//! An attempt produces a handful of events, so the queue is unbounded and no
//! event is dropped. The worker delivers them in emission order. A subscriber
//! that panics is reported on stderr and skipped for that event only.
//! [`SubscriberSet::shutdown`] waits until everything emitted has been
//! delivered, which must happen before the supervisor terminates itself.

use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::Event;

use super::Subscribe;

/// Event queue plus the worker draining it; empty when nobody subscribed.
#[derive(Default)]
pub struct SubscriberSet {
    outlet: Option<Outlet>,
}

struct Outlet {
    tx: mpsc::UnboundedSender<Event>,
    worker: JoinHandle<()>,
}

impl SubscriberSet {
    /// Spawns the delivery worker for `subs`; no task is spawned for an empty list.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        if subs.is_empty() {
            return Self::default();
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(deliver(rx, subs));
        Self {
            outlet: Some(Outlet { tx, worker }),
        }
    }

    /// Queues `event` for every subscriber without waiting on any of them.
    pub fn emit(&self, event: Event) {
        if let Some(outlet) = &self.outlet {
            // Only fails after the worker is gone, i.e. after shutdown.
            let _ = outlet.tx.send(event);
        }
    }

    /// Closes the queue and waits until every emitted event has been delivered.
    pub async fn shutdown(self) {
        let Some(Outlet { tx, worker }) = self.outlet else {
            return;
        };
        drop(tx);
        if let Err(e) = worker.await {
            eprintln!("[retry] event worker stopped: {e}");
        }
    }
}

async fn deliver(mut rx: mpsc::UnboundedReceiver<Event>, subs: Vec<Arc<dyn Subscribe>>) {
    while let Some(event) = rx.recv().await {
        for sub in &subs {
            let handled = AssertUnwindSafe(sub.on_event(&event)).catch_unwind().await;
            if handled.is_err() {
                eprintln!(
                    "[retry] subscriber '{}' panicked on {:?}",
                    sub.name(),
                    event.kind
                );
            }
        }
    }
}
