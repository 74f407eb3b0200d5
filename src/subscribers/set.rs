//! # SubscriberSet: lossless fan-out over multiple subscribers
//!
//! [`SubscriberSet`] hands each [`Event`] to every subscriber through a
//! dedicated bounded lane and worker task.
//!
//! ## Diagram
//! ```text
//!    emit(Event).await
//!        │                        (one Arc shared by all lanes)
//!        ├── send().await ──► [lane S1] ─► worker S1 ─► on_event()
//!        ├── send().await ──► [lane S2] ─► worker S2 ─► on_event()
//!        └── send().await ──► [lane SN] ─► worker SN ─► on_event()
//! ```
//!
//! ## Guarantees
//! - Every emitted event is delivered to every subscriber, in emit order.
//! - A full lane applies backpressure: `emit` waits for room instead of dropping.
//! - Panics inside a subscriber are caught and logged; its worker keeps going.
//! - [`SubscriberSet::shutdown`] returns only after every lane was drained.
//!
//! Subscribers run concurrently with each other; there is no ordering
//! between two different subscribers.

use std::{any::Any, sync::Arc};

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinSet};

use crate::events::Event;

use super::Subscribe;

/// Sending side of one subscriber's lane.
struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Fan-out with one bounded lane and one worker task per subscriber.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: JoinSet<&'static str>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker per subscriber.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut lanes = Vec::with_capacity(subs.len());
        let mut workers = JoinSet::new();

        for sub in subs {
            let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
            lanes.push(Lane {
                name: sub.name(),
                tx,
            });
            workers.spawn(drain(sub, rx));
        }

        Self { lanes, workers }
    }

    /// Delivers one event to every subscriber, waiting while a lane is full.
    pub async fn emit(&self, event: Event) {
        let ev = Arc::new(event);
        for lane in &self.lanes {
            if lane.tx.send(Arc::clone(&ev)).await.is_err() {
                tracing::warn!(
                    subscriber = lane.name,
                    seq = ev.seq,
                    kind = ev.kind.as_label(),
                    "subscriber worker gone, event not delivered"
                );
            }
        }
    }

    /// Closes every lane and waits until each worker has handled its backlog.
    pub async fn shutdown(mut self) {
        self.lanes.clear();
        while let Some(res) = self.workers.join_next().await {
            match res {
                Ok(name) => tracing::trace!(subscriber = name, "subscriber drained"),
                Err(e) => tracing::error!(error = %e, "subscriber worker failed"),
            }
        }
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }
}

/// Worker loop of one subscriber: runs until its lane is closed and empty.
async fn drain(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>) -> &'static str {
    while let Some(ev) = rx.recv().await {
        let handled = std::panic::AssertUnwindSafe(sub.on_event(&ev))
            .catch_unwind()
            .await;
        if let Err(panic) = handled {
            tracing::error!(
                subscriber = sub.name(),
                seq = ev.seq,
                kind = ev.kind.as_label(),
                info = %panic_message(panic.as_ref()),
                "subscriber panicked"
            );
        }
    }
    sub.name()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
