//! # Event bus carrying the simulation stream to the coordinator.
//!
//! [`Bus`] is the sending half of an unbounded [`tokio::sync::mpsc`] channel.
//! The only publisher is the [`EventSink`](super::EventSink), which sends
//! while holding its lock, so the receiver observes one total order.
//!
//! ## Architecture
//! ```text
//! Philosopher 1 ──┐
//! Philosopher 2 ──┼──► EventSink::record ──► Bus ──► coordinator listener ──► SubscriberSet
//! Watchdog N    ──┘     (lock + seq)       (mpsc)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and never awaits.
//! - **Lossless**: every published event reaches the receiver while it is alive.
//! - **Close on drop**: once every `Bus` clone is dropped, `recv()` returns `None`
//!   after the queued events are drained.

use tokio::sync::mpsc;

use super::event::Event;

/// Receiving half of a [`Bus`].
pub type BusReceiver = mpsc::UnboundedReceiver<Event>;

/// Unbounded, single-consumer channel for simulation events.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: mpsc::UnboundedSender<Event>,
}

impl Bus {
    /// Creates a bus and the receiver that drains it.
    pub fn channel() -> (Self, BusReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Publishes an event.
    ///
    /// The event is dropped only if the receiver is already gone.
    pub fn publish(&self, ev: Event) {
        if self.tx.send(ev).is_err() {
            tracing::trace!("event bus receiver closed");
        }
    }
}
