//! Simulation events: types, ordered sink and the lossless bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`], [`Side`] event classification and payload
//! - [`EventSink`] mutex-serialized recorder with the global halt flag
//! - [`Bus`] lossless unbounded channel from the sink to the coordinator
//!
//! ## Quick reference
//! - **Publishers**: philosopher dine duties and watchdogs, through `EventSink::record`.
//! - **Consumers**: the coordinator's listener, which fans events out to the
//!   [`SubscriberSet`](crate::SubscriberSet).

mod bus;
mod event;
mod sink;

pub use bus::{Bus, BusReceiver};
pub use event::{Event, EventKind, Side};
pub use sink::{Death, EventSink};
