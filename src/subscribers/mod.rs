//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`]
//! fan-out and the built-in subscribers.
//!
//! ## Architecture
//! ```text
//! EventSink ──► Bus ──► coordinator listener ──► SubscriberSet::emit(&Event)
//!                                                    │
//!                                         ┌──────────┼──────────┐
//!                                         ▼          ▼          ▼
//!                                     LogWriter   Journal    custom ...
//! ```
//!
//! ## Built-in subscribers
//! - [`LogWriter`] prints the event stream to stdout
//! - [`Journal`] keeps the event stream in memory

mod journal;
mod log;
mod set;
mod subscriber;

pub use journal::Journal;
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
