//! # philosophers
//!
//! A dining-philosophers simulation engine on tokio: N philosophers around a
//! ring of N forks, each needing both adjacent forks to eat, each with a
//! starvation deadline. A run ends when every philosopher has eaten its
//! quota or when one of them starves.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                        ┌─────────────────────────────────────┐
//!                        │  Coordinator                        │
//!                        │  - lays the fork ring               │
//!                        │  - opens the start gate             │
//!                        │  - polls death / quota / signals    │
//!                        │  - stops everyone, waits with grace │
//!                        └──────┬───────────────────────┬──────┘
//!                               ▼                       ▼
//!     ┌──────────────────────────────┐       ┌──────────────────────────────┐
//!     │ Philosopher 1                │  ...  │ Philosopher N                │
//!     │ ┌──────────┐ ┌─────────────┐ │       │ ┌──────────┐ ┌─────────────┐ │
//!     │ │ dine     │ │ watchdog    │ │       │ │ dine     │ │ watchdog    │ │
//!     │ │ eat/sleep│ │ deadline    │ │       │ │ eat/sleep│ │ deadline    │ │
//!     │ │ /think   │ │ check (1ms) │ │       │ │ /think   │ │ check (1ms) │ │
//!     │ └────┬─────┘ └──────┬──────┘ │       │ └────┬─────┘ └──────┬──────┘ │
//!     └──────┼──────────────┼────────┘       └──────┼──────────────┼────────┘
//!            │ fork[0], fork[1]                     │ fork[N-1], fork[0]
//!            ▼              ▼                       ▼              ▼
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │ EventSink (lock + seq + halt on `died`) ──► Bus (unbounded mpsc)       │
//! └───────────────────────────────────┬───────────────────────────────────┘
//!                                     ▼
//!                         ┌────────────────────────┐
//!                         │  coordinator listener  │
//!                         └───────────┬────────────┘
//!                                     ▼
//!                              SubscriberSet
//!                          ┌──────────┼──────────┐
//!                          ▼          ▼          ▼
//!                      LogWriter   Journal    custom
//! ```
//!
//! ### Deadlock and starvation avoidance
//! - **Asymmetric acquisition**: even ids take left then right, odd ids right
//!   then left, so no cycle of waits can form.
//! - **Staggered start**: even ids wait one meal; the last id of an odd table
//!   waits half a meal.
//! - **Bounded thinking**: odd tables think `2*eat - sleep`, tight even tables
//!   think 1ms, always capped to keep 10% of the deadline in reserve.
//!
//! ## Features
//! | Area              | Description                                              | Key types                                 |
//! |-------------------|----------------------------------------------------------|-------------------------------------------|
//! | **Coordination**  | Build, release, poll and stop one table.                 | [`Coordinator`], [`Outcome`], [`Verdict`] |
//! | **Actors**        | Dine and watchdog duties, fork protocol.                 | [`Philosopher`], [`Fork`]                 |
//! | **Events**        | Ordered, halting event stream.                           | [`EventSink`], [`Event`], [`EventKind`]   |
//! | **Subscribers**   | Consume the stream (print, record, custom).              | [`Subscribe`], [`LogWriter`], [`Journal`] |
//! | **Configuration** | Table and runtime settings.                              | [`Config`]                                |
//! | **Errors**        | Typed configuration and runtime errors.                  | [`ConfigError`], [`RuntimeError`]         |
//!
//! ## Optional features
//! - `color` (default): per-kind colors in [`LogWriter`] via `crossterm`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use philosophers::{Config, Coordinator, Journal, Verdict};
//!
//! #[tokio::main(flavor = "multi_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // One philosopher has a single fork: it always starves.
//!     let journal = Arc::new(Journal::new());
//!     let outcome = Coordinator::builder(Config::new(1, 50, 20, 20))
//!         .with_subscriber(journal.clone())
//!         .build()
//!         .run()
//!         .await?;
//!
//!     assert!(matches!(outcome.verdict, Verdict::Starved { philosopher: 1, .. }));
//!     assert_eq!(journal.deaths().await.len(), 1);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod subscribers;
mod table;

// ---- Public re-exports ----

pub use crate::core::{
    Clock, Config, Coordinator, CoordinatorBuilder, Outcome, StartGate, TableContext, Verdict,
};
pub use error::{ConfigError, RuntimeError};
pub use events::{Bus, BusReceiver, Death, Event, EventKind, EventSink, Side};
pub use subscribers::{Journal, LogWriter, Subscribe, SubscriberSet};
pub use table::{
    CROWDED_TABLE, Duty, DutyKind, FINE_TAIL, Fork, ForkGuard, Philosopher, Think, Timing, nap,
    stagger, think,
};
