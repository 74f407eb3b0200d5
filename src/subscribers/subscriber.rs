//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] the extension point for consuming the simulation
//! event stream (printing, recording, statistics).
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently of the philosophers)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics are caught and logged)
//!
//! ## Rules
//! - Every event reaches every subscriber, in stream order.
//! - A full queue makes the coordinator's listener wait; the philosophers
//!   keep running, since the sink publishes onto an unbounded bus.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use philosophers::{Event, EventKind, Subscribe};
//!
//! struct DeathBell;
//!
//! #[async_trait]
//! impl Subscribe for DeathBell {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::Died) {
//!             eprintln!("\x07philosopher {} starved", ev.philosopher);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "death-bell" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Consumer of the simulation event stream.
///
/// ### Implementation requirements
/// - Avoid blocking the executor for long; the worker is a tokio task.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, in stream order.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in diagnostics.
    ///
    /// The default uses `type_name::<Self>()`; override it with something short.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber (clamped to at least 1).
    ///
    /// Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
