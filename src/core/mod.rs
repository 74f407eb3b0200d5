//! Runtime core: configuration, context and orchestration.
//!
//! Internal modules:
//! - [`config`]: table and runtime settings with validation;
//! - [`clock`]: monotonic millisecond clock started once per run;
//! - [`context`]: per-run shared context and the start gate;
//! - [`coordinator`]: builds the table, releases it, polls, shuts down;
//! - [`builder`]: fluent construction of the coordinator;
//! - [`shutdown`]: OS signal handling.

mod builder;
mod clock;
mod config;
mod context;
mod coordinator;
mod shutdown;

pub use builder::CoordinatorBuilder;
pub use clock::Clock;
pub use config::Config;
pub use context::{StartGate, TableContext};
pub use coordinator::{Coordinator, Outcome, Verdict};
