//! The table: forks, philosophers and the rules they follow.
//!
//! ## Contents
//! - [`Fork`], [`ForkGuard`] exclusive resources with holder tracking
//! - [`Philosopher`] the actor running the dine and watchdog duties
//! - [`Timing`], [`Think`] phase durations and the thinking decision
//! - `nap` the cancellable delay used by every dine-duty wait
//! - `schedule` stagger and think-time rules

mod fork;
mod nap;
mod philosopher;
mod schedule;

pub use fork::{Fork, ForkGuard};
pub use nap::{FINE_TAIL, nap};
pub use philosopher::{Duty, DutyKind, Philosopher};
pub use schedule::{CROWDED_TABLE, Think, Timing, stagger, think};
