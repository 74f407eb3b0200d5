//! # Monotonic simulation clock.
//!
//! [`Clock`] is started once per run by the coordinator, right before the
//! start gate opens. Every timestamp in the simulation (event stream,
//! `last_meal_start`, death detection) is a millisecond offset from that
//! instant.

use std::time::Duration;

use tokio::time::Instant;

/// Monotonic millisecond time source.
///
/// Cheap to copy; all copies share the same origin.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    /// Starts a new clock at the current instant.
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Milliseconds elapsed since [`Clock::start`].
    #[inline]
    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Time elapsed since [`Clock::start`].
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}
