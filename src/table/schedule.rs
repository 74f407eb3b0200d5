//! # Scheduling rules of the dine cycle.
//!
//! Pure functions deciding **how long** a philosopher waits outside the
//! eating phase:
//! - [`stagger`] the one-time delay before the first eating attempt;
//! - [`think`] the pause between waking up and the next attempt.
//!
//! Both are tuned to desynchronize neighbours: even seats start one meal
//! late, the last seat of an odd table starts half a meal late, and odd
//! tables think long enough for both neighbours to eat once more.
//!
//! ## Think time
//! ```text
//! odd table:   think = 2*eat - sleep
//! even table:  think = 1ms if die - (eat + sleep) < 50ms, else 0
//!
//! think    = max(think, 0)
//! buffer   = die - eat - sleep
//! maxThink = buffer - die/10          (10% of the deadline stays in reserve)
//! if think > maxThink and maxThink > 0: think = maxThink
//!
//! think > 0          → Nap(think)
//! think = 0, N > 50  → ForcedSleep (1ms)
//! think = 0          → Yield
//! ```

use std::time::Duration;

use crate::core::Config;

/// Phase durations and starvation deadline of a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Starvation deadline, measured from the last eating start.
    pub die: Duration,
    /// Meal duration.
    pub eat: Duration,
    /// Sleep duration.
    pub sleep: Duration,
}

impl Timing {
    /// Creates a timing from milliseconds.
    pub fn from_millis(die: u64, eat: u64, sleep: u64) -> Self {
        Self {
            die: Duration::from_millis(die),
            eat: Duration::from_millis(eat),
            sleep: Duration::from_millis(sleep),
        }
    }

    /// Extracts the timing of a [`Config`].
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            die: cfg.time_to_die,
            eat: cfg.time_to_eat,
            sleep: cfg.time_to_sleep,
        }
    }

    /// Signed milliseconds, saturated at `i64::MAX`.
    #[inline]
    fn millis(&self) -> (i64, i64, i64) {
        let ms = |d: Duration| i64::try_from(d.as_millis()).unwrap_or(i64::MAX);
        (ms(self.die), ms(self.eat), ms(self.sleep))
    }
}

/// What a philosopher does in its thinking phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Think {
    /// Cancellable delay of the given length.
    Nap(Duration),
    /// One-millisecond sleep; large tables need a real context switch.
    ForcedSleep,
    /// A single scheduler yield.
    Yield,
}

/// Tables above this size replace the yield with [`Think::ForcedSleep`].
pub const CROWDED_TABLE: usize = 50;

/// Threshold (ms) under which an even table's schedule counts as tight.
const TIGHT_BUFFER_MS: i64 = 50;

/// Delay before the first eating attempt of philosopher `id` (1-based).
pub fn stagger(id: usize, population: usize, timing: &Timing) -> Duration {
    if id % 2 == 0 {
        timing.eat
    } else if population % 2 != 0 && id == population {
        Duration::from_millis(timing.eat.as_millis() as u64 / 2)
    } else {
        Duration::ZERO
    }
}

/// Thinking phase for a table of `population` philosophers.
pub fn think(population: usize, timing: &Timing) -> Think {
    let (die, eat, sleep) = timing.millis();

    let buffer = die.saturating_sub(eat.saturating_add(sleep));
    let mut think = if population % 2 != 0 {
        eat.saturating_mul(2).saturating_sub(sleep)
    } else if buffer < TIGHT_BUFFER_MS {
        1
    } else {
        0
    };
    if think < 0 {
        think = 0;
    }

    let max_think = buffer.saturating_sub(die / 10);
    if think > max_think && max_think > 0 {
        think = max_think;
    }

    if think > 0 {
        Think::Nap(Duration::from_millis(think as u64))
    } else if population > CROWDED_TABLE {
        Think::ForcedSleep
    } else {
        Think::Yield
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nap(ms: u64) -> Think {
        Think::Nap(Duration::from_millis(ms))
    }

    #[test]
    fn even_seats_wait_one_meal() {
        let t = Timing::from_millis(800, 200, 200);
        assert_eq!(stagger(2, 5, &t), Duration::from_millis(200));
        assert_eq!(stagger(4, 4, &t), Duration::from_millis(200));
    }

    #[test]
    fn last_seat_of_odd_table_waits_half_a_meal() {
        let t = Timing::from_millis(800, 201, 200);
        assert_eq!(stagger(5, 5, &t), Duration::from_millis(100));
        assert_eq!(stagger(1, 1, &t), Duration::from_millis(100));
    }

    #[test]
    fn other_odd_seats_start_immediately() {
        let t = Timing::from_millis(800, 200, 200);
        assert_eq!(stagger(1, 5, &t), Duration::ZERO);
        assert_eq!(stagger(3, 5, &t), Duration::ZERO);
        assert_eq!(stagger(5, 6, &t), Duration::ZERO);
    }

    #[test]
    fn odd_table_leaves_room_for_two_neighbour_meals() {
        assert_eq!(think(5, &Timing::from_millis(800, 200, 200)), nap(200));
        // maxThink is negative here, so no clamping happens.
        assert_eq!(think(5, &Timing::from_millis(410, 200, 200)), nap(200));
    }

    #[test]
    fn odd_table_think_is_clamped_to_safety_margin() {
        // think = 300, buffer = 310, maxThink = 310 - 61 = 249
        assert_eq!(think(3, &Timing::from_millis(610, 200, 100)), nap(249));
    }

    #[test]
    fn odd_table_negative_think_becomes_yield() {
        assert_eq!(think(3, &Timing::from_millis(800, 100, 300)), Think::Yield);
    }

    #[test]
    fn even_table_tight_schedule_forces_one_millisecond() {
        assert_eq!(think(4, &Timing::from_millis(310, 200, 100)), nap(1));
        assert_eq!(think(4, &Timing::from_millis(300, 200, 200)), nap(1));
    }

    #[test]
    fn even_table_relaxed_schedule_only_yields() {
        assert_eq!(think(4, &Timing::from_millis(800, 200, 200)), Think::Yield);
        assert_eq!(think(200, &Timing::from_millis(800, 200, 200)), Think::ForcedSleep);
    }

    #[test]
    fn huge_timings_saturate_instead_of_wrapping() {
        let max = Timing::from_millis(u64::MAX, u64::MAX, u64::MAX);
        // Every field saturates at i64::MAX: buffer is 0 and odd think is 0.
        assert_eq!(think(5, &max), Think::Yield);
        assert_eq!(think(4, &max), nap(1));

        // die = i64::MAX, eat = 2^62: 2*eat saturates, then the margin clamps it.
        let long_meals = Timing::from_millis(u64::MAX, 1 << 62, 1);
        assert_eq!(think(3, &long_meals), nap(3_689_348_814_741_910_322));
        assert_eq!(stagger(3, 3, &long_meals), Duration::from_millis(1 << 61));
    }

    #[test]
    fn crowded_odd_table_still_naps() {
        assert_eq!(think(51, &Timing::from_millis(800, 200, 200)), nap(200));
        assert_eq!(think(51, &Timing::from_millis(800, 100, 300)), Think::ForcedSleep);
    }
}
