//! # Simulation configuration.
//!
//! Provides [`Config`] centralized settings for one simulation run:
//! the table itself (population, timings, optional meal quota) and the
//! runtime knobs used by the coordinator (poll intervals, shutdown grace).
//!
//! Config is consumed by [`Coordinator::builder`](crate::Coordinator::builder)
//! and validated once at the start of [`Coordinator::run`](crate::Coordinator::run).
//!
//! ## Sentinel values
//! - `must_eat = None` → no quota, the run only ends on a death (or a signal)

use std::time::Duration;

use crate::error::ConfigError;

/// Configuration of one dining table.
///
/// ## Field semantics
/// - `philosophers`: number of seats (and forks); must be `>= 1`
/// - `time_to_die`: maximum interval since the last eating start before a philosopher starves
/// - `time_to_eat` / `time_to_sleep`: fixed phase durations
/// - `must_eat`: optional meal quota after which a philosopher is finished
/// - `poll_interval`: how often the coordinator checks the terminal condition
/// - `watchdog_interval`: how often each watchdog checks its philosopher
/// - `grace`: maximum wait for duties to exit after stop
///
/// ## Example
/// ```
/// use std::time::Duration;
/// use philosophers::Config;
///
/// let cfg = Config::new(5, 800, 200, 200).with_must_eat(7);
/// assert_eq!(cfg.time_to_eat, Duration::from_millis(200));
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of philosophers seated at the table.
    pub philosophers: usize,
    /// Starvation deadline measured from the last eating start.
    pub time_to_die: Duration,
    /// Duration of one meal (both forks held).
    pub time_to_eat: Duration,
    /// Duration of the sleeping phase.
    pub time_to_sleep: Duration,
    /// Optional number of meals after which a philosopher leaves the table.
    pub must_eat: Option<u32>,

    /// Interval between two checks of the population's terminal condition.
    pub poll_interval: Duration,
    /// Interval between two staleness checks of one watchdog.
    pub watchdog_interval: Duration,
    /// Maximum time to wait for every duty to exit after stop.
    pub grace: Duration,
}

impl Config {
    /// Creates a configuration from millisecond timings, with default runtime knobs.
    pub fn new(philosophers: usize, time_to_die: u64, time_to_eat: u64, time_to_sleep: u64) -> Self {
        Self {
            philosophers,
            time_to_die: Duration::from_millis(time_to_die),
            time_to_eat: Duration::from_millis(time_to_eat),
            time_to_sleep: Duration::from_millis(time_to_sleep),
            ..Self::default()
        }
    }

    /// Returns a new config with the given meal quota.
    pub fn with_must_eat(mut self, meals: u32) -> Self {
        self.must_eat = Some(meals);
        self
    }

    /// Checks that the configuration describes a runnable table.
    ///
    /// Every timing must be at least one millisecond, the table needs at least
    /// one seat and a configured quota must be positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.philosophers == 0 {
            return Err(ConfigError::NoPhilosophers);
        }
        for (field, value) in [
            ("time_to_die", self.time_to_die),
            ("time_to_eat", self.time_to_eat),
            ("time_to_sleep", self.time_to_sleep),
        ] {
            if value.as_millis() == 0 {
                return Err(ConfigError::ZeroDuration { field });
            }
        }
        if self.must_eat == Some(0) {
            return Err(ConfigError::ZeroMealQuota);
        }
        Ok(())
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - five philosophers, `800/200/200` ms, no quota
    /// - `poll_interval = 10ms`, `watchdog_interval = 1ms`
    /// - `grace = 1s`
    fn default() -> Self {
        Self {
            philosophers: 5,
            time_to_die: Duration::from_millis(800),
            time_to_eat: Duration::from_millis(200),
            time_to_sleep: Duration::from_millis(200),
            must_eat: None,
            poll_interval: Duration::from_millis(10),
            watchdog_interval: Duration::from_millis(1),
            grace: Duration::from_secs(1),
        }
    }
}
