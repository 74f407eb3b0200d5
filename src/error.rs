//! Error types used by the simulation runtime.
//!
//! This module defines two error enums:
//!
//! - [`ConfigError`]: a [`Config`](crate::Config) that cannot describe a valid table.
//! - [`RuntimeError`]: failures of the orchestration runtime itself.
//!
//! A philosopher starving is **not** an error: it is one of the two expected
//! terminal outcomes and is reported through [`Verdict::Starved`](crate::Verdict::Starved).
//!
//! Both types provide `as_label`, a stable snake_case tag for log fields.

use std::time::Duration;
use thiserror::Error;

/// # Configuration errors.
///
/// Raised by [`Config::validate`](crate::Config::validate) before any actor is built,
/// so an invalid configuration never produces simulation side effects.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The table needs at least one seat.
    #[error("number of philosophers must be a positive integer")]
    NoPhilosophers,

    /// One of the timing parameters is zero.
    #[error("{field} must be a positive number of milliseconds")]
    ZeroDuration {
        /// Name of the offending parameter (`time_to_die`, `time_to_eat`, `time_to_sleep`).
        field: &'static str,
    },

    /// A meal quota was configured but set to zero.
    #[error("mandatory meal count must be a positive integer")]
    ZeroMealQuota,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use philosophers::ConfigError;
    ///
    /// let err = ConfigError::ZeroDuration { field: "time_to_eat" };
    /// assert_eq!(err.as_label(), "config_zero_duration");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::NoPhilosophers => "config_no_philosophers",
            ConfigError::ZeroDuration { .. } => "config_zero_duration",
            ConfigError::ZeroMealQuota => "config_zero_meal_quota",
        }
    }
}

/// # Errors produced by the simulation runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The configuration was rejected before the table was laid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Shutdown grace period was exceeded; some duties remained stuck and had to be aborted.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; forcing termination")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the duties that did not exit in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use philosophers::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(1), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::InvalidConfig(_) => "runtime_invalid_config",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_runtime_error() {
        let err: RuntimeError = ConfigError::ZeroMealQuota.into();
        assert_eq!(err.as_label(), "runtime_invalid_config");
        assert!(err.to_string().contains("meal count"));
    }

    #[test]
    fn zero_duration_names_the_field() {
        let err = ConfigError::ZeroDuration {
            field: "time_to_sleep",
        };
        assert_eq!(
            err.to_string(),
            "time_to_sleep must be a positive number of milliseconds"
        );
    }
}
