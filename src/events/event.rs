//! # Simulation events recorded by philosophers.
//!
//! The [`EventKind`] enum classifies what a philosopher just did; the
//! [`Event`] struct stamps it with the philosopher id, the elapsed
//! milliseconds since the clock started and a per-run sequence number.
//!
//! ## Ordering guarantees
//! Sequence numbers are assigned by the [`EventSink`](crate::events::EventSink)
//! under its lock, so `seq` increases strictly in publication order and
//! `at_ms` never decreases along that order.
//!
//! ## Text form
//! `Display` for [`Event`] renders the compatibility line
//! `"{at_ms} {philosopher} {description}"`:
//! ```text
//! 0 1 took right fork (1)
//! 0 1 took left fork (0)
//! 0 1 is eating (meal #1)
//! 200 1 is sleeping
//! 400 1 is thinking
//! 811 3 died
//! ```

use std::fmt;

/// Which of its two forks a philosopher picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Lowercase name used in the event stream.
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of simulation events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A fork was acquired.
    ///
    /// Sets:
    /// - `side`: which of the philosopher's forks
    /// - `fork`: the fork id (0-based ring index)
    TookFork { side: Side, fork: usize },

    /// Both forks are held and the meal starts.
    ///
    /// Sets:
    /// - `meal`: 1-based number of the meal being started
    Eating { meal: u32 },

    /// The philosopher released its forks and sleeps.
    Sleeping,

    /// The philosopher woke up and thinks before the next attempt.
    Thinking,

    /// The watchdog declared starvation. Halts the event stream.
    Died,
}

impl EventKind {
    /// Short stable label for diagnostic log fields.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::TookFork { .. } => "fork",
            EventKind::Eating { .. } => "eating",
            EventKind::Sleeping => "sleeping",
            EventKind::Thinking => "thinking",
            EventKind::Died => "died",
        }
    }

    #[inline]
    pub fn is_death(&self) -> bool {
        matches!(self, EventKind::Died)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::TookFork { side, fork } => write!(f, "took {side} fork ({fork})"),
            EventKind::Eating { meal } => write!(f, "is eating (meal #{meal})"),
            EventKind::Sleeping => f.write_str("is sleeping"),
            EventKind::Thinking => f.write_str("is thinking"),
            EventKind::Died => f.write_str("died"),
        }
    }
}

/// One line of the simulation event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Per-run sequence number, strictly increasing in stream order.
    pub seq: u64,
    /// Milliseconds elapsed since the simulation clock started.
    pub at_ms: u64,
    /// 1-based id of the philosopher the event is about.
    pub philosopher: usize,
    /// What happened.
    pub kind: EventKind,
}

impl Event {
    pub(crate) fn new(seq: u64, at_ms: u64, philosopher: usize, kind: EventKind) -> Self {
        Self {
            seq,
            at_ms,
            philosopher,
            kind,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.at_ms, self.philosopher, self.kind)
    }
}
