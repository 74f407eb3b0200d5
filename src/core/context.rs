//! # Per-run table context.
//!
//! [`TableContext`] is built once by the coordinator and shared by `Arc`
//! with every philosopher. It replaces any process-wide state: the clock,
//! the event sink (with its halt flag), the start gate, the population size
//! and the timings all live here.
//!
//! [`StartGate`] is the one-time start barrier: every duty parks on
//! [`StartGate::wait`] until the coordinator calls [`StartGate::open`],
//! which releases the whole population at once.

use std::time::Duration;

use tokio::sync::watch;

use crate::{
    core::{Clock, Config},
    events::{Bus, EventSink},
    table::Timing,
};

/// One-shot start barrier releasing all waiters simultaneously.
#[derive(Debug)]
pub struct StartGate {
    tx: watch::Sender<bool>,
}

impl StartGate {
    /// Creates a closed gate.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Waits until the gate is opened. Returns immediately if it already is.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|open| *open).await;
    }

    /// Opens the gate. Idempotent.
    pub fn open(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for StartGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, read-only context of one simulation run.
pub struct TableContext {
    /// Simulation clock, started when the context is built.
    pub clock: Clock,
    /// Ordered event sink; its halt flag is the global "someone died" signal.
    pub sink: EventSink,
    /// Start barrier for all duties.
    pub gate: StartGate,
    /// Number of philosophers at the table.
    pub population: usize,
    /// Phase durations and starvation deadline.
    pub timing: Timing,
    /// Optional meal quota.
    pub must_eat: Option<u32>,
    /// Watchdog poll interval.
    pub watchdog_interval: Duration,
}

impl TableContext {
    /// Builds the context for `cfg`, starting the clock now.
    pub fn new(cfg: &Config, bus: Bus) -> Self {
        let clock = Clock::start();
        Self {
            clock,
            sink: EventSink::new(clock, bus),
            gate: StartGate::new(),
            population: cfg.philosophers,
            timing: Timing::from_config(cfg),
            must_eat: cfg.must_eat,
            watchdog_interval: cfg.watchdog_interval,
        }
    }
}
