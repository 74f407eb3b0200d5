//! # Ordered, halting event sink.
//!
//! [`EventSink`] is the single entry point philosophers use to report what
//! they do. It serializes concurrent calls into one ordered stream and
//! implements the global halt: once a `died` event is recorded, every later
//! event is silently dropped.
//!
//! ## Rules
//! - Timestamp, sequence number and publication happen under one lock, so
//!   `seq` and `at_ms` are both monotonic along the stream.
//! - Only the first death is recorded; it is kept as the run's [`Death`].
//! - `is_halted()` is a lock-free read; the coordinator polls it and only
//!   takes the lock through `death()` once it flips.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::core::Clock;

use super::{Bus, Event, EventKind};

/// The first recorded starvation of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Death {
    /// Id of the philosopher that starved.
    pub philosopher: usize,
    /// Clock offset of the `died` event.
    pub at_ms: u64,
}

struct SinkState {
    next_seq: u64,
    death: Option<Death>,
}

/// Serializes philosopher events onto the [`Bus`] and owns the halt flag.
pub struct EventSink {
    clock: Clock,
    bus: Bus,
    state: Mutex<SinkState>,
    halted: AtomicBool,
}

impl EventSink {
    /// Creates a sink stamping events with `clock` and publishing them to `bus`.
    pub fn new(clock: Clock, bus: Bus) -> Self {
        Self {
            clock,
            bus,
            state: Mutex::new(SinkState {
                next_seq: 0,
                death: None,
            }),
            halted: AtomicBool::new(false),
        }
    }

    /// Records one event for `philosopher`.
    ///
    /// Returns `false` when the sink is already halted and the event was dropped.
    pub fn record(&self, philosopher: usize, kind: EventKind) -> bool {
        let mut state = self.state.lock();
        if self.halted.load(Ordering::Acquire) {
            return false;
        }

        let at_ms = self.clock.elapsed_millis();
        if kind.is_death() {
            state.death = Some(Death { philosopher, at_ms });
            self.halted.store(true, Ordering::Release);
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        self.bus.publish(Event::new(seq, at_ms, philosopher, kind));
        true
    }

    /// True once a `died` event has been recorded.
    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    /// The death that halted the stream, if any.
    pub fn death(&self) -> Option<Death> {
        self.state.lock().death
    }

    /// Number of events accepted so far.
    pub fn recorded(&self) -> u64 {
        self.state.lock().next_seq
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::events::{BusReceiver, Side};

    fn sink() -> (EventSink, BusReceiver) {
        let (bus, rx) = Bus::channel();
        (EventSink::new(Clock::start(), bus), rx)
    }

    #[tokio::test]
    async fn drops_everything_after_death() {
        let (sink, mut rx) = sink();

        assert!(sink.record(1, EventKind::Thinking));
        assert!(sink.record(2, EventKind::Died));
        assert!(!sink.record(3, EventKind::Sleeping));
        assert!(!sink.record(1, EventKind::Died));

        assert!(sink.is_halted());
        let death = sink.death().expect("death recorded");
        assert_eq!(death.philosopher, 2);
        assert_eq!(sink.recorded(), 2);

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::Thinking);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::Died);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn concurrent_records_form_one_total_order() {
        let (bus, mut rx) = Bus::channel();
        let sink = Arc::new(EventSink::new(Clock::start(), bus));

        let handles: Vec<_> = (1..=8)
            .map(|id| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for fork in 0..100 {
                        sink.record(
                            id,
                            EventKind::TookFork {
                                side: Side::Left,
                                fork,
                            },
                        );
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut expected_seq = 0;
        let mut last_at = 0;
        let mut per_philosopher = [0usize; 9];
        while let Ok(ev) = rx.try_recv() {
            assert_eq!(ev.seq, expected_seq);
            assert!(ev.at_ms >= last_at);
            if let EventKind::TookFork { fork, .. } = ev.kind {
                assert_eq!(fork, per_philosopher[ev.philosopher]);
            }
            per_philosopher[ev.philosopher] += 1;
            expected_seq += 1;
            last_at = ev.at_ms;
        }
        assert_eq!(expected_seq, 800);
    }
}
