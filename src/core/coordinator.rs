//! # Coordinator: lays the table, releases the population, decides the outcome.
//!
//! The [`Coordinator`] owns one run end to end. It builds the fork ring and
//! the philosophers, releases every duty at once through the start gate,
//! polls the population's terminal condition and shuts everything down.
//!
//! ## High-level architecture
//! ```text
//! run():
//!   cfg.validate()
//!   Bus::channel() ──► subscriber_listener(): BusReceiver ─► SubscriberSet::emit(Event).await
//!   TableContext::new()  (clock starts, sink wraps the bus)
//!
//! Lay the table (fork[i] between philosopher i and i+1):
//!   fork[0]  fork[1]  ...  fork[N-1]
//!   P1 = (left fork[0], right fork[1]) ... PN = (left fork[N-1], right fork[0])
//!          └──► child CancellationToken = runtime_token.child_token()
//!               start(): JoinSet.spawn(dine), JoinSet.spawn(watchdog)
//!
//! gate.open()  ─► every duty released at once
//!
//! Terminal condition (every poll_interval):
//!   ├─ sink halted (a `died` event was recorded) → Verdict::Starved
//!   ├─ quota set and every philosopher finished  → Verdict::AllFed
//!   └─ OS signal or external stop token           → Verdict::Interrupted
//!
//! Shutdown path:
//!   stop() every philosopher, runtime_token.cancel()
//!   wait_all_with_grace(cfg.grace):
//!     ├─ Ok (all duties joined)
//!     └─ Timeout → abort the rest, RuntimeError::GraceExceeded { stuck }
//!   drop the context (closes the bus) → listener drains → SubscriberSet::shutdown()
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use philosophers::{Config, Coordinator, Journal, Subscribe, Verdict};
//!
//! #[tokio::main(flavor = "multi_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let journal = Arc::new(Journal::new());
//!     let coordinator = Coordinator::builder(Config::new(4, 400, 20, 20).with_must_eat(2))
//!         .with_subscribers(vec![journal.clone() as Arc<dyn Subscribe>])
//!         .build();
//!
//!     let outcome = coordinator.run().await?;
//!     assert_eq!(outcome.verdict, Verdict::AllFed);
//!     assert!(journal.deaths().await.is_empty());
//!     Ok(())
//! }
//! ```

use std::{sync::Arc, time::Duration};

use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{Config, CoordinatorBuilder, TableContext, shutdown},
    error::RuntimeError,
    events::{Bus, BusReceiver},
    subscribers::{Subscribe, SubscriberSet},
    table::{Duty, DutyKind, Fork, Philosopher},
};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A meal quota was configured and every philosopher reached it.
    AllFed,
    /// A philosopher starved; the event stream halted at its `died` event.
    Starved {
        /// Id of the starved philosopher.
        philosopher: usize,
        /// Clock offset (ms) of the `died` event.
        at_ms: u64,
    },
    /// The process received a termination signal or the stop token fired.
    Interrupted,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Terminal condition that ended the run.
    pub verdict: Verdict,
    /// Meals eaten per philosopher, indexed by `id - 1`. A meal cut short by
    /// the stop still counts.
    pub meals: Vec<u32>,
    /// Wall time from clock start to shutdown.
    pub elapsed: Duration,
    /// Number of events accepted by the sink.
    pub events: u64,
}

/// Runs one dining table from start barrier to shutdown.
pub struct Coordinator {
    pub(crate) cfg: Config,
    pub(crate) subscribers: Vec<Arc<dyn Subscribe>>,
    pub(crate) handle_signals: bool,
    pub(crate) stop: Option<CancellationToken>,
}

impl Coordinator {
    /// Starts building a coordinator for `cfg`.
    pub fn builder(cfg: Config) -> CoordinatorBuilder {
        CoordinatorBuilder::new(cfg)
    }

    /// Runs the simulation until a terminal condition, then stops every actor.
    ///
    /// Every subscriber has handled every recorded event when this returns.
    pub async fn run(&self) -> Result<Outcome, RuntimeError> {
        self.cfg.validate()?;

        let (bus, rx) = Bus::channel();
        let listener = self.subscriber_listener(rx);
        let ctx = Arc::new(TableContext::new(&self.cfg, bus));
        let runtime_token = CancellationToken::new();

        let seats = lay_table(&ctx, &runtime_token);
        let mut set = JoinSet::new();
        for philosopher in &seats {
            philosopher.start(&mut set);
        }
        ctx.gate.open();
        tracing::info!(
            philosophers = self.cfg.philosophers,
            time_to_die = ?self.cfg.time_to_die,
            time_to_eat = ?self.cfg.time_to_eat,
            time_to_sleep = ?self.cfg.time_to_sleep,
            must_eat = ?self.cfg.must_eat,
            "table released"
        );

        let verdict = self.drive(&ctx, &seats).await;
        tracing::info!(?verdict, "terminal condition reached, stopping table");
        for philosopher in &seats {
            philosopher.stop();
        }
        runtime_token.cancel();
        let joined = self.wait_all_with_grace(&mut set, &seats).await;

        let outcome = Outcome {
            verdict,
            meals: seats.iter().map(Philosopher::meals_eaten).collect(),
            elapsed: ctx.clock.elapsed(),
            events: ctx.sink.recorded(),
        };

        // The sink holds the last bus sender; dropping the table closes the stream.
        drop(seats);
        drop(ctx);
        if let Err(e) = listener.await {
            tracing::warn!(error = %e, "event listener failed");
        }

        joined.map(|()| outcome)
    }

    /// Forwards the bus to a fresh subscriber set until the bus closes, then flushes it.
    fn subscriber_listener(&self, mut rx: BusReceiver) -> JoinHandle<()> {
        let set = SubscriberSet::new(self.subscribers.clone());
        tokio::spawn(async move {
            tracing::debug!(subscribers = set.len(), "event listener started");
            let mut forwarded = 0u64;
            while let Some(ev) = rx.recv().await {
                set.emit(ev).await;
                forwarded += 1;
            }
            set.shutdown().await;
            tracing::debug!(forwarded, "event listener drained");
        })
    }

    /// Waits for the first terminal condition: death, quota, external stop or OS signal.
    async fn drive(&self, ctx: &TableContext, seats: &[Philosopher]) -> Verdict {
        let stop = self.stop.clone().unwrap_or_default();
        tokio::select! {
            _ = stop.cancelled() => match ctx.sink.death() {
                Some(death) => Verdict::Starved {
                    philosopher: death.philosopher,
                    at_ms: death.at_ms,
                },
                None => {
                    tracing::info!("stop token cancelled");
                    Verdict::Interrupted
                }
            },
            verdict = self.watch_signals(ctx, seats) => verdict,
        }
    }

    async fn watch_signals(&self, ctx: &TableContext, seats: &[Philosopher]) -> Verdict {
        if !self.handle_signals {
            return self.poll_table(ctx, seats).await;
        }
        tokio::select! {
            res = shutdown::wait_for_shutdown_signal() => match res {
                Ok(signal) => {
                    tracing::info!(signal, "shutdown requested");
                    Verdict::Interrupted
                }
                Err(e) => {
                    tracing::warn!(error = %e, "signal handlers unavailable");
                    self.poll_table(ctx, seats).await
                }
            },
            verdict = self.poll_table(ctx, seats) => verdict,
        }
    }

    /// Polls the aggregate state at `poll_interval` until death or full quota.
    async fn poll_table(&self, ctx: &TableContext, seats: &[Philosopher]) -> Verdict {
        let quota = self.cfg.must_eat.is_some();
        loop {
            if ctx.sink.is_halted()
                && let Some(death) = ctx.sink.death()
            {
                return Verdict::Starved {
                    philosopher: death.philosopher,
                    at_ms: death.at_ms,
                };
            }
            if quota && seats.iter().all(Philosopher::is_finished) {
                return Verdict::AllFed;
            }
            tokio::time::sleep(self.cfg.poll_interval).await;
        }
    }

    /// Waits for every duty to exit within the configured grace period.
    ///
    /// Duties still running after `grace` are aborted and reported by name.
    async fn wait_all_with_grace(
        &self,
        set: &mut JoinSet<Duty>,
        seats: &[Philosopher],
    ) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        let mut exited = Vec::with_capacity(seats.len() * 2);

        let done = async {
            while let Some(res) = set.join_next().await {
                match res {
                    Ok(duty) => exited.push(duty),
                    Err(e) => tracing::error!(error = %e, "duty terminated abnormally"),
                }
            }
        };
        if tokio::time::timeout(grace, done).await.is_ok() {
            return Ok(());
        }

        let stuck: Vec<String> = seats
            .iter()
            .flat_map(|p| {
                [DutyKind::Dine, DutyKind::Watchdog].map(|kind| Duty {
                    philosopher: p.id(),
                    kind,
                })
            })
            .filter(|duty| !exited.contains(duty))
            .map(|duty| duty.to_string())
            .collect();
        tracing::error!(?grace, ?stuck, "duties did not stop within grace");
        set.shutdown().await;
        Err(RuntimeError::GraceExceeded { grace, stuck })
    }
}

/// Builds the fork ring and seats one philosopher per fork.
///
/// Philosopher `i + 1` gets `fork[i]` on its left and `fork[(i + 1) % n]` on
/// its right; with a single seat both sides are the same fork.
pub(crate) fn lay_table(
    ctx: &Arc<TableContext>,
    runtime_token: &CancellationToken,
) -> Vec<Philosopher> {
    let n = ctx.population;
    let forks: Vec<Arc<Fork>> = (0..n).map(|i| Arc::new(Fork::new(i))).collect();

    (0..n)
        .map(|i| {
            Philosopher::new(
                i + 1,
                Arc::clone(&forks[i]),
                Arc::clone(&forks[(i + 1) % n]),
                Arc::clone(ctx),
                runtime_token,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::{Event, EventKind, Side},
        subscribers::Journal,
    };

    fn table(n: usize) -> Vec<Philosopher> {
        let ctx = Arc::new(TableContext::new(&Config::new(n, 800, 200, 200), Bus::channel().0));
        lay_table(&ctx, &CancellationToken::new())
    }

    #[tokio::test]
    async fn every_fork_is_shared_by_exactly_two_neighbours() {
        for n in [2, 3, 5, 8] {
            let seats = table(n);
            assert_eq!(seats.len(), n);

            for fork_id in 0..n {
                let as_left: Vec<usize> = seats
                    .iter()
                    .filter(|p| p.left().id() == fork_id)
                    .map(Philosopher::id)
                    .collect();
                let as_right: Vec<usize> = seats
                    .iter()
                    .filter(|p| p.right().id() == fork_id)
                    .map(Philosopher::id)
                    .collect();
                assert_eq!(as_left.len(), 1, "n={n} fork={fork_id}");
                assert_eq!(as_right.len(), 1, "n={n} fork={fork_id}");
                assert_ne!(as_left, as_right);
            }

            for (i, p) in seats.iter().enumerate() {
                assert_eq!(p.id(), i + 1);
                assert!(!Arc::ptr_eq(p.left(), p.right()));
                let next = &seats[(i + 1) % n];
                assert!(Arc::ptr_eq(p.right(), next.left()));
            }
        }
    }

    #[tokio::test]
    async fn single_seat_uses_one_fork_on_both_sides() {
        let seats = table(1);
        assert_eq!(seats.len(), 1);
        assert!(Arc::ptr_eq(seats[0].left(), seats[0].right()));
        assert_eq!(seats[0].left().id(), 0);
    }

    #[tokio::test]
    async fn invalid_config_starts_nothing() {
        let coordinator = Coordinator::builder(Config::new(0, 800, 200, 200)).build();
        let err = coordinator.run().await.unwrap_err();
        assert_eq!(err.as_label(), "runtime_invalid_config");
    }

    fn quiet(cfg: Config) -> (Coordinator, Arc<Journal>) {
        let journal = Arc::new(Journal::new());
        let coordinator = Coordinator::builder(cfg)
            .with_subscriber(journal.clone())
            .with_shutdown_signals(false)
            .build();
        (coordinator, journal)
    }

    fn stop_after(ms: u64) -> CancellationToken {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            trigger.cancel();
        });
        token
    }

    fn eating_times(events: &[Event], philosopher: usize) -> Vec<u64> {
        events
            .iter()
            .filter(|e| e.philosopher == philosopher)
            .filter(|e| matches!(e.kind, EventKind::Eating { .. }))
            .map(|e| e.at_ms)
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn comfortable_odd_table_survives_and_shares_meals_fairly() {
        let journal = Arc::new(Journal::new());
        let coordinator = Coordinator::builder(Config::new(5, 800, 200, 200))
            .with_subscriber(journal.clone())
            .with_shutdown_signals(false)
            .with_stop_token(stop_after(4000))
            .build();

        let outcome = coordinator.run().await.expect("run completes");
        assert_eq!(outcome.verdict, Verdict::Interrupted);
        assert!(journal.deaths().await.is_empty());

        let most = outcome.meals.iter().max().copied().unwrap_or(0);
        let least = outcome.meals.iter().min().copied().unwrap_or(0);
        assert!(least >= 1, "meals: {:?}", outcome.meals);
        assert!(most - least <= 1, "meals: {:?}", outcome.meals);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn quota_ends_the_run_with_everyone_fed() {
        let (coordinator, journal) = quiet(Config::new(4, 500, 200, 100).with_must_eat(3));
        let outcome = coordinator.run().await.expect("run completes");

        assert_eq!(outcome.verdict, Verdict::AllFed);
        assert_eq!(outcome.meals.len(), 4);
        assert!(outcome.meals.iter().all(|&m| m >= 3), "meals: {:?}", outcome.meals);
        assert!(journal.deaths().await.is_empty());
        assert_eq!(journal.len().await as u64, outcome.events);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn neighbours_never_eat_at_the_same_time() {
        let cfg = Config::new(4, 500, 200, 100).with_must_eat(3);
        let eat = cfg.time_to_eat.as_millis() as u64;
        let (coordinator, journal) = quiet(cfg);
        coordinator.run().await.expect("run completes");

        let events = journal.events().await;
        for p in 1..=4 {
            let next = p % 4 + 1;
            for a in eating_times(&events, p) {
                for b in eating_times(&events, next) {
                    assert!(a.abs_diff(b) >= eat, "{p}@{a} and {next}@{b} overlap");
                }
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn meal_counters_in_eating_events_are_consecutive() {
        let (coordinator, journal) = quiet(Config::new(3, 800, 100, 100).with_must_eat(3));
        coordinator.run().await.expect("run completes");

        let events = journal.events().await;
        for p in 1..=3 {
            let meals: Vec<u32> = events
                .iter()
                .filter(|e| e.philosopher == p)
                .filter_map(|e| match e.kind {
                    EventKind::Eating { meal } => Some(meal),
                    _ => None,
                })
                .collect();
            assert_eq!(meals, (1..=meals.len() as u32).collect::<Vec<_>>());
        }
        assert!(events.windows(2).all(|w| w[0].seq < w[1].seq && w[0].at_ms <= w[1].at_ms));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn tight_table_starves_at_the_deadline_and_stream_halts() {
        let (coordinator, journal) = quiet(Config::new(4, 310, 200, 100).with_must_eat(7));
        let outcome = coordinator.run().await.expect("run completes");

        let Verdict::Starved { philosopher, at_ms } = outcome.verdict else {
            panic!("expected a death, got {:?}", outcome.verdict);
        };
        assert!((1..=4).contains(&philosopher));
        assert!(at_ms > 310 && at_ms <= 330, "died at {at_ms}");

        let events = journal.events().await;
        assert_eq!(events.iter().filter(|e| e.kind.is_death()).count(), 1);
        let last = events.last().expect("events recorded");
        assert_eq!(last.kind, EventKind::Died);
        assert_eq!(last.philosopher, philosopher);
        assert_eq!(events.len() as u64, outcome.events);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn lone_philosopher_never_eats() {
        let (coordinator, journal) = quiet(Config::new(1, 200, 100, 100));
        let outcome = coordinator.run().await.expect("run completes");

        assert!(matches!(outcome.verdict, Verdict::Starved { philosopher: 1, .. }));
        assert_eq!(outcome.meals, vec![0]);
        assert!(journal.meals_started().await.is_empty());

        let kinds: Vec<EventKind> = journal.events().await.into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::TookFork {
                    side: Side::Right,
                    fork: 0
                },
                EventKind::Died,
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn forks_are_only_ever_held_by_adjacent_philosophers() {
        let n = 5;
        let ctx = Arc::new(TableContext::new(&Config::new(n, 800, 50, 50), Bus::channel().0));
        let root = CancellationToken::new();
        let seats = lay_table(&ctx, &root);
        let mut set = JoinSet::new();
        for p in &seats {
            p.start(&mut set);
        }
        ctx.gate.open();

        let sampling = tokio::time::Instant::now();
        while sampling.elapsed() < Duration::from_millis(400) {
            for p in &seats {
                let left_neighbour = if p.id() == 1 { n } else { p.id() - 1 };
                if let Some(holder) = p.left().holder() {
                    assert!(
                        holder == p.id() || holder == left_neighbour,
                        "fork {} held by {holder}",
                        p.left().id()
                    );
                }
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        root.cancel();
        while set.join_next().await.is_some() {}
        assert!(ctx.sink.death().is_none());
        assert!(seats.iter().all(|p| p.left().holder().is_none()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn large_fast_table_delivers_every_event() {
        let journal = Arc::new(Journal::new());
        let coordinator = Coordinator::builder(Config::new(400, 2000, 10, 10))
            .with_subscriber(journal.clone())
            .with_shutdown_signals(false)
            .with_stop_token(stop_after(1000))
            .build();

        let outcome = coordinator.run().await.expect("run completes");
        assert_eq!(outcome.verdict, Verdict::Interrupted);

        let events = journal.events().await;
        assert!(outcome.events > 10_000, "only {} events", outcome.events);
        assert_eq!(events.len() as u64, outcome.events);
        assert!(events.iter().enumerate().all(|(i, e)| e.seq == i as u64));
    }

    #[tokio::test]
    async fn stop_token_cancelled_up_front_interrupts_immediately() {
        let token = CancellationToken::new();
        token.cancel();
        let outcome = Coordinator::builder(Config::new(3, 800, 200, 200))
            .with_shutdown_signals(false)
            .with_stop_token(token)
            .build()
            .run()
            .await
            .expect("run completes");
        assert_eq!(outcome.verdict, Verdict::Interrupted);
        assert_eq!(outcome.meals, vec![0, 0, 0]);
    }
}
