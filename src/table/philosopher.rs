//! # Philosopher: the dining actor.
//!
//! A [`Philosopher`] references the two forks adjacent to its seat and runs
//! two independent duties once [`Philosopher::start`] is called:
//!
//! ```text
//! dine duty:
//!   gate.wait()
//!   ├─► stagger (even id: one meal; last seat of odd table: half a meal)
//!   loop {
//!     ├─► eat:   first fork ─► second fork ─► last_meal_start = now
//!     │          ─► nap(eat) ─► meals += 1 ─► release second, release first
//!     ├─► finished? ─► exit
//!     ├─► sleep: nap(sleep)
//!     └─► think: Nap / ForcedSleep / Yield (see `schedule::think`)
//!   }
//!
//! watchdog duty:
//!   gate.wait()
//!   ├─► last_meal_start = max(last_meal_start, now)
//!   loop {
//!     ├─► finished or cancelled? ─► exit
//!     ├─► now - last_meal_start > die? ─► record `died`, cancel, exit
//!     └─► sleep(watchdog_interval)
//!   }
//! ```
//!
//! ## Rules
//! - Even ids take the left fork first, odd ids the right fork first. The
//!   asymmetry rules out a cyclic wait between neighbours.
//! - With a single seat both sides are the same fork: the philosopher holds
//!   it for `die + 10ms` without eating and starves.
//! - `last_meal_start` and `meals_eaten` are written by the dine duty only
//!   (the watchdog's start-time initialization never moves the value back);
//!   both are atomics because the watchdog reads them from another task.
//! - Only the watchdog declares death. Cancellation is one-way: the watchdog
//!   cancels its own philosopher, the coordinator cancels everyone.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU32, AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{select, task::JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{
    core::TableContext,
    events::{EventKind, Side},
    table::{
        Fork,
        nap::nap,
        schedule::{self, Think},
    },
};

/// Extra hold time of the lone philosopher's fork beyond the deadline.
const LONE_HOLD_MARGIN: Duration = Duration::from_millis(10);

/// Length of the forced context switch on crowded tables.
const FORCED_SLEEP: Duration = Duration::from_millis(1);

/// Which of a philosopher's two duties a task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DutyKind {
    Dine,
    Watchdog,
}

/// Identity of a spawned duty, returned by the task when it exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duty {
    pub philosopher: usize,
    pub kind: DutyKind,
}

impl fmt::Display for Duty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DutyKind::Dine => "dine",
            DutyKind::Watchdog => "watchdog",
        };
        write!(f, "philosopher-{}/{kind}", self.philosopher)
    }
}

/// Mutable state shared between the two duties.
#[derive(Debug, Default)]
struct Vitals {
    last_meal_start: AtomicU64,
    meals_eaten: AtomicU32,
}

struct Inner {
    id: usize,
    left: Arc<Fork>,
    right: Arc<Fork>,
    ctx: Arc<TableContext>,
    vitals: Vitals,
    token: CancellationToken,
}

/// Handle to one seated philosopher. Cheap to clone.
#[derive(Clone)]
pub struct Philosopher {
    inner: Arc<Inner>,
}

impl Philosopher {
    /// Seats philosopher `id` (1-based) between `left` and `right`.
    ///
    /// The philosopher's cancellation token is a child of `parent`, so
    /// cancelling `parent` stops it while its own watchdog can stop it alone.
    pub fn new(
        id: usize,
        left: Arc<Fork>,
        right: Arc<Fork>,
        ctx: Arc<TableContext>,
        parent: &CancellationToken,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                id,
                left,
                right,
                ctx,
                vitals: Vitals::default(),
                token: parent.child_token(),
            }),
        }
    }

    /// Spawns the dine and watchdog duties into `set`.
    ///
    /// Both block on the table's start gate before doing anything.
    pub fn start(&self, set: &mut JoinSet<Duty>) {
        let id = self.inner.id;

        let dine = Arc::clone(&self.inner);
        set.spawn(async move {
            dine.dine().await;
            Duty {
                philosopher: id,
                kind: DutyKind::Dine,
            }
        });

        let watchdog = Arc::clone(&self.inner);
        set.spawn(async move {
            watchdog.watch().await;
            Duty {
                philosopher: id,
                kind: DutyKind::Watchdog,
            }
        });
    }

    /// Requests cancellation of both duties. Idempotent.
    pub fn stop(&self) {
        self.inner.token.cancel();
    }

    /// True iff a meal quota is set and has been reached.
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// True once the philosopher was stopped or declared dead.
    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// 1-based seat id.
    pub fn id(&self) -> usize {
        self.inner.id
    }

    /// Number of completed meals.
    pub fn meals_eaten(&self) -> u32 {
        self.inner.vitals.meals_eaten.load(Ordering::Acquire)
    }

    /// Clock offset (ms) of the last eating start.
    pub fn last_meal_start(&self) -> u64 {
        self.inner.vitals.last_meal_start.load(Ordering::Acquire)
    }

    /// Fork on the left of the seat.
    pub fn left(&self) -> &Arc<Fork> {
        &self.inner.left
    }

    /// Fork on the right of the seat.
    pub fn right(&self) -> &Arc<Fork> {
        &self.inner.right
    }
}

impl fmt::Debug for Philosopher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Philosopher")
            .field("id", &self.inner.id)
            .field("left", &self.inner.left.id())
            .field("right", &self.inner.right.id())
            .field("meals_eaten", &self.meals_eaten())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl Inner {
    fn is_finished(&self) -> bool {
        match self.ctx.must_eat {
            Some(quota) => self.vitals.meals_eaten.load(Ordering::Acquire) >= quota,
            None => false,
        }
    }

    fn record(&self, kind: EventKind) {
        self.ctx.sink.record(self.id, kind);
    }

    /// Parks on the start gate; `false` if cancelled before the release.
    async fn wait_for_start(&self) -> bool {
        select! {
            _ = self.ctx.gate.wait() => true,
            _ = self.token.cancelled() => false,
        }
    }

    async fn dine(&self) {
        if !self.wait_for_start().await {
            return;
        }

        let stagger = schedule::stagger(self.id, self.ctx.population, &self.ctx.timing);
        if !nap(stagger, &self.token).await {
            return;
        }

        while !self.token.is_cancelled() {
            self.eat().await;
            if self.token.is_cancelled() {
                break;
            }
            if self.is_finished() {
                tracing::debug!(philosopher = self.id, "meal quota reached");
                break;
            }

            self.record(EventKind::Sleeping);
            if !nap(self.ctx.timing.sleep, &self.token).await {
                break;
            }

            self.record(EventKind::Thinking);
            match schedule::think(self.ctx.population, &self.ctx.timing) {
                Think::Nap(d) => {
                    nap(d, &self.token).await;
                }
                Think::ForcedSleep => {
                    nap(FORCED_SLEEP, &self.token).await;
                }
                Think::Yield => tokio::task::yield_now().await,
            }
        }
    }

    /// One eating attempt.
    ///
    /// Once both forks are held the meal counts, even when cancellation cuts
    /// the eating nap short.
    async fn eat(&self) {
        let (first, first_side, second, second_side) = if self.id % 2 == 0 {
            (&self.left, Side::Left, &self.right, Side::Right)
        } else {
            (&self.right, Side::Right, &self.left, Side::Left)
        };

        let Some(_first) = first.acquire_or_cancel(self.id, &self.token).await else {
            return;
        };
        self.record(EventKind::TookFork {
            side: first_side,
            fork: first.id(),
        });

        if Arc::ptr_eq(first, second) {
            nap(self.ctx.timing.die.saturating_add(LONE_HOLD_MARGIN), &self.token).await;
            return;
        }

        let Some(_second) = second.acquire_or_cancel(self.id, &self.token).await else {
            return;
        };
        self.record(EventKind::TookFork {
            side: second_side,
            fork: second.id(),
        });

        let now = self.ctx.clock.elapsed_millis();
        self.vitals
            .last_meal_start
            .fetch_max(now, Ordering::AcqRel);
        let meal = self.vitals.meals_eaten.load(Ordering::Acquire) + 1;
        self.record(EventKind::Eating { meal });

        if !nap(self.ctx.timing.eat, &self.token).await {
            tracing::debug!(philosopher = self.id, meal, "meal cut short by cancellation");
        }
        self.vitals.meals_eaten.fetch_add(1, Ordering::AcqRel);
        // `_second` drops before `_first`: release order mirrors acquisition.
    }

    async fn watch(&self) {
        if !self.wait_for_start().await {
            return;
        }

        let released = self.ctx.clock.elapsed_millis();
        self.vitals
            .last_meal_start
            .fetch_max(released, Ordering::AcqRel);
        let deadline = self.ctx.timing.die.as_millis() as u64;

        loop {
            if self.token.is_cancelled() || self.is_finished() {
                return;
            }

            let now = self.ctx.clock.elapsed_millis();
            let last = self.vitals.last_meal_start.load(Ordering::Acquire);
            if now.saturating_sub(last) > deadline {
                self.record(EventKind::Died);
                tracing::debug!(
                    philosopher = self.id,
                    at_ms = now,
                    last_meal_start = last,
                    "starvation detected"
                );
                self.token.cancel();
                return;
            }

            select! {
                _ = tokio::time::sleep(self.ctx.watchdog_interval) => {}
                _ = self.token.cancelled() => { return; }
            }
        }
    }
}
