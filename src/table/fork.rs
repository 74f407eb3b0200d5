//! # Fork: an exclusive resource shared by two neighbours.
//!
//! A [`Fork`] wraps a `tokio::sync::Mutex<()>`. Acquiring it returns a
//! [`ForkGuard`]; dropping the guard releases the fork and wakes one waiter
//! (tokio's mutex hands the lock over in FIFO order).
//!
//! Each fork also records the id of its current holder, which makes the
//! mutual-exclusion invariant observable from outside.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::{
    select,
    sync::{Mutex, MutexGuard},
};
use tokio_util::sync::CancellationToken;

/// Holder value of a free fork. Philosopher ids start at 1.
const FREE: usize = 0;

/// A named mutual-exclusion resource.
#[derive(Debug)]
pub struct Fork {
    id: usize,
    lock: Mutex<()>,
    holder: AtomicUsize,
}

impl Fork {
    /// Creates a free fork with the given ring index.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            lock: Mutex::new(()),
            holder: AtomicUsize::new(FREE),
        }
    }

    /// Ring index of this fork.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Id of the philosopher currently holding the fork, if any.
    pub fn holder(&self) -> Option<usize> {
        match self.holder.load(Ordering::Acquire) {
            FREE => None,
            who => Some(who),
        }
    }

    /// Blocks until philosopher `who` owns the fork.
    pub async fn acquire(&self, who: usize) -> ForkGuard<'_> {
        let guard = self.lock.lock().await;
        let prev = self.holder.swap(who, Ordering::AcqRel);
        debug_assert_eq!(prev, FREE, "fork {} held twice", self.id);
        ForkGuard {
            fork: self,
            _guard: guard,
        }
    }

    /// Like [`Fork::acquire`], but gives up with `None` once `token` is cancelled.
    pub async fn acquire_or_cancel(
        &self,
        who: usize,
        token: &CancellationToken,
    ) -> Option<ForkGuard<'_>> {
        select! {
            guard = self.acquire(who) => Some(guard),
            _ = token.cancelled() => None,
        }
    }
}

/// Exclusive ownership of a [`Fork`]; released on drop.
#[derive(Debug)]
pub struct ForkGuard<'a> {
    fork: &'a Fork,
    _guard: MutexGuard<'a, ()>,
}

impl Drop for ForkGuard<'_> {
    fn drop(&mut self) {
        // Runs before `_guard` unlocks, so the next holder never sees a stale id.
        self.fork.holder.store(FREE, Ordering::Release);
    }
}
