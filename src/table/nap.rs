//! # Cancellable delay.
//!
//! Every wait inside a dine duty goes through [`nap`]. The wait is split in
//! two phases:
//! - **coarse**: a timer raced against the cancellation token, up to
//!   [`FINE_TAIL`] before the deadline;
//! - **fine**: a yield loop for the last few milliseconds, which keeps meal
//!   and sleep durations close to the requested length despite timer
//!   granularity.
//!
//! Cancellation is observed immediately in the coarse phase and at every
//! yield in the fine phase.

use std::time::Duration;

use tokio::{select, time::Instant};
use tokio_util::sync::CancellationToken;

/// Length of the fine-grained tail of a nap.
pub const FINE_TAIL: Duration = Duration::from_millis(5);

/// Waits for `duration` unless `token` is cancelled first.
///
/// Returns `true` when the full duration elapsed, `false` when the nap was
/// cut short by cancellation.
pub async fn nap(duration: Duration, token: &CancellationToken) -> bool {
    let Some(deadline) = Instant::now().checked_add(duration) else {
        // Past the clock's range: only cancellation can end this nap.
        token.cancelled().await;
        return false;
    };

    if duration > FINE_TAIL {
        let coarse = tokio::time::sleep_until(deadline - FINE_TAIL);
        tokio::pin!(coarse);
        select! {
            _ = &mut coarse => {}
            _ = token.cancelled() => { return false; }
        }
    }

    loop {
        if token.is_cancelled() {
            return false;
        }
        if Instant::now() >= deadline {
            return true;
        }
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_full_duration() {
        let token = CancellationToken::new();
        let start = Instant::now();
        assert!(nap(Duration::from_millis(30), &token).await);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn short_naps_only_spin() {
        let token = CancellationToken::new();
        let start = Instant::now();
        assert!(nap(Duration::from_millis(2), &token).await);
        assert!(start.elapsed() >= Duration::from_millis(2));
        assert!(nap(Duration::ZERO, &token).await);
    }

    #[tokio::test]
    async fn already_cancelled_returns_immediately() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(!nap(Duration::from_secs(10), &token).await);
        assert!(!nap(Duration::from_millis(1), &token).await);
    }

    #[tokio::test]
    async fn unrepresentable_deadline_waits_for_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(!nap(Duration::MAX, &token).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancellation_cuts_a_long_nap_short() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        assert!(!nap(Duration::from_secs(5), &token).await);
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
