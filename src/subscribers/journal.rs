//! # Journal: in-memory record of the event stream.
//!
//! A stateful subscriber keeping every event it receives, in stream order.
//! The binary uses it for the end-of-run summary; tests use it to assert
//! on the exact stream a run produced.
//!
//! ## Rules
//! - Events are appended in the order the worker receives them, which is
//!   the sink's order (`seq` strictly increasing).
//! - Reads are consistent once [`Coordinator::run`](crate::Coordinator::run)
//!   has returned, since the run flushes every subscriber before returning.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Ordered in-memory event log.
#[derive(Debug, Default)]
pub struct Journal {
    events: RwLock<Vec<Event>>,
}

impl Journal {
    /// Creates an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every recorded event.
    pub async fn events(&self) -> Vec<Event> {
        self.events.read().await.clone()
    }

    /// Number of recorded events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// True if nothing was recorded.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    /// All `died` events.
    pub async fn deaths(&self) -> Vec<Event> {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| e.kind.is_death())
            .cloned()
            .collect()
    }

    /// Number of `eating` events per philosopher id.
    pub async fn meals_started(&self) -> BTreeMap<usize, u32> {
        let mut meals = BTreeMap::new();
        for e in self.events.read().await.iter() {
            if let EventKind::Eating { .. } = e.kind {
                *meals.entry(e.philosopher).or_insert(0) += 1;
            }
        }
        meals
    }
}

#[async_trait]
impl Subscribe for Journal {
    async fn on_event(&self, event: &Event) {
        self.events.write().await.push(event.clone());
    }

    fn name(&self) -> &'static str {
        "journal"
    }

    fn queue_capacity(&self) -> usize {
        65_536
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tallies_meals_and_deaths() {
        let journal = Journal::new();
        assert!(journal.is_empty().await);

        let stream = [
            Event::new(0, 0, 1, EventKind::Eating { meal: 1 }),
            Event::new(1, 0, 3, EventKind::Eating { meal: 1 }),
            Event::new(2, 200, 1, EventKind::Sleeping),
            Event::new(3, 400, 1, EventKind::Eating { meal: 2 }),
            Event::new(4, 811, 2, EventKind::Died),
        ];
        for ev in &stream {
            journal.on_event(ev).await;
        }

        assert_eq!(journal.len().await, 5);
        assert_eq!(journal.events().await, stream.to_vec());
        let meals = journal.meals_started().await;
        assert_eq!(meals.get(&1), Some(&2));
        assert_eq!(meals.get(&3), Some(&1));
        assert_eq!(meals.get(&2), None);
        let deaths = journal.deaths().await;
        assert_eq!(deaths.len(), 1);
        assert_eq!(deaths[0].philosopher, 2);
    }
}
