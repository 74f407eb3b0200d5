use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{core::Config, subscribers::Subscribe};

use super::coordinator::Coordinator;

/// Builder for constructing a [`Coordinator`].
pub struct CoordinatorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    handle_signals: bool,
    stop: Option<CancellationToken>,
}

impl CoordinatorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            handle_signals: true,
            stop: None,
        }
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive the simulation event stream through dedicated
    /// workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds a single subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Whether SIGINT/SIGTERM/SIGQUIT end a run with `Verdict::Interrupted` (default: on).
    pub fn with_shutdown_signals(mut self, on: bool) -> Self {
        self.handle_signals = on;
        self
    }

    /// Ends the run with `Verdict::Interrupted` once `token` is cancelled.
    ///
    /// Lets an embedding program (or a test) bound a run that has no meal quota.
    pub fn with_stop_token(mut self, token: CancellationToken) -> Self {
        self.stop = Some(token);
        self
    }

    /// Builds the coordinator. Configuration is validated when the run starts.
    pub fn build(self) -> Coordinator {
        Coordinator {
            cfg: self.cfg,
            subscribers: self.subscribers,
            handle_signals: self.handle_signals,
            stop: self.stop,
        }
    }
}
