use std::time::Duration;

use common::event::{EngineEvent, Event};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ReadyError;

/// In-process stand-in for the engine's event bridge.
///
/// Every subscriber sees every event triggered after it subscribed.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Deliver `event` to all current subscribers. Triggering with nobody
    /// listening is not an error, the event is simply dropped.
    pub fn trigger<E: Event>(&self, event: &E) -> usize {
        let event = event.to_engine_event();
        debug!(event = %event.name, args = event.args.len(), "trigger");
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    /// One-shot subscription to `name`. Subscribe before doing the work that
    /// may fire the event so an early firing is not missed.
    pub fn once(&self, name: impl Into<String>) -> ReadySignal {
        ReadySignal::Pending {
            event: name.into(),
            rx: self.tx.subscribe(),
        }
    }

    /// `once` when `name` is set, otherwise an already resolved signal.
    pub fn ready_signal(&self, name: Option<&str>) -> ReadySignal {
        match name {
            Some(name) => self.once(name),
            None => ReadySignal::immediate(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

/// A mod's "I am initialized" signal.
///
/// `wait` consumes the signal, so it resolves at most once and drops its
/// receiver afterwards.
#[derive(Debug)]
pub enum ReadySignal {
    Immediate,
    Pending {
        event: String,
        rx: broadcast::Receiver<EngineEvent>,
    },
}

impl ReadySignal {
    pub fn immediate() -> Self {
        ReadySignal::Immediate
    }

    pub fn event(&self) -> Option<&str> {
        match self {
            ReadySignal::Immediate => None,
            ReadySignal::Pending { event, .. } => Some(event),
        }
    }

    /// Resolve on the first event named exactly like the subscription, or
    /// fail once `deadline` elapses or `cancel` fires.
    ///
    /// A subscription that falls more than the bus capacity behind drops the
    /// oldest events, possibly the ready event itself. The wait then ends only
    /// at the deadline or on cancellation, so with no deadline it lasts until
    /// the session shuts down. Size `event_capacity` above the number of
    /// events a mod can fire between apply and ready.
    pub async fn wait(
        self,
        deadline: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<(), ReadyError> {
        let (event, mut rx) = match self {
            ReadySignal::Immediate => return Ok(()),
            ReadySignal::Pending { event, rx } => (event, rx),
        };

        let matched = async {
            loop {
                match rx.recv().await {
                    Ok(received) if received.name == event => return Ok(()),
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            event = %event,
                            skipped,
                            "Ready subscription lagged behind the bus, the ready event may be lost"
                        );
                    }
                    Err(RecvError::Closed) => return Err(ReadyError::BusClosed(event.clone())),
                }
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ReadyError::Cancelled(event.clone())),
            result = bounded(matched, deadline) => match result {
                Some(result) => result,
                None => Err(ReadyError::TimedOut {
                    event: event.clone(),
                    after: deadline.unwrap_or_default(),
                }),
            },
        }
    }
}

async fn bounded<F: Future>(future: F, deadline: Option<Duration>) -> Option<F::Output> {
    match deadline {
        Some(after) => tokio::time::timeout(after, future).await.ok(),
        None => Some(future.await),
    }
}
