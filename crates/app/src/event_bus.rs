//! Event bus shared by the upstream integrations and the bridge runtime.
//!
//! Integrations publish `StateChanged`, the runtime publishes `CallService`
//! and the time signal publishes `TimeChanged`. Every subscriber sees every
//! event published after it subscribed.

use std::future::Future;

use tokio::sync::broadcast;

use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::event::Event;

use crate::ports::EventPublisher;

/// Room for a few seconds of state churn plus ticks before a slow
/// subscriber starts lagging.
pub const DEFAULT_CAPACITY: usize = 256;

/// Broadcast bus carrying [`Event`]s between upstream and the bridge.
#[derive(Clone)]
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Events published before this call are not delivered to the receiver.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InProcessEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), HkBridgeError>> + Send {
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            tracing::trace!(event_id = %event.id, "no subscriber, event dropped");
        }
        async { Ok(()) }
    }
}
