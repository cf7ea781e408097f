//! Outbound event port. The runtime uses it to send service calls upstream.

use std::future::Future;
use std::sync::Arc;

use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::event::Event;

pub trait EventPublisher {
    /// Fire and forget: an event nobody listens to is not an error.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), HkBridgeError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), HkBridgeError>> + Send {
        T::publish(self, event)
    }
}
