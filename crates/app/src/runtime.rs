//! Bridge runtime — the single loop that owns the bridge.
//!
//! Every mutation of accessories, debounce windows and pairing state
//! happens here, one message at a time:
//!
//! - upstream `StateChanged` events are debounced per accessory and, once
//!   settled, turned into characteristic deltas pushed to the peer;
//! - `TimeChanged` events close settled windows;
//! - inbound client requests (characteristic writes, pair, unpair) are
//!   answered through a oneshot reply.
//!
//! Removing an accessory or its upstream entity cancels every window
//! keyed by that accessory before anything else runs, so nothing fires
//! into a dead target. An entity that comes back picks its accessory up
//! again with its next state change.

use std::future::Future;

use tokio::sync::{broadcast, mpsc, oneshot};

use hkbridge_domain::accessory::{CharacteristicType, CharacteristicValue};
use hkbridge_domain::entity::Entity;
use hkbridge_domain::error::{HkBridgeError, NotFoundError};
use hkbridge_domain::event::{Event, EventPayload};
use hkbridge_domain::id::{AccessoryId, ClientId, EntityId};
use hkbridge_domain::pairing::ClientPublicKey;
use hkbridge_domain::service::ServiceCall;
use hkbridge_domain::time::Timestamp;

use crate::bridge::HomeBridge;
use crate::debounce::Debouncer;
use crate::driver::HomeDriver;
use crate::home_accessory::HomeAccessory;
use crate::ports::{Clock, EventPublisher, Presenter, ProtocolPeer};

/// What a settled window runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    /// Push the latest upstream snapshot to the accessory.
    UpdateState,
    /// Forward the latest client write upstream.
    SetCharacteristic(CharacteristicType),
}

/// Debounce key: one window per accessory and handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatchKey {
    pub aid: AccessoryId,
    pub handler: Handler,
}

/// Arguments held by an open window.
#[derive(Debug, Clone, PartialEq)]
pub enum Pending {
    State(Entity),
    Call(ServiceCall),
}

type Reply = oneshot::Sender<Result<(), HkBridgeError>>;

/// A request coming from the protocol side.
#[derive(Debug)]
pub enum Inbound {
    SetCharacteristic {
        aid: AccessoryId,
        characteristic: CharacteristicType,
        value: CharacteristicValue,
        reply: Reply,
    },
    Pair {
        client: ClientId,
        key: ClientPublicKey,
        reply: Reply,
    },
    Unpair {
        client: ClientId,
        reply: Reply,
    },
}

impl Inbound {
    pub fn set_characteristic(
        aid: AccessoryId,
        characteristic: CharacteristicType,
        value: CharacteristicValue,
    ) -> (Self, oneshot::Receiver<Result<(), HkBridgeError>>) {
        let (reply, rx) = oneshot::channel();
        let request = Self::SetCharacteristic {
            aid,
            characteristic,
            value,
            reply,
        };
        (request, rx)
    }

    pub fn pair(
        client: ClientId,
        key: ClientPublicKey,
    ) -> (Self, oneshot::Receiver<Result<(), HkBridgeError>>) {
        let (reply, rx) = oneshot::channel();
        (Self::Pair { client, key, reply }, rx)
    }

    pub fn unpair(client: ClientId) -> (Self, oneshot::Receiver<Result<(), HkBridgeError>>) {
        let (reply, rx) = oneshot::channel();
        (Self::Unpair { client, reply }, rx)
    }
}

pub struct BridgeRuntime<P, S, E, C> {
    bridge: HomeBridge,
    driver: HomeDriver<P, S>,
    publisher: E,
    clock: C,
    debouncer: Debouncer<DispatchKey, Pending>,
}

impl<P, S, E, C> BridgeRuntime<P, S, E, C>
where
    P: ProtocolPeer,
    S: Presenter,
    E: EventPublisher,
    C: Clock,
{
    pub fn new(
        bridge: HomeBridge,
        driver: HomeDriver<P, S>,
        publisher: E,
        clock: C,
        quiet_period: chrono::TimeDelta,
    ) -> Self {
        Self {
            bridge,
            driver,
            publisher,
            clock,
            debouncer: Debouncer::new(quiet_period),
        }
    }

    #[must_use]
    pub fn bridge(&self) -> &HomeBridge {
        &self.bridge
    }

    #[must_use]
    pub fn driver(&self) -> &HomeDriver<P, S> {
        &self.driver
    }

    #[must_use]
    pub fn publisher(&self) -> &E {
        &self.publisher
    }

    /// Number of open debounce windows.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.debouncer.len()
    }

    /// Add an accessory to the bridge.
    ///
    /// # Errors
    ///
    /// See [`HomeBridge::add`].
    pub fn add_accessory(&mut self, accessory: HomeAccessory) -> Result<(), HkBridgeError> {
        self.bridge.add(accessory)
    }

    /// Remove an accessory, cancelling its pending windows first.
    pub fn remove_accessory(&mut self, aid: AccessoryId) -> Option<HomeAccessory> {
        let cancelled = self.debouncer.cancel_where(|key| key.aid == aid);
        let removed = self.bridge.remove(aid);
        if removed.is_some() {
            tracing::info!(%aid, cancelled, "accessory removed");
        }
        removed
    }

    /// Show the setup message unless a client is already paired.
    pub fn start(&self) {
        tracing::info!(
            bridge = self.bridge.name(),
            accessories = self.bridge.len(),
            "bridge started"
        );
        if !self.driver.state().is_paired() {
            self.bridge
                .setup_message(self.driver.presenter(), self.driver.context(), self.driver.state());
        }
    }

    pub async fn handle_event(&mut self, event: &Event) {
        match &event.payload {
            EventPayload::StateChanged {
                new_state: Some(entity),
                ..
            } => self.on_state_changed(entity, event.timestamp).await,
            EventPayload::StateChanged {
                old_state: Some(entity),
                new_state: None,
            } => self.detach(&entity.entity_id),
            EventPayload::TimeChanged => self.flush(event.timestamp).await,
            EventPayload::StateChanged { .. } | EventPayload::CallService(_) => {}
        }
    }

    async fn on_state_changed(&mut self, entity: &Entity, at: Timestamp) {
        let Some(acc) = self.bridge.find_by_entity_mut(&entity.entity_id) else {
            return;
        };
        if acc.is_detached() {
            acc.reattach();
            tracing::info!(
                aid = %acc.aid(),
                entity_id = %entity.entity_id,
                "upstream entity is back, accessory reattached"
            );
        }
        let key = DispatchKey {
            aid: acc.aid(),
            handler: Handler::UpdateState,
        };
        tracing::trace!(aid = %key.aid, entity_id = %entity.entity_id, "state change scheduled");
        if let Some(settled) = self.debouncer.schedule(key, Pending::State(entity.clone()), at) {
            self.dispatch(key, settled).await;
        }
    }

    /// Stop following `entity_id` and drop its pending windows.
    pub fn detach(&mut self, entity_id: &EntityId) {
        let Some(acc) = self.bridge.find_by_entity_mut(entity_id) else {
            return;
        };
        acc.detach();
        let aid = acc.aid();
        let cancelled = self.debouncer.cancel_where(|key| key.aid == aid);
        tracing::info!(%aid, %entity_id, cancelled, "upstream entity removed, accessory detached");
    }

    /// Close every window settled at `now` and run it.
    pub async fn flush(&mut self, now: Timestamp) {
        for (key, pending) in self.debouncer.take_due(now) {
            self.dispatch(key, pending).await;
        }
    }

    async fn dispatch(&mut self, key: DispatchKey, pending: Pending) {
        match pending {
            Pending::State(entity) => {
                let Some(acc) = self.bridge.get_mut(key.aid) else {
                    return;
                };
                let delta = acc.update_state(&entity);
                if delta.is_empty() {
                    return;
                }
                tracing::debug!(aid = %key.aid, changes = delta.len(), "pushing characteristics");
                if let Err(err) = self.driver.peer().notify(key.aid, &delta).await {
                    tracing::warn!(aid = %key.aid, error = %err, "failed to notify peer");
                }
            }
            Pending::Call(call) => {
                tracing::debug!(aid = %key.aid, %call, "calling service");
                if let Err(err) = self.publisher.publish(Event::call_service(call)).await {
                    tracing::warn!(aid = %key.aid, error = %err, "failed to publish service call");
                }
            }
        }
    }

    /// Translate a client write into an upstream service call.
    ///
    /// Debounced characteristics are held in a window; the rest are
    /// published right away. Any write drops the held writes of the other
    /// characteristics of the same accessory, so calls go upstream in the
    /// order the client made them.
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::NotFound`] for an unknown accessory, plus
    /// the errors of [`HomeAccessory::handle_command`].
    pub async fn set_characteristic(
        &mut self,
        aid: AccessoryId,
        characteristic: CharacteristicType,
        value: &CharacteristicValue,
    ) -> Result<(), HkBridgeError> {
        let acc = self.bridge.get(aid).ok_or_else(|| NotFoundError {
            entity: "Accessory",
            id: aid.to_string(),
        })?;
        let call = acc.handle_command(characteristic, value)?;
        let key = DispatchKey {
            aid,
            handler: Handler::SetCharacteristic(characteristic),
        };
        // held writes for other characteristics would land after this one
        let superseded = self.debouncer.cancel_where(|k| {
            k.aid == aid
                && k.handler != key.handler
                && matches!(k.handler, Handler::SetCharacteristic(_))
        });
        if superseded > 0 {
            tracing::debug!(%aid, superseded, "pending writes superseded");
        }

        if characteristic.is_debounced() {
            let now = self.clock.now();
            if let Some(settled) = self.debouncer.schedule(key, Pending::Call(call), now) {
                self.dispatch(key, settled).await;
            }
        } else {
            self.dispatch(key, Pending::Call(call)).await;
        }
        Ok(())
    }

    pub async fn handle_inbound(&mut self, request: Inbound) {
        let (result, reply) = match request {
            Inbound::SetCharacteristic {
                aid,
                characteristic,
                value,
                reply,
            } => (
                self.set_characteristic(aid, characteristic, &value).await,
                reply,
            ),
            Inbound::Pair { client, key, reply } => (self.driver.pair(client, key).await, reply),
            Inbound::Unpair { client, reply } => (self.driver.unpair(client).await, reply),
        };
        if let Err(err) = &result {
            tracing::debug!(error = %err, "inbound request failed");
        }
        // requester may have gone away
        let _ = reply.send(result);
    }

    /// Run until `shutdown` resolves or the event bus closes.
    pub async fn run(
        mut self,
        mut events: broadcast::Receiver<Event>,
        mut inbound: mpsc::Receiver<Inbound>,
        shutdown: impl Future<Output = ()>,
    ) -> Self {
        self.start();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
                received = events.recv() => match received {
                    Ok(event) => self.handle_event(&event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "bridge runtime lagged behind the event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("event bus closed");
                        break;
                    }
                },
                Some(request) = inbound.recv() => self.handle_inbound(request).await,
            }
        }

        let dropped = self.debouncer.cancel_where(|_| true);
        if dropped > 0 {
            tracing::debug!(dropped, "pending windows dropped on shutdown");
        }
        self
    }
}
