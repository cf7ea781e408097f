//! Simulated upstream home — demo entities that react to service calls.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use hkbridge_app::ports::EventPublisher;
use hkbridge_domain::entity::{AttributeValue, Entity, EntityState};
use hkbridge_domain::error::{HkBridgeError, NotFoundError, NotImplementedError};
use hkbridge_domain::event::{Event, EventPayload};
use hkbridge_domain::id::EntityId;
use hkbridge_domain::service::ServiceCall;
use hkbridge_domain::time::now;

const ATTR_BRIGHTNESS: &str = "brightness";
const ATTR_DEVICE_CLASS: &str = "device_class";
const ATTR_UNIT: &str = "unit_of_measurement";

/// A set of in-memory entities publishing their changes on the bus.
pub struct VirtualHome<E> {
    entities: Mutex<BTreeMap<EntityId, Entity>>,
    publisher: E,
}

impl<E: EventPublisher> VirtualHome<E> {
    /// A home with no entities.
    pub fn empty(publisher: E) -> Self {
        Self {
            entities: Mutex::new(BTreeMap::new()),
            publisher,
        }
    }

    /// A home populated with the demo entities.
    ///
    /// # Errors
    ///
    /// Returns a validation error if an entity builder fails (should not
    /// happen with hardcoded inputs).
    pub fn with_demo_entities(publisher: E) -> Result<Self, HkBridgeError> {
        let home = Self::empty(publisher);
        let demo = [
            Entity::builder()
                .entity_id("switch.virtual_switch")
                .friendly_name("Virtual Switch")
                .state(EntityState::Off)
                .build()?,
            Entity::builder()
                .entity_id("light.virtual_light")
                .friendly_name("Virtual Light")
                .state(EntityState::Off)
                .attribute(ATTR_BRIGHTNESS, AttributeValue::Int(255))
                .build()?,
            Entity::builder()
                .entity_id("lock.virtual_lock")
                .friendly_name("Virtual Lock")
                .state(EntityState::Locked)
                .build()?,
            Entity::builder()
                .entity_id("sensor.virtual_temperature")
                .friendly_name("Virtual Temperature")
                .state("21.5")
                .attribute(ATTR_DEVICE_CLASS, AttributeValue::String("temperature".into()))
                .attribute(ATTR_UNIT, AttributeValue::String("\u{b0}C".into()))
                .build()?,
            Entity::builder()
                .entity_id("binary_sensor.virtual_door")
                .friendly_name("Virtual Door")
                .state(EntityState::Off)
                .attribute(ATTR_DEVICE_CLASS, AttributeValue::String("door".into()))
                .build()?,
        ];
        {
            let mut entities = home.lock();
            for entity in demo {
                entities.insert(entity.entity_id.clone(), entity);
            }
        }
        Ok(home)
    }

    /// Snapshot of every entity, ordered by id.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        self.lock().values().cloned().collect()
    }

    #[must_use]
    pub fn get(&self, entity_id: &EntityId) -> Option<Entity> {
        self.lock().get(entity_id).cloned()
    }

    /// Insert or replace an entity and publish the change.
    ///
    /// # Errors
    ///
    /// Returns the publisher's error.
    pub async fn upsert(&self, entity: Entity) -> Result<(), HkBridgeError> {
        let old = self.lock().insert(entity.entity_id.clone(), entity.clone());
        self.publish_change(old, Some(entity)).await
    }

    /// Set the state of an entity as if it changed on its own.
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::NotFound`] for an unknown entity, or the
    /// publisher's error.
    pub async fn set_state(
        &self,
        entity_id: &EntityId,
        state: EntityState,
    ) -> Result<(), HkBridgeError> {
        let (old, new) = {
            let mut entities = self.lock();
            let entity = entities.get_mut(entity_id).ok_or_else(|| not_found(entity_id))?;
            let old = entity.clone();
            entity.update_state(state, now());
            (old, entity.clone())
        };
        self.publish_change(Some(old), Some(new)).await
    }

    /// Remove an entity and publish its removal.
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::NotFound`] for an unknown entity, or the
    /// publisher's error.
    pub async fn remove(&self, entity_id: &EntityId) -> Result<(), HkBridgeError> {
        let old = self
            .lock()
            .remove(entity_id)
            .ok_or_else(|| not_found(entity_id))?;
        self.publish_change(Some(old), None).await
    }

    /// Publish the current snapshot of every entity.
    ///
    /// # Errors
    ///
    /// Returns the publisher's error.
    pub async fn announce(&self) -> Result<(), HkBridgeError> {
        for entity in self.entities() {
            self.publish_change(None, Some(entity)).await?;
        }
        Ok(())
    }

    /// Apply a service call, publishing the resulting state change.
    ///
    /// # Errors
    ///
    /// - [`HkBridgeError::NotFound`] for an unknown entity.
    /// - [`HkBridgeError::NotImplemented`] for a service the entity's
    ///   domain does not offer.
    pub async fn call_service(&self, call: &ServiceCall) -> Result<(), HkBridgeError> {
        let change = {
            let mut entities = self.lock();
            let entity = entities
                .get_mut(&call.entity_id)
                .ok_or_else(|| not_found(&call.entity_id))?;
            let old = entity.clone();
            apply_service(entity, call)?;
            (*entity != old).then(|| (old, entity.clone()))
        };

        tracing::debug!(%call, changed = change.is_some(), "virtual service call");
        match change {
            Some((old, new)) => self.publish_change(Some(old), Some(new)).await,
            None => Ok(()),
        }
    }

    /// Serve `CallService` events until the bus closes.
    pub async fn run(&self, mut events: broadcast::Receiver<Event>) {
        loop {
            match events.recv().await {
                Ok(Event {
                    payload: EventPayload::CallService(call),
                    ..
                }) => {
                    if let Err(err) = self.call_service(&call).await {
                        tracing::warn!(%call, error = %err, "virtual service call failed");
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "virtual home lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    async fn publish_change(
        &self,
        old: Option<Entity>,
        new: Option<Entity>,
    ) -> Result<(), HkBridgeError> {
        match Event::state_changed(old, new) {
            Some(event) => self.publisher.publish(event).await,
            None => Ok(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<EntityId, Entity>> {
        self.entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn not_found(entity_id: &EntityId) -> HkBridgeError {
    NotFoundError {
        entity: "Entity",
        id: entity_id.to_string(),
    }
    .into()
}

fn apply_service(entity: &mut Entity, call: &ServiceCall) -> Result<(), HkBridgeError> {
    let at = now();
    let state = match (entity.entity_id.domain(), call.service.as_str()) {
        ("switch" | "input_boolean" | "light", "turn_off") => EntityState::Off,
        ("switch" | "input_boolean", "turn_on") => EntityState::On,
        ("light", "turn_on") => {
            if let Some(pct) = call.data.get("brightness_pct").and_then(serde_json::Value::as_i64) {
                let raw = (pct.clamp(0, 100) * 255 + 50) / 100;
                entity
                    .attributes
                    .insert(ATTR_BRIGHTNESS.to_string(), AttributeValue::Int(raw));
            }
            EntityState::On
        }
        ("switch" | "input_boolean" | "light", "toggle") => match entity.state {
            EntityState::On => EntityState::Off,
            _ => EntityState::On,
        },
        ("lock", "lock") => EntityState::Locked,
        ("lock", "unlock") => EntityState::Unlocked,
        (domain, service) => {
            return Err(NotImplementedError {
                operation: "call_service",
                kind: format!("{domain}.{service}"),
            }
            .into());
        }
    };
    entity.update_state(state, at);
    Ok(())
}
