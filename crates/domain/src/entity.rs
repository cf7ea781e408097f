//! Entity — a snapshot of one upstream, state-holding thing.
//!
//! The bridge never owns entities; it only observes snapshots delivered by
//! the upstream event source and maps them onto accessories.

mod attribute_value;
mod state;

pub use attribute_value::AttributeValue;
pub use state::EntityState;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::HkBridgeError;
use crate::id::EntityId;
use crate::time::{Timestamp, now};

/// Attribute carrying the human-readable name of an entity.
pub const ATTR_FRIENDLY_NAME: &str = "friendly_name";

/// Point-in-time view of an upstream entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_id: EntityId,
    pub state: EntityState,
    #[serde(default)]
    pub attributes: HashMap<String, AttributeValue>,
    pub last_changed: Timestamp,
}

impl Entity {
    /// Create a builder for constructing an [`Entity`].
    #[must_use]
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Display name: the `friendly_name` attribute, or the object id.
    #[must_use]
    pub fn friendly_name(&self) -> &str {
        match self.attributes.get(ATTR_FRIENDLY_NAME) {
            Some(AttributeValue::String(name)) if !name.is_empty() => name,
            _ => self.entity_id.object_id(),
        }
    }

    /// Replace the state, bumping `last_changed` only when it differs.
    pub fn update_state(&mut self, state: EntityState, at: Timestamp) {
        if self.state != state {
            self.state = state;
            self.last_changed = at;
        }
    }
}

/// Step-by-step builder for [`Entity`].
#[derive(Debug, Default)]
pub struct EntityBuilder {
    entity_id: Option<String>,
    state: EntityState,
    attributes: HashMap<String, AttributeValue>,
    last_changed: Option<Timestamp>,
}

impl EntityBuilder {
    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: impl Into<EntityState>) -> Self {
        self.state = state.into();
        self
    }

    #[must_use]
    pub fn friendly_name(self, name: impl Into<String>) -> Self {
        self.attribute(ATTR_FRIENDLY_NAME, AttributeValue::String(name.into()))
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn last_changed(mut self, at: Timestamp) -> Self {
        self.last_changed = Some(at);
        self
    }

    /// Consume the builder, validate, and return an [`Entity`].
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::Validation`] if the entity id is missing or
    /// not of the form `domain.object_id`.
    pub fn build(self) -> Result<Entity, HkBridgeError> {
        let entity_id: EntityId = self.entity_id.unwrap_or_default().parse()?;
        Ok(Entity {
            entity_id,
            state: self.state,
            attributes: self.attributes,
            last_changed: self.last_changed.unwrap_or_else(now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn should_build_entity_with_attributes() {
        let entity = Entity::builder()
            .entity_id("sensor.outdoor")
            .state("12.5")
            .attribute("unit_of_measurement", AttributeValue::String("°C".into()))
            .build()
            .unwrap();
        assert_eq!(entity.entity_id.domain(), "sensor");
        assert_eq!(entity.state.as_number(), Some(12.5));
        assert!(entity.get_attribute("unit_of_measurement").is_some());
    }

    #[test]
    fn should_reject_missing_entity_id() {
        let result = Entity::builder().build();
        assert!(matches!(
            result,
            Err(HkBridgeError::Validation(ValidationError::InvalidEntityId(_)))
        ));
    }

    #[test]
    fn should_use_friendly_name_attribute_when_present() {
        let entity = Entity::builder()
            .entity_id("light.kitchen")
            .friendly_name("Kitchen Light")
            .build()
            .unwrap();
        assert_eq!(entity.friendly_name(), "Kitchen Light");
    }

    #[test]
    fn should_fall_back_to_object_id_for_name() {
        let entity = Entity::builder()
            .entity_id("light.kitchen")
            .build()
            .unwrap();
        assert_eq!(entity.friendly_name(), "kitchen");
    }

    #[test]
    fn should_bump_last_changed_only_on_actual_change() {
        let start = now();
        let mut entity = Entity::builder()
            .entity_id("switch.fan")
            .state(EntityState::Off)
            .last_changed(start)
            .build()
            .unwrap();

        let later = start + chrono::TimeDelta::seconds(5);
        entity.update_state(EntityState::Off, later);
        assert_eq!(entity.last_changed, start);

        entity.update_state(EntityState::On, later);
        assert_eq!(entity.last_changed, later);
        assert_eq!(entity.state, EntityState::On);
    }
}
