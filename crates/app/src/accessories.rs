//! Accessory types — per-domain mapping between entity state and characteristics.
//!
//! Every variant implements [`AccessoryType`]; `update_state` has no default,
//! so a variant that forgets it does not compile. Which variant serves which
//! entity domain is decided by [`AccessoryTypeRegistry`]: asking for a
//! domain nobody registered fails with a not-implemented error when the
//! accessory is built, not later when the first state change arrives.

mod binary_sensor;
mod light;
mod lock;
mod sensor;
mod switch;

pub use binary_sensor::ContactSensor;
pub use light::Light;
pub use lock::Lock;
pub use sensor::NumericSensor;
pub use switch::Switch;

use std::collections::HashMap;

use hkbridge_domain::accessory::{
    Category, CharacteristicChange, CharacteristicType, CharacteristicValue,
};
use hkbridge_domain::entity::Entity;
use hkbridge_domain::error::{HkBridgeError, NotImplementedError, ValidationError};
use hkbridge_domain::id::EntityId;
use hkbridge_domain::service::ServiceCall;

/// Capability every accessory variant provides.
pub trait AccessoryType: Send + Sync {
    /// Short name used in logs and errors (e.g. `"switch"`).
    fn kind(&self) -> &'static str;

    fn category(&self) -> Category;

    /// Characteristics this variant declares, with their initial values.
    fn characteristics(&self) -> Vec<CharacteristicChange>;

    /// Characteristic values matching the entity snapshot.
    ///
    /// Values that cannot be derived (e.g. a non-numeric sensor reading)
    /// are left out.
    fn update_state(&self, entity: &Entity) -> Vec<CharacteristicChange>;

    /// Translate a client write into an upstream service call.
    ///
    /// # Errors
    ///
    /// The default rejects every write as read-only.
    fn command(
        &self,
        entity_id: &EntityId,
        characteristic: CharacteristicType,
        value: &CharacteristicValue,
    ) -> Result<ServiceCall, HkBridgeError> {
        let _ = (entity_id, value);
        Err(ValidationError::ReadOnlyCharacteristic(characteristic.to_string()).into())
    }
}

/// Builds an [`AccessoryType`] for an entity snapshot.
pub type AccessoryTypeFactory = fn(&Entity) -> Box<dyn AccessoryType>;

/// Maps entity domains to accessory variants.
pub struct AccessoryTypeRegistry {
    factories: HashMap<String, AccessoryTypeFactory>,
}

impl Default for AccessoryTypeRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("switch", |_| Box::new(Switch));
        registry.register("input_boolean", |_| Box::new(Switch));
        registry.register("light", |_| Box::new(Light));
        registry.register("lock", |_| Box::new(Lock));
        registry.register("sensor", |entity| Box::new(NumericSensor::for_entity(entity)));
        registry.register("binary_sensor", |_| Box::new(ContactSensor));
        registry
    }
}

impl AccessoryTypeRegistry {
    /// A registry with no variants.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register (or replace) the variant serving `domain`.
    pub fn register(&mut self, domain: impl Into<String>, factory: AccessoryTypeFactory) {
        self.factories.insert(domain.into(), factory);
    }

    #[must_use]
    pub fn supports(&self, domain: &str) -> bool {
        self.factories.contains_key(domain)
    }

    /// Build the variant for `entity`'s domain.
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::NotImplemented`] when no variant is
    /// registered for the domain.
    pub fn create(&self, entity: &Entity) -> Result<Box<dyn AccessoryType>, HkBridgeError> {
        let domain = entity.entity_id.domain();
        let factory = self.factories.get(domain).ok_or_else(|| NotImplementedError {
            operation: "update_state",
            kind: domain.to_string(),
        })?;
        Ok(factory(entity))
    }
}

fn on_off_call(entity_id: &EntityId, value: &CharacteristicValue) -> Result<ServiceCall, HkBridgeError> {
    let on = value
        .as_bool()
        .ok_or_else(|| ValidationError::InvalidCharacteristicValue {
            characteristic: CharacteristicType::On.to_string(),
            value: value.to_string(),
        })?;
    Ok(ServiceCall::new(entity_id, if on { "turn_on" } else { "turn_off" }))
}
