//! Accessory state adapter — binds one upstream entity to one accessory.
//!
//! Upstream snapshots flow in through [`HomeAccessory::update_state`] and
//! come out as the characteristic delta to push to clients. Client writes
//! flow the other way through [`HomeAccessory::handle_command`], which only
//! produces the upstream service call: the accessory itself is reconciled
//! by the next state change, never optimistically.

use hkbridge_domain::accessory::{
    Accessory, AccessoryInformation, CharacteristicChange, CharacteristicType, CharacteristicValue,
    derive_model_label,
};
use hkbridge_domain::entity::Entity;
use hkbridge_domain::error::{HkBridgeError, NotFoundError, ValidationError};
use hkbridge_domain::id::{AccessoryId, EntityId};
use hkbridge_domain::service::ServiceCall;

use crate::accessories::{AccessoryType, AccessoryTypeRegistry};

/// Explicit identity fields that take precedence over derived ones.
#[derive(Debug, Clone, Default)]
pub struct AccessoryOverrides {
    pub name: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
}

pub struct HomeAccessory {
    accessory: Accessory,
    entity_id: EntityId,
    kind: Box<dyn AccessoryType>,
    detached: bool,
}

impl HomeAccessory {
    /// Bind `entity` to a new accessory served by `kind`.
    ///
    /// The information group is filled from `overrides`, falling back to
    /// the entity's friendly name, a model label derived from its domain,
    /// and the entity id as serial number. The initial characteristic
    /// values come from `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ReservedAccessoryId`] for the bridge's own
    /// id, or [`ValidationError::EmptyName`] when no usable name is found.
    pub fn new(
        aid: AccessoryId,
        entity: &Entity,
        kind: Box<dyn AccessoryType>,
        overrides: &AccessoryOverrides,
    ) -> Result<Self, HkBridgeError> {
        if aid == AccessoryId::BRIDGE {
            return Err(ValidationError::ReservedAccessoryId(aid).into());
        }

        let entity_id = entity.entity_id.clone();
        let name = overrides
            .name
            .clone()
            .unwrap_or_else(|| entity.friendly_name().to_string());
        let model = overrides
            .model
            .clone()
            .unwrap_or_else(|| derive_model_label(entity_id.domain()));
        let mut information = AccessoryInformation::new(name, model, entity_id.as_str());
        if let Some(manufacturer) = &overrides.manufacturer {
            information.manufacturer.clone_from(manufacturer);
        }

        let accessory = kind.characteristics().into_iter().fold(
            Accessory::new(aid, kind.category(), information)?,
            |acc, change| acc.with_characteristic(change.characteristic, change.value),
        );

        let mut this = Self {
            accessory,
            entity_id,
            kind,
            detached: false,
        };
        this.accessory.apply(this.kind.update_state(entity));
        Ok(this)
    }

    /// Bind `entity` using the variant registered for its domain.
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::NotImplemented`] when the domain has no
    /// registered variant, plus the errors of [`HomeAccessory::new`].
    pub fn from_registry(
        registry: &AccessoryTypeRegistry,
        aid: AccessoryId,
        entity: &Entity,
        overrides: &AccessoryOverrides,
    ) -> Result<Self, HkBridgeError> {
        let kind = registry.create(entity)?;
        Self::new(aid, entity, kind, overrides)
    }

    #[must_use]
    pub fn aid(&self) -> AccessoryId {
        self.accessory.id()
    }

    #[must_use]
    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind.kind()
    }

    #[must_use]
    pub fn accessory(&self) -> &Accessory {
        &self.accessory
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Stop following the upstream entity. Updates and commands are ignored
    /// until [`reattach`](Self::reattach).
    pub fn detach(&mut self) {
        self.detached = true;
    }

    /// Follow the upstream entity again after it reappeared.
    pub fn reattach(&mut self) {
        self.detached = false;
    }

    /// Apply an upstream snapshot, returning the characteristic delta.
    ///
    /// Snapshots for other entities, unavailable states, and anything
    /// arriving after [`detach`](Self::detach) produce no delta.
    pub fn update_state(&mut self, entity: &Entity) -> Vec<CharacteristicChange> {
        if self.detached || entity.entity_id != self.entity_id || !entity.state.is_available() {
            return Vec::new();
        }
        let values = self.kind.update_state(entity);
        self.accessory.apply(values)
    }

    /// Translate a client write into the upstream service call.
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::NotFound`] when the accessory is detached or
    /// does not declare `characteristic`, and a validation error when the
    /// characteristic is read-only or the value is out of range.
    pub fn handle_command(
        &self,
        characteristic: CharacteristicType,
        value: &CharacteristicValue,
    ) -> Result<ServiceCall, HkBridgeError> {
        if self.detached || self.accessory.get(characteristic).is_none() {
            return Err(NotFoundError {
                entity: "Characteristic",
                id: format!("{}/{characteristic}", self.aid()),
            }
            .into());
        }
        if !characteristic.is_writable() {
            return Err(ValidationError::ReadOnlyCharacteristic(characteristic.to_string()).into());
        }
        self.kind.command(&self.entity_id, characteristic, value)
    }
}

impl std::fmt::Debug for HomeAccessory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeAccessory")
            .field("aid", &self.aid())
            .field("entity_id", &self.entity_id)
            .field("kind", &self.kind.kind())
            .field("detached", &self.detached)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hkbridge_domain::accessory::{Category, MANUFACTURER};
    use hkbridge_domain::entity::{AttributeValue, EntityState};

    fn fan(state: &str) -> Entity {
        Entity::builder()
            .entity_id("switch.ceiling_fan")
            .state(state)
            .friendly_name("Ceiling Fan")
            .build()
            .unwrap()
    }

    fn bind(entity: &Entity) -> HomeAccessory {
        HomeAccessory::from_registry(
            &AccessoryTypeRegistry::default(),
            AccessoryId::new(2),
            entity,
            &AccessoryOverrides::default(),
        )
        .unwrap()
    }

    #[test]
    fn should_populate_information_from_entity() {
        let acc = bind(&fan("off"));
        let info = acc.accessory().information();
        assert_eq!(info.name, "Ceiling Fan");
        assert_eq!(info.model, "Switch");
        assert_eq!(info.manufacturer, MANUFACTURER);
        assert_eq!(info.serial_number, "switch.ceiling_fan");
        assert_eq!(acc.accessory().category(), Category::Switch);
    }

    #[test]
    fn should_derive_model_label_from_domain() {
        let entity = Entity::builder()
            .entity_id("test_model.thing")
            .build()
            .unwrap();
        let acc = HomeAccessory::new(
            AccessoryId::new(9),
            &entity,
            Box::new(crate::accessories::Switch),
            &AccessoryOverrides::default(),
        )
        .unwrap();
        assert_eq!(acc.accessory().information().model, "Test Model");
        assert_eq!(acc.accessory().display_name(), "thing");
    }

    #[test]
    fn should_prefer_explicit_overrides() {
        let overrides = AccessoryOverrides {
            name: Some("Fan".into()),
            model: Some("FX-100".into()),
            manufacturer: Some("Acme".into()),
        };
        let acc = HomeAccessory::from_registry(
            &AccessoryTypeRegistry::default(),
            AccessoryId::new(2),
            &fan("off"),
            &overrides,
        )
        .unwrap();
        let info = acc.accessory().information();
        assert_eq!(info.name, "Fan");
        assert_eq!(info.model, "FX-100");
        assert_eq!(info.manufacturer, "Acme");
    }

    #[test]
    fn should_reject_bridge_aid() {
        let result = HomeAccessory::from_registry(
            &AccessoryTypeRegistry::default(),
            AccessoryId::BRIDGE,
            &fan("off"),
            &AccessoryOverrides::default(),
        );
        assert!(matches!(
            result,
            Err(HkBridgeError::Validation(ValidationError::ReservedAccessoryId(_)))
        ));
    }

    #[test]
    fn should_fail_for_unregistered_domain() {
        let entity = Entity::builder().entity_id("vacuum.robot").build().unwrap();
        let result = HomeAccessory::from_registry(
            &AccessoryTypeRegistry::default(),
            AccessoryId::new(2),
            &entity,
            &AccessoryOverrides::default(),
        );
        assert!(matches!(result, Err(HkBridgeError::NotImplemented(_))));
    }

    #[test]
    fn should_apply_initial_state() {
        let acc = bind(&fan("on"));
        assert_eq!(
            acc.accessory().get(CharacteristicType::On),
            Some(&CharacteristicValue::Bool(true))
        );
    }

    #[test]
    fn should_return_only_changed_characteristics() {
        let mut acc = bind(&fan("off"));
        assert!(acc.update_state(&fan("off")).is_empty());

        let delta = acc.update_state(&fan("on"));
        assert_eq!(
            delta,
            vec![CharacteristicChange::new(
                CharacteristicType::On,
                CharacteristicValue::Bool(true)
            )]
        );
    }

    #[test]
    fn should_ignore_unavailable_state() {
        let mut acc = bind(&fan("on"));
        let mut entity = fan("on");
        entity.state = EntityState::Unavailable;
        assert!(acc.update_state(&entity).is_empty());
        assert_eq!(
            acc.accessory().get(CharacteristicType::On),
            Some(&CharacteristicValue::Bool(true))
        );
    }

    #[test]
    fn should_ignore_snapshot_of_other_entity() {
        let mut acc = bind(&fan("off"));
        let other = Entity::builder()
            .entity_id("switch.heater")
            .state("on")
            .build()
            .unwrap();
        assert!(acc.update_state(&other).is_empty());
    }

    #[test]
    fn should_suppress_updates_after_detach() {
        let mut acc = bind(&fan("off"));
        acc.detach();
        assert!(acc.is_detached());
        assert!(acc.update_state(&fan("on")).is_empty());
    }

    #[test]
    fn should_resume_updates_after_reattach() {
        let mut acc = bind(&fan("off"));
        acc.detach();
        acc.reattach();
        assert!(!acc.is_detached());
        assert_eq!(acc.update_state(&fan("on")).len(), 1);
    }

    #[test]
    fn should_translate_write_without_touching_state() {
        let acc = bind(&fan("off"));
        let call = acc
            .handle_command(CharacteristicType::On, &CharacteristicValue::Bool(true))
            .unwrap();
        assert_eq!(call.to_string(), "switch.turn_on(switch.ceiling_fan)");
        assert_eq!(
            acc.accessory().get(CharacteristicType::On),
            Some(&CharacteristicValue::Bool(false))
        );
    }

    #[test]
    fn should_reject_undeclared_characteristic() {
        let acc = bind(&fan("off"));
        let result =
            acc.handle_command(CharacteristicType::Brightness, &CharacteristicValue::Int(10));
        assert!(matches!(result, Err(HkBridgeError::NotFound(_))));
    }

    #[test]
    fn should_reject_write_to_read_only_characteristic() {
        let entity = Entity::builder()
            .entity_id("sensor.outdoor")
            .state("12.5")
            .attribute("unit_of_measurement", AttributeValue::String("°C".into()))
            .build()
            .unwrap();
        let acc = bind(&entity);
        let result = acc.handle_command(
            CharacteristicType::CurrentTemperature,
            &CharacteristicValue::Float(30.0),
        );
        assert!(matches!(
            result,
            Err(HkBridgeError::Validation(ValidationError::ReadOnlyCharacteristic(_)))
        ));
    }

    #[test]
    fn should_reject_command_after_detach() {
        let mut acc = bind(&fan("off"));
        acc.detach();
        let result = acc.handle_command(CharacteristicType::On, &CharacteristicValue::Bool(true));
        assert!(matches!(result, Err(HkBridgeError::NotFound(_))));
    }
}
