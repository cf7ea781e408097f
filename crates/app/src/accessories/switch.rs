//! Switch — a single on/off characteristic.

use hkbridge_domain::accessory::{
    Category, CharacteristicChange, CharacteristicType, CharacteristicValue,
};
use hkbridge_domain::entity::{Entity, EntityState};
use hkbridge_domain::error::{HkBridgeError, ValidationError};
use hkbridge_domain::id::EntityId;
use hkbridge_domain::service::ServiceCall;

use super::{AccessoryType, on_off_call};

/// Serves `switch` and `input_boolean` entities.
pub struct Switch;

impl AccessoryType for Switch {
    fn kind(&self) -> &'static str {
        "switch"
    }

    fn category(&self) -> Category {
        Category::Switch
    }

    fn characteristics(&self) -> Vec<CharacteristicChange> {
        vec![CharacteristicChange::new(
            CharacteristicType::On,
            CharacteristicValue::Bool(false),
        )]
    }

    fn update_state(&self, entity: &Entity) -> Vec<CharacteristicChange> {
        vec![CharacteristicChange::new(
            CharacteristicType::On,
            CharacteristicValue::Bool(entity.state == EntityState::On),
        )]
    }

    fn command(
        &self,
        entity_id: &EntityId,
        characteristic: CharacteristicType,
        value: &CharacteristicValue,
    ) -> Result<ServiceCall, HkBridgeError> {
        match characteristic {
            CharacteristicType::On => on_off_call(entity_id, value),
            other => Err(ValidationError::ReadOnlyCharacteristic(other.to_string()).into()),
        }
    }
}
