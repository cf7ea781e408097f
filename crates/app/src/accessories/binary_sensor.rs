//! Contact sensor backed by a `binary_sensor` entity.

use hkbridge_domain::accessory::{
    Category, CharacteristicChange, CharacteristicType, CharacteristicValue,
};
use hkbridge_domain::entity::{Entity, EntityState};

use super::AccessoryType;

const CONTACT_DETECTED: i64 = 0;
const CONTACT_NOT_DETECTED: i64 = 1;

pub struct ContactSensor;

impl AccessoryType for ContactSensor {
    fn kind(&self) -> &'static str {
        "contact_sensor"
    }

    fn category(&self) -> Category {
        Category::Sensor
    }

    fn characteristics(&self) -> Vec<CharacteristicChange> {
        vec![CharacteristicChange::new(
            CharacteristicType::ContactSensorState,
            CharacteristicValue::Int(CONTACT_DETECTED),
        )]
    }

    fn update_state(&self, entity: &Entity) -> Vec<CharacteristicChange> {
        // "on" means the door/window is open
        let value = match entity.state {
            EntityState::On | EntityState::Open => CONTACT_NOT_DETECTED,
            _ => CONTACT_DETECTED,
        };
        vec![CharacteristicChange::new(
            CharacteristicType::ContactSensorState,
            CharacteristicValue::Int(value),
        )]
    }
}
