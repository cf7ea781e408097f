//! Numeric sensor — temperature or relative humidity.

use hkbridge_domain::accessory::{
    Category, CharacteristicChange, CharacteristicType, CharacteristicValue,
};
use hkbridge_domain::entity::{AttributeValue, Entity};

use super::AccessoryType;

const ATTR_DEVICE_CLASS: &str = "device_class";
const ATTR_UNIT: &str = "unit_of_measurement";

/// Exposes a `sensor` entity's numeric state as a read-only reading.
pub struct NumericSensor {
    characteristic: CharacteristicType,
}

impl NumericSensor {
    /// Humidity sensors (by `device_class`) report relative humidity;
    /// everything else is treated as temperature.
    #[must_use]
    pub fn for_entity(entity: &Entity) -> Self {
        let characteristic = match entity.get_attribute(ATTR_DEVICE_CLASS) {
            Some(AttributeValue::String(class)) if class == "humidity" => {
                CharacteristicType::CurrentRelativeHumidity
            }
            _ => CharacteristicType::CurrentTemperature,
        };
        Self { characteristic }
    }
}

impl AccessoryType for NumericSensor {
    fn kind(&self) -> &'static str {
        match self.characteristic {
            CharacteristicType::CurrentRelativeHumidity => "humidity_sensor",
            _ => "temperature_sensor",
        }
    }

    fn category(&self) -> Category {
        Category::Sensor
    }

    fn characteristics(&self) -> Vec<CharacteristicChange> {
        vec![CharacteristicChange::new(
            self.characteristic,
            CharacteristicValue::Float(0.0),
        )]
    }

    fn update_state(&self, entity: &Entity) -> Vec<CharacteristicChange> {
        let Some(reading) = entity.state.as_number() else {
            return Vec::new();
        };
        let reading = match (self.characteristic, entity.get_attribute(ATTR_UNIT)) {
            (CharacteristicType::CurrentTemperature, Some(AttributeValue::String(unit)))
                if unit == "°F" =>
            {
                ((reading - 32.0) * 5.0 / 9.0 * 10.0).round() / 10.0
            }
            _ => reading,
        };
        vec![CharacteristicChange::new(
            self.characteristic,
            CharacteristicValue::Float(reading),
        )]
    }
}
