//! Light — on/off plus brightness in percent.

use hkbridge_domain::accessory::{
    Category, CharacteristicChange, CharacteristicType, CharacteristicValue,
};
use hkbridge_domain::entity::{Entity, EntityState};
use hkbridge_domain::error::{HkBridgeError, ValidationError};
use hkbridge_domain::id::EntityId;
use hkbridge_domain::service::ServiceCall;

use super::{AccessoryType, on_off_call};

/// Upstream brightness attribute, `0..=255`.
const ATTR_BRIGHTNESS: &str = "brightness";

pub struct Light;

impl AccessoryType for Light {
    fn kind(&self) -> &'static str {
        "light"
    }

    fn category(&self) -> Category {
        Category::Lightbulb
    }

    fn characteristics(&self) -> Vec<CharacteristicChange> {
        vec![
            CharacteristicChange::new(CharacteristicType::On, CharacteristicValue::Bool(false)),
            CharacteristicChange::new(CharacteristicType::Brightness, CharacteristicValue::Int(100)),
        ]
    }

    fn update_state(&self, entity: &Entity) -> Vec<CharacteristicChange> {
        let on = entity.state == EntityState::On;
        let mut changes = vec![CharacteristicChange::new(
            CharacteristicType::On,
            CharacteristicValue::Bool(on),
        )];
        let brightness = entity
            .get_attribute(ATTR_BRIGHTNESS)
            .and_then(hkbridge_domain::entity::AttributeValue::as_f64);
        if let (true, Some(raw)) = (on, brightness) {
            #[allow(clippy::cast_possible_truncation)]
            let pct = (raw.clamp(0.0, 255.0) / 255.0 * 100.0).round() as i64;
            changes.push(CharacteristicChange::new(
                CharacteristicType::Brightness,
                CharacteristicValue::Int(pct),
            ));
        }
        changes
    }

    fn command(
        &self,
        entity_id: &EntityId,
        characteristic: CharacteristicType,
        value: &CharacteristicValue,
    ) -> Result<ServiceCall, HkBridgeError> {
        match characteristic {
            CharacteristicType::On => on_off_call(entity_id, value),
            CharacteristicType::Brightness => {
                let pct = value
                    .as_int()
                    .filter(|pct| (0..=100).contains(pct))
                    .ok_or_else(|| ValidationError::InvalidCharacteristicValue {
                        characteristic: characteristic.to_string(),
                        value: value.to_string(),
                    })?;
                if pct == 0 {
                    return Ok(ServiceCall::new(entity_id, "turn_off"));
                }
                Ok(ServiceCall::new(entity_id, "turn_on")
                    .with_data(serde_json::json!({ "brightness_pct": pct })))
            }
            other => Err(ValidationError::ReadOnlyCharacteristic(other.to_string()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hkbridge_domain::entity::AttributeValue;

    fn id() -> EntityId {
        "light.desk".parse().unwrap()
    }

    #[test]
    fn should_convert_brightness_to_percent() {
        let entity = Entity::builder()
            .entity_id("light.desk")
            .state("on")
            .attribute(ATTR_BRIGHTNESS, AttributeValue::Int(128))
            .build()
            .unwrap();
        let changes = Light.update_state(&entity);
        assert_eq!(
            changes,
            vec![
                CharacteristicChange::new(CharacteristicType::On, CharacteristicValue::Bool(true)),
                CharacteristicChange::new(
                    CharacteristicType::Brightness,
                    CharacteristicValue::Int(50)
                ),
            ]
        );
    }

    #[test]
    fn should_leave_brightness_alone_when_off() {
        let entity = Entity::builder()
            .entity_id("light.desk")
            .state("off")
            .build()
            .unwrap();
        let changes = Light.update_state(&entity);
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn should_request_brightness_pct() {
        let call = Light
            .command(&id(), CharacteristicType::Brightness, &CharacteristicValue::Int(40))
            .unwrap();
        assert_eq!(call.service, "turn_on");
        assert_eq!(call.data["brightness_pct"], 40);
    }

    #[test]
    fn should_turn_off_for_zero_brightness() {
        let call = Light
            .command(&id(), CharacteristicType::Brightness, &CharacteristicValue::Int(0))
            .unwrap();
        assert_eq!(call.service, "turn_off");
    }

    #[test]
    fn should_reject_out_of_range_brightness() {
        let result = Light.command(
            &id(),
            CharacteristicType::Brightness,
            &CharacteristicValue::Int(140),
        );
        assert!(matches!(result, Err(HkBridgeError::Validation(_))));
    }
}
