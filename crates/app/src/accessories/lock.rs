//! Lock — current and target lock state.

use hkbridge_domain::accessory::{
    Category, CharacteristicChange, CharacteristicType, CharacteristicValue,
};
use hkbridge_domain::entity::{Entity, EntityState};
use hkbridge_domain::error::{HkBridgeError, ValidationError};
use hkbridge_domain::id::EntityId;
use hkbridge_domain::service::ServiceCall;

use super::AccessoryType;

const UNSECURED: i64 = 0;
const SECURED: i64 = 1;
const JAMMED: i64 = 2;
const UNKNOWN: i64 = 3;

pub struct Lock;

impl AccessoryType for Lock {
    fn kind(&self) -> &'static str {
        "lock"
    }

    fn category(&self) -> Category {
        Category::DoorLock
    }

    fn characteristics(&self) -> Vec<CharacteristicChange> {
        vec![
            CharacteristicChange::new(
                CharacteristicType::LockCurrentState,
                CharacteristicValue::Int(UNKNOWN),
            ),
            CharacteristicChange::new(
                CharacteristicType::LockTargetState,
                CharacteristicValue::Int(SECURED),
            ),
        ]
    }

    fn update_state(&self, entity: &Entity) -> Vec<CharacteristicChange> {
        let (current, target) = match &entity.state {
            EntityState::Locked => (Some(SECURED), Some(SECURED)),
            EntityState::Unlocked => (Some(UNSECURED), Some(UNSECURED)),
            EntityState::Jammed => (Some(JAMMED), None),
            EntityState::Other(raw) if raw == "locking" => (None, Some(SECURED)),
            EntityState::Other(raw) if raw == "unlocking" => (None, Some(UNSECURED)),
            _ => (Some(UNKNOWN), None),
        };
        let current = current.map(|v| {
            CharacteristicChange::new(CharacteristicType::LockCurrentState, CharacteristicValue::Int(v))
        });
        let target = target.map(|v| {
            CharacteristicChange::new(CharacteristicType::LockTargetState, CharacteristicValue::Int(v))
        });
        current.into_iter().chain(target).collect()
    }

    fn command(
        &self,
        entity_id: &EntityId,
        characteristic: CharacteristicType,
        value: &CharacteristicValue,
    ) -> Result<ServiceCall, HkBridgeError> {
        if characteristic != CharacteristicType::LockTargetState {
            return Err(ValidationError::ReadOnlyCharacteristic(characteristic.to_string()).into());
        }
        match value.as_int() {
            Some(SECURED) => Ok(ServiceCall::new(entity_id, "lock")),
            Some(UNSECURED) => Ok(ServiceCall::new(entity_id, "unlock")),
            _ => Err(ValidationError::InvalidCharacteristicValue {
                characteristic: characteristic.to_string(),
                value: value.to_string(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(state: &str) -> Entity {
        Entity::builder()
            .entity_id("lock.front_door")
            .state(state)
            .build()
            .unwrap()
    }

    fn value_of(changes: &[CharacteristicChange], ch: CharacteristicType) -> Option<i64> {
        changes
            .iter()
            .find(|c| c.characteristic == ch)
            .and_then(|c| c.value.as_int())
    }

    #[test]
    fn should_report_secured_when_locked() {
        let changes = Lock.update_state(&entity("locked"));
        assert_eq!(value_of(&changes, CharacteristicType::LockCurrentState), Some(SECURED));
        assert_eq!(value_of(&changes, CharacteristicType::LockTargetState), Some(SECURED));
    }

    #[test]
    fn should_keep_target_when_jammed() {
        let changes = Lock.update_state(&entity("jammed"));
        assert_eq!(value_of(&changes, CharacteristicType::LockCurrentState), Some(JAMMED));
        assert_eq!(value_of(&changes, CharacteristicType::LockTargetState), None);
    }

    #[test]
    fn should_only_move_target_while_locking() {
        let changes = Lock.update_state(&entity("locking"));
        assert_eq!(value_of(&changes, CharacteristicType::LockCurrentState), None);
        assert_eq!(value_of(&changes, CharacteristicType::LockTargetState), Some(SECURED));
    }

    #[test]
    fn should_request_unlock() {
        let id: EntityId = "lock.front_door".parse().unwrap();
        let call = Lock
            .command(&id, CharacteristicType::LockTargetState, &CharacteristicValue::Int(0))
            .unwrap();
        assert_eq!(call.service, "unlock");
    }

    #[test]
    fn should_reject_write_to_current_state() {
        let id: EntityId = "lock.front_door".parse().unwrap();
        let result = Lock.command(
            &id,
            CharacteristicType::LockCurrentState,
            &CharacteristicValue::Int(1),
        );
        assert!(result.is_err());
    }
}
