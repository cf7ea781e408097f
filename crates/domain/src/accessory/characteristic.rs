//! Characteristics — named, typed value slots on an accessory.

use serde::{Deserialize, Serialize};

/// The characteristics bridged accessories expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharacteristicType {
    On,
    Brightness,
    CurrentTemperature,
    CurrentRelativeHumidity,
    LockCurrentState,
    LockTargetState,
    ContactSensorState,
}

impl CharacteristicType {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::On => "On",
            Self::Brightness => "Brightness",
            Self::CurrentTemperature => "CurrentTemperature",
            Self::CurrentRelativeHumidity => "CurrentRelativeHumidity",
            Self::LockCurrentState => "LockCurrentState",
            Self::LockTargetState => "LockTargetState",
            Self::ContactSensorState => "ContactSensorState",
        }
    }

    /// Whether clients may write this characteristic.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::On | Self::Brightness | Self::LockTargetState)
    }

    /// Slider-like characteristics that clients write in rapid bursts.
    #[must_use]
    pub const fn is_debounced(self) -> bool {
        matches!(self, Self::Brightness)
    }
}

impl std::fmt::Display for CharacteristicType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A characteristic value as exchanged with clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl CharacteristicValue {
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::Int(value) => Some(*value != 0),
            Self::Float(_) | Self::String(_) => None,
        }
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Float(value) => Some(value.round() as i64),
            Self::Bool(value) => Some(i64::from(*value)),
            Self::String(_) => None,
        }
    }
}

impl std::fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(value) => value.fmt(f),
            Self::Int(value) => value.fmt(f),
            Self::Float(value) => value.fmt(f),
            Self::String(value) => value.fmt(f),
        }
    }
}

/// One characteristic set to one value, as pushed to the protocol peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicChange {
    pub characteristic: CharacteristicType,
    pub value: CharacteristicValue,
}

impl CharacteristicChange {
    #[must_use]
    pub fn new(characteristic: CharacteristicType, value: CharacteristicValue) -> Self {
        Self {
            characteristic,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_only_debounce_brightness() {
        assert!(CharacteristicType::Brightness.is_debounced());
        assert!(!CharacteristicType::On.is_debounced());
    }

    #[test]
    fn should_not_allow_writes_to_sensor_readings() {
        assert!(!CharacteristicType::CurrentTemperature.is_writable());
        assert!(!CharacteristicType::LockCurrentState.is_writable());
        assert!(CharacteristicType::LockTargetState.is_writable());
    }

    #[test]
    fn should_coerce_int_to_bool() {
        assert_eq!(CharacteristicValue::Int(1).as_bool(), Some(true));
        assert_eq!(CharacteristicValue::Int(0).as_bool(), Some(false));
        assert_eq!(CharacteristicValue::String("x".into()).as_bool(), None);
    }

    #[test]
    fn should_round_float_to_int() {
        assert_eq!(CharacteristicValue::Float(49.6).as_int(), Some(50));
    }
}
