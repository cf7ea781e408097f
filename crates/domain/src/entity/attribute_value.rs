//! Typed attribute values attached to entity snapshots.

use serde::{Deserialize, Serialize};

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Json(serde_json::Value),
}

impl AttributeValue {
    /// Numeric view of the value; integers widen to `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::String(raw) => raw.parse().ok(),
            Self::Bool(_) | Self::Json(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_deserialize_brightness_as_int() {
        let val: AttributeValue = serde_json::from_str("128").unwrap();
        assert_eq!(val, AttributeValue::Int(128));
    }

    #[test]
    fn should_deserialize_json_object_as_json_variant() {
        let val: AttributeValue = serde_json::from_str(r#"{"r": 255}"#).unwrap();
        assert!(matches!(val, AttributeValue::Json(_)));
    }

    #[test]
    fn should_widen_numbers_to_f64() {
        assert_eq!(AttributeValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(AttributeValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(AttributeValue::String("7".into()).as_f64(), Some(7.0));
        assert_eq!(AttributeValue::Bool(true).as_f64(), None);
    }
}
