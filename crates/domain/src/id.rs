//! Typed identifiers.
//!
//! - [`EventId`] is a random UUID.
//! - [`EntityId`] is the upstream `domain.object_id` key.
//! - [`AccessoryId`] is the numeric accessory id (`aid`) seen by paired clients.
//! - [`ClientId`] identifies a paired controller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! define_uuid_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_uuid_id!(
    /// Unique identifier for an [`Event`](crate::event::Event).
    EventId
);

/// Upstream entity key, always of the form `domain.object_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// The part before the first `.` (e.g. `light` in `light.kitchen`).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('.').map_or("", |(domain, _)| domain)
    }

    /// The part after the first `.` (e.g. `kitchen` in `light.kitchen`).
    #[must_use]
    pub fn object_id(&self) -> &str {
        self.0.split_once('.').map_or("", |(_, object)| object)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for EntityId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.split_once('.').is_some_and(|(domain, object)| {
            let part_ok = |part: &str| {
                !part.is_empty()
                    && part
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            };
            part_ok(domain) && part_ok(object)
        });
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(ValidationError::InvalidEntityId(s.to_string()))
        }
    }
}

impl TryFrom<String> for EntityId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityId> for String {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric accessory identifier (`aid`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessoryId(u64);

impl AccessoryId {
    /// The id every bridge claims for itself.
    pub const BRIDGE: Self = Self(1);

    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derive a stable id from an entity id.
    ///
    /// Uses Adler-32 over the entity id bytes. `0` is invalid and `1`
    /// belongs to the bridge, so both map to `2`.
    #[must_use]
    pub fn for_entity(entity_id: &EntityId) -> Self {
        const MOD_ADLER: u32 = 65_521;
        let (mut a, mut b) = (1_u32, 0_u32);
        for byte in entity_id.as_str().bytes() {
            a = (a + u32::from(byte)) % MOD_ADLER;
            b = (b + a) % MOD_ADLER;
        }
        match (b << 16) | a {
            0 | 1 => Self(2),
            aid => Self(u64::from(aid)),
        }
    }
}

impl fmt::Display for AccessoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a paired client (controller pairing id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_unique_event_ids_when_called_twice() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn should_split_entity_id_into_domain_and_object_id() {
        let id: EntityId = "light.kitchen_ceiling".parse().unwrap();
        assert_eq!(id.domain(), "light");
        assert_eq!(id.object_id(), "kitchen_ceiling");
    }

    #[test]
    fn should_reject_entity_id_without_dot() {
        let result = EntityId::from_str("kitchen");
        assert_eq!(
            result,
            Err(ValidationError::InvalidEntityId("kitchen".to_string()))
        );
    }

    #[test]
    fn should_reject_entity_id_with_uppercase() {
        assert!(EntityId::from_str("Light.Kitchen").is_err());
    }

    #[test]
    fn should_reject_entity_id_with_empty_object() {
        assert!(EntityId::from_str("light.").is_err());
    }

    #[test]
    fn should_roundtrip_entity_id_through_serde_json() {
        let id: EntityId = "switch.fan".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"switch.fan\"");
        let parsed: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn should_reject_invalid_entity_id_when_deserializing() {
        let result: Result<EntityId, _> = serde_json::from_str("\"nope\"");
        assert!(result.is_err());
    }

    #[test]
    fn should_derive_stable_accessory_id_for_entity() {
        let id: EntityId = "light.kitchen".parse().unwrap();
        assert_eq!(AccessoryId::for_entity(&id), AccessoryId::for_entity(&id));
    }

    #[test]
    fn should_never_derive_bridge_accessory_id() {
        let id: EntityId = "switch.a".parse().unwrap();
        let aid = AccessoryId::for_entity(&id);
        assert_ne!(aid, AccessoryId::BRIDGE);
        assert_ne!(aid.value(), 0);
    }

    #[test]
    fn should_derive_different_ids_for_different_entities() {
        let a: EntityId = "light.kitchen".parse().unwrap();
        let b: EntityId = "light.bedroom".parse().unwrap();
        assert_ne!(AccessoryId::for_entity(&a), AccessoryId::for_entity(&b));
    }
}
