//! Service — an action request sent upstream, e.g. `light.turn_on`.

use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// A request for the upstream system to act on an entity.
///
/// The bridge emits these in response to client commands and never assumes
/// they succeed; the next state change for the entity reconciles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCall {
    pub domain: String,
    pub service: String,
    pub entity_id: EntityId,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ServiceCall {
    /// Call `service` in the entity's own domain with no extra data.
    #[must_use]
    pub fn new(entity_id: &EntityId, service: impl Into<String>) -> Self {
        Self {
            domain: entity_id.domain().to_string(),
            service: service.into(),
            entity_id: entity_id.clone(),
            data: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

impl std::fmt::Display for ServiceCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}({})", self.domain, self.service, self.entity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_use_entity_domain() {
        let id: EntityId = "lock.front_door".parse().unwrap();
        let call = ServiceCall::new(&id, "unlock");
        assert_eq!(call.domain, "lock");
        assert_eq!(call.to_string(), "lock.unlock(lock.front_door)");
    }
}
