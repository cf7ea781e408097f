//! Event — an immutable record of something that happened upstream.
//!
//! Events carry a source key (the entity id, when there is one), a
//! timestamp, and a payload. Ordering only matters within one key.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::{EntityId, EventId};
use crate::service::ServiceCall;
use crate::time::{Timestamp, now};

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// An entity changed. `new_state` is `None` when the entity was removed.
    StateChanged {
        old_state: Option<Entity>,
        new_state: Option<Entity>,
    },
    /// A service was requested.
    CallService(ServiceCall),
    /// Time advanced; drives debounce windows.
    TimeChanged,
}

/// A timestamped event with an optional source key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub entity_id: Option<EntityId>,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    /// Create a new event stamped with the current time.
    #[must_use]
    pub fn new(entity_id: Option<EntityId>, payload: EventPayload) -> Self {
        Self {
            id: EventId::new(),
            entity_id,
            timestamp: now(),
            payload,
        }
    }

    /// Override the timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// `StateChanged` event keyed by the entity in `new_state` (or `old_state`).
    ///
    /// Returns `None` when both snapshots are absent.
    #[must_use]
    pub fn state_changed(old_state: Option<Entity>, new_state: Option<Entity>) -> Option<Self> {
        let key = new_state
            .as_ref()
            .or(old_state.as_ref())
            .map(|e| e.entity_id.clone())?;
        Some(Self::new(
            Some(key),
            EventPayload::StateChanged {
                old_state,
                new_state,
            },
        ))
    }

    #[must_use]
    pub fn call_service(call: ServiceCall) -> Self {
        Self::new(Some(call.entity_id.clone()), EventPayload::CallService(call))
    }

    #[must_use]
    pub fn time_changed(timestamp: Timestamp) -> Self {
        Self::new(None, EventPayload::TimeChanged).at(timestamp)
    }
}
