//! Bridge registry — the bridge accessory and the accessories it owns.

use std::collections::BTreeMap;

use hkbridge_domain::accessory::{
    Accessory, AccessoryInformation, Category, FIRMWARE_REVISION, MANUFACTURER,
};
use hkbridge_domain::error::{DuplicateIdentityError, HkBridgeError, ValidationError};
use hkbridge_domain::id::{AccessoryId, EntityId};
use hkbridge_domain::pairing::PairingState;

use crate::home_accessory::HomeAccessory;
use crate::ports::Presenter;

/// Upper bound on accessories behind one bridge.
pub const MAX_BRIDGED_ACCESSORIES: usize = 150;

const BRIDGE_MODEL: &str = "Bridge";
const BRIDGE_SERIAL: &str = "hkbridge.bridge";

pub struct HomeBridge {
    accessory: Accessory,
    accessories: BTreeMap<AccessoryId, HomeAccessory>,
}

impl HomeBridge {
    /// Create an empty bridge named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `name` is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, HkBridgeError> {
        let information = AccessoryInformation {
            name: name.into(),
            manufacturer: MANUFACTURER.to_string(),
            model: BRIDGE_MODEL.to_string(),
            serial_number: BRIDGE_SERIAL.to_string(),
            firmware_revision: FIRMWARE_REVISION.to_string(),
        };
        Ok(Self {
            accessory: Accessory::new(AccessoryId::BRIDGE, Category::Bridge, information)?,
            accessories: BTreeMap::new(),
        })
    }

    /// The bridge's own accessory (aid 1).
    #[must_use]
    pub fn accessory(&self) -> &Accessory {
        &self.accessory
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.accessory.display_name()
    }

    /// Take ownership of `accessory`.
    ///
    /// # Errors
    ///
    /// - [`HkBridgeError::DuplicateIdentity`] when the aid is already used
    ///   (including the bridge's own aid).
    /// - [`ValidationError::BridgeFull`] past [`MAX_BRIDGED_ACCESSORIES`].
    /// - [`ValidationError::EntityAlreadyBound`] when another accessory
    ///   already follows the same entity.
    pub fn add(&mut self, accessory: HomeAccessory) -> Result<(), HkBridgeError> {
        let aid = accessory.aid();
        if aid == AccessoryId::BRIDGE || self.accessories.contains_key(&aid) {
            return Err(DuplicateIdentityError { aid }.into());
        }
        if self.accessories.len() >= MAX_BRIDGED_ACCESSORIES {
            return Err(ValidationError::BridgeFull {
                max: MAX_BRIDGED_ACCESSORIES,
            }
            .into());
        }
        if self.find_by_entity(accessory.entity_id()).is_some() {
            return Err(ValidationError::EntityAlreadyBound(accessory.entity_id().to_string()).into());
        }
        tracing::debug!(%aid, entity_id = %accessory.entity_id(), kind = accessory.kind(), "accessory added");
        self.accessories.insert(aid, accessory);
        Ok(())
    }

    /// Remove and return the accessory with `aid`.
    pub fn remove(&mut self, aid: AccessoryId) -> Option<HomeAccessory> {
        self.accessories.remove(&aid)
    }

    #[must_use]
    pub fn get(&self, aid: AccessoryId) -> Option<&HomeAccessory> {
        self.accessories.get(&aid)
    }

    pub fn get_mut(&mut self, aid: AccessoryId) -> Option<&mut HomeAccessory> {
        self.accessories.get_mut(&aid)
    }

    #[must_use]
    pub fn find_by_entity(&self, entity_id: &EntityId) -> Option<&HomeAccessory> {
        self.accessories
            .values()
            .find(|acc| acc.entity_id() == entity_id)
    }

    pub fn find_by_entity_mut(&mut self, entity_id: &EntityId) -> Option<&mut HomeAccessory> {
        self.accessories
            .values_mut()
            .find(|acc| acc.entity_id() == entity_id)
    }

    /// Accessories in aid order.
    pub fn iter(&self) -> impl Iterator<Item = &HomeAccessory> {
        self.accessories.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accessories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accessories.is_empty()
    }

    /// Publish the pairing information through `presenter`.
    ///
    /// Presentation failures are logged and swallowed. Repeated calls show
    /// the same message again.
    pub fn setup_message<S: Presenter>(&self, presenter: &S, context: &str, pairing: &PairingState) {
        let message = pairing.setup_message(self.name(), Category::Bridge);
        if let Err(err) = presenter.show_setup_message(context, &message) {
            tracing::warn!(error = %err, context, "failed to show setup message");
        }
    }
}

impl std::fmt::Debug for HomeBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeBridge")
            .field("name", &self.name())
            .field("accessories", &self.accessories.len())
            .finish()
    }
}
