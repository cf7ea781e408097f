//! Accessory — a protocol-facing object exposing characteristics to clients.
//!
//! Every accessory carries exactly one [`AccessoryInformation`] group, set
//! at construction. Its id, category and display name never change; only
//! characteristic values do.

mod category;
mod characteristic;
mod information;

pub use category::Category;
pub use characteristic::{CharacteristicChange, CharacteristicType, CharacteristicValue};
pub use information::{AccessoryInformation, FIRMWARE_REVISION, MANUFACTURER, derive_model_label};

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{HkBridgeError, NotFoundError, ValidationError};
use crate::id::AccessoryId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Accessory {
    id: AccessoryId,
    category: Category,
    information: AccessoryInformation,
    characteristics: BTreeMap<CharacteristicType, CharacteristicValue>,
}

impl Accessory {
    /// Create an accessory with no characteristics beyond its information.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when the information name is empty.
    pub fn new(
        id: AccessoryId,
        category: Category,
        information: AccessoryInformation,
    ) -> Result<Self, HkBridgeError> {
        if information.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(Self {
            id,
            category,
            information,
            characteristics: BTreeMap::new(),
        })
    }

    /// Declare a characteristic with its initial value.
    #[must_use]
    pub fn with_characteristic(
        mut self,
        characteristic: CharacteristicType,
        initial: CharacteristicValue,
    ) -> Self {
        self.characteristics.insert(characteristic, initial);
        self
    }

    #[must_use]
    pub fn id(&self) -> AccessoryId {
        self.id
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.information.name
    }

    #[must_use]
    pub fn information(&self) -> &AccessoryInformation {
        &self.information
    }

    #[must_use]
    pub fn characteristics(&self) -> &BTreeMap<CharacteristicType, CharacteristicValue> {
        &self.characteristics
    }

    #[must_use]
    pub fn get(&self, characteristic: CharacteristicType) -> Option<&CharacteristicValue> {
        self.characteristics.get(&characteristic)
    }

    /// Set a declared characteristic. Returns whether the value changed.
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::NotFound`] if the accessory does not declare
    /// `characteristic`.
    pub fn set(
        &mut self,
        characteristic: CharacteristicType,
        value: CharacteristicValue,
    ) -> Result<bool, HkBridgeError> {
        let slot = self
            .characteristics
            .get_mut(&characteristic)
            .ok_or_else(|| NotFoundError {
                entity: "Characteristic",
                id: format!("{}/{characteristic}", self.id),
            })?;
        if *slot == value {
            return Ok(false);
        }
        *slot = value;
        Ok(true)
    }

    /// Apply a batch of values, returning only those that changed.
    ///
    /// Values for undeclared characteristics are skipped.
    pub fn apply(&mut self, values: Vec<CharacteristicChange>) -> Vec<CharacteristicChange> {
        values
            .into_iter()
            .filter(|change| {
                self.set(change.characteristic, change.value.clone())
                    .unwrap_or(false)
            })
            .collect()
    }
}
