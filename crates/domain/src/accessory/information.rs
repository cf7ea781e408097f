//! Accessory information — the identity group every accessory carries.

use serde::{Deserialize, Serialize};

/// Manufacturer reported for every accessory unless overridden.
pub const MANUFACTURER: &str = "hkbridge";

/// Firmware revision reported for every accessory: the build version.
pub const FIRMWARE_REVISION: &str = env!("CARGO_PKG_VERSION");

/// Identity fields shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryInformation {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub firmware_revision: String,
}

impl AccessoryInformation {
    /// Information with the build-wide manufacturer and firmware revision.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        serial_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            manufacturer: MANUFACTURER.to_string(),
            model: model.into(),
            serial_number: serial_number.into(),
            firmware_revision: FIRMWARE_REVISION.to_string(),
        }
    }
}

/// Turn an entity domain into a model label: `test_model` → `Test Model`.
#[must_use]
pub fn derive_model_label(domain: &str) -> String {
    domain
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
