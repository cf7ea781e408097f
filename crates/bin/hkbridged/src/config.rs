//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `hkbridge.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use chrono::TimeDelta;
use serde::Deserialize;

use hkbridge_app::home_accessory::AccessoryOverrides;
use hkbridge_domain::id::{AccessoryId, EntityId};
use hkbridge_domain::pairing::{PairingState, PinCode, SetupId};
use hkbridge_domain::time::millis;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bridge identity and pairing settings.
    pub bridge: BridgeConfig,
    /// Debounce timing.
    pub debounce: DebounceConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Entities to expose. Empty means every entity the integrations know.
    pub accessories: Vec<AccessoryConfig>,
    /// Integration toggles.
    pub integrations: IntegrationsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Name shown to clients.
    pub name: String,
    /// Setup code (`XXX-XX-XXX`). Generated at startup when absent.
    pub pin: Option<String>,
    /// Four-character setup id. Generated at startup when absent.
    pub setup_id: Option<String>,
    /// Key under which the presenter shows the setup message.
    pub context: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Quiet period before a burst of changes is dispatched.
    pub quiet_period_ms: u64,
    /// Period of the time-changed signal that closes windows.
    pub tick_interval_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// One exposed entity with optional identity overrides.
#[derive(Debug, Deserialize)]
pub struct AccessoryConfig {
    pub entity_id: String,
    pub aid: Option<u64>,
    pub name: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
}

/// Per-integration toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    /// Enable the virtual/demo home.
    pub virtual_enabled: bool,
}

impl Config {
    /// Load configuration from `hkbridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("hkbridge.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HKBRIDGE_NAME") {
            self.bridge.name = val;
        }
        if let Ok(val) = std::env::var("HKBRIDGE_PIN") {
            self.bridge.pin = Some(val);
        }
        if let Ok(val) = std::env::var("HKBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bridge.name.trim().is_empty() {
            return Err(ConfigError::Validation("bridge name must not be empty".to_string()));
        }
        if self.debounce.quiet_period_ms == 0 {
            return Err(ConfigError::Validation(
                "quiet_period_ms must be non-zero".to_string(),
            ));
        }
        if self.debounce.tick_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "tick_interval_ms must be non-zero".to_string(),
            ));
        }
        self.pairing_state()?;
        for accessory in &self.accessories {
            accessory.entity_id()?;
            if accessory.aid == Some(AccessoryId::BRIDGE.value()) || accessory.aid == Some(0) {
                return Err(ConfigError::Validation(format!(
                    "aid of {} must not be 0 or 1",
                    accessory.entity_id
                )));
            }
        }
        Ok(())
    }

    /// Pairing state from the configured pin and setup id, generating
    /// whichever is missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a malformed pin or setup id.
    pub fn pairing_state(&self) -> Result<PairingState, ConfigError> {
        let pin = match &self.bridge.pin {
            Some(raw) => raw
                .parse::<PinCode>()
                .map_err(|err| ConfigError::Validation(err.to_string()))?,
            None => PinCode::generate(),
        };
        let setup_id = match &self.bridge.setup_id {
            Some(raw) => raw
                .parse::<SetupId>()
                .map_err(|err| ConfigError::Validation(err.to_string()))?,
            None => SetupId::generate(),
        };
        Ok(PairingState::new(pin, setup_id))
    }

    #[must_use]
    pub fn quiet_period(&self) -> TimeDelta {
        millis(self.debounce.quiet_period_ms)
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.debounce.tick_interval_ms)
    }
}

impl AccessoryConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a malformed entity id.
    pub fn entity_id(&self) -> Result<EntityId, ConfigError> {
        self.entity_id
            .parse()
            .map_err(|err: hkbridge_domain::error::ValidationError| {
                ConfigError::Validation(err.to_string())
            })
    }

    /// The configured aid, or one derived from the entity id.
    #[must_use]
    pub fn aid(&self, entity_id: &EntityId) -> AccessoryId {
        self.aid
            .map_or_else(|| AccessoryId::for_entity(entity_id), AccessoryId::new)
    }

    #[must_use]
    pub fn overrides(&self) -> AccessoryOverrides {
        AccessoryOverrides {
            name: self.name.clone(),
            model: self.model.clone(),
            manufacturer: self.manufacturer.clone(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            name: "hkbridge".to_string(),
            pin: None,
            setup_id: None,
            context: "hkbridged".to_string(),
        }
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: 3_000,
            tick_interval_ms: 1_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "hkbridged=info,hkbridge_app=info,hkbridge_adapter_virtual=info".to_string(),
        }
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            virtual_enabled: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
