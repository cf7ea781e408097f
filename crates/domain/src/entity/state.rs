//! Entity state — the current operational state of an upstream entity.

use serde::{Deserialize, Serialize};

/// Discrete operational state of an entity.
///
/// Upstream states are strings; the well-known ones get their own variant
/// and anything else (sensor readings, modes, …) is kept verbatim in
/// [`Other`](Self::Other).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityState {
    On,
    Off,
    Locked,
    Unlocked,
    Jammed,
    Open,
    Closed,
    #[default]
    Unknown,
    Unavailable,
    Other(String),
}

impl EntityState {
    /// Whether the entity is reachable (anything but [`Unavailable`](Self::Unavailable)).
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    /// Parse the state as a number, as sensors report their reading.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Other(raw) => raw.trim().parse().ok().filter(|v: &f64| v.is_finite()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
            Self::Jammed => "jammed",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Unknown => "unknown",
            Self::Unavailable => "unavailable",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for EntityState {
    fn from(value: &str) -> Self {
        match value {
            "on" => Self::On,
            "off" => Self::Off,
            "locked" => Self::Locked,
            "unlocked" => Self::Unlocked,
            "jammed" => Self::Jammed,
            "open" => Self::Open,
            "closed" => Self::Closed,
            "unknown" => Self::Unknown,
            "unavailable" => Self::Unavailable,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for EntityState {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<EntityState> for String {
    fn from(value: EntityState) -> Self {
        match value {
            EntityState::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for EntityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
