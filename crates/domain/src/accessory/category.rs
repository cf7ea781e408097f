//! Accessory category — drives the icon a client shows.

use serde::{Deserialize, Serialize};

/// Accessory category with its protocol code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Other,
    Bridge,
    Fan,
    GarageDoorOpener,
    Lightbulb,
    DoorLock,
    Outlet,
    Switch,
    Thermostat,
    Sensor,
    SecuritySystem,
    Door,
    Window,
    WindowCovering,
    ProgrammableSwitch,
}

impl Category {
    /// Numeric code used in the setup payload.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Other => 1,
            Self::Bridge => 2,
            Self::Fan => 3,
            Self::GarageDoorOpener => 4,
            Self::Lightbulb => 5,
            Self::DoorLock => 6,
            Self::Outlet => 7,
            Self::Switch => 8,
            Self::Thermostat => 9,
            Self::Sensor => 10,
            Self::SecuritySystem => 11,
            Self::Door => 12,
            Self::Window => 13,
            Self::WindowCovering => 14,
            Self::ProgrammableSwitch => 15,
        }
    }
}
