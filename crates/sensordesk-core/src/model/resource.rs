// ── Resource kinds ──
//
// The console manages a fixed set of REST collections. Each kind knows
// its endpoint, its HAL relation name, and which extras it supports.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// A REST collection managed by the console.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    Devices,
    Sensors,
    Actuators,
    Rules,
    Users,
    Models,
}

impl ResourceKind {
    /// Collection path relative to the API base (`devices`).
    pub fn path(self) -> &'static str {
        match self {
            Self::Devices => "devices",
            Self::Sensors => "sensors",
            Self::Actuators => "actuators",
            Self::Rules => "rules",
            Self::Users => "users",
            Self::Models => "models",
        }
    }

    /// Key under `_embedded` in collection responses.
    pub fn rel(self) -> &'static str {
        self.path()
    }

    /// Singular, capitalized name for messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Devices => "Device",
            Self::Sensors => "Sensor",
            Self::Actuators => "Actuator",
            Self::Rules => "Rule",
            Self::Users => "User",
            Self::Models => "Model",
        }
    }

    /// Devices and sensors expose `{path}/{id}/key`.
    pub fn supports_key_lookup(self) -> bool {
        matches!(self, Self::Devices | Self::Sensors)
    }
}
