//! Device liveness status.

use super::ParseDeviceStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Liveness of a device as last observed by a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    /// The last probe succeeded.
    Online,
    /// The last probe failed or timed out.
    Offline,
    /// No probe outcome has been recorded.
    Unknown,
}

impl DeviceStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DeviceStatus {
    type Error = ParseDeviceStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "unknown" => Ok(Self::Unknown),
            _ => Err(ParseDeviceStatusError(value.to_owned())),
        }
    }
}
