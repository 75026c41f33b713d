//! Device-type taxonomy and the classifier that derives it.

use super::{CapabilityVector, ParseDeviceTypeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of what can be deployed to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceType {
    /// Container runtime and platform agent are both present.
    FullPlatform,
    /// Container runtime present, platform agent absent.
    DockerReady,
    /// No container runtime, but well-known services answered.
    LegacyEdge,
    /// Nothing beyond basic reachability.
    BasicEdge,
}

impl DeviceType {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullPlatform => "full-platform",
            Self::DockerReady => "docker-ready",
            Self::LegacyEdge => "legacy-edge",
            Self::BasicEdge => "basic-edge",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DeviceType {
    type Error = ParseDeviceTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "full-platform" => Ok(Self::FullPlatform),
            "docker-ready" => Ok(Self::DockerReady),
            "legacy-edge" => Ok(Self::LegacyEdge),
            "basic-edge" => Ok(Self::BasicEdge),
            _ => Err(ParseDeviceTypeError(value.to_owned())),
        }
    }
}

/// Maps a capability vector to its device type.
///
/// Rules are checked in priority order and the first match wins.
#[must_use]
pub fn classify(capabilities: &CapabilityVector) -> DeviceType {
    let has_runtime = capabilities.container_runtime().is_installed();
    let has_agent = capabilities.platform_agent().is_deployed();

    match (has_runtime, has_agent) {
        (true, true) => DeviceType::FullPlatform,
        (true, false) => DeviceType::DockerReady,
        (false, _) if !capabilities.services().is_empty() => DeviceType::LegacyEdge,
        (false, _) => DeviceType::BasicEdge,
    }
}
