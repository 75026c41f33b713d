//! Wire representations for the registry API.

use crate::device::domain::{
    CapabilityVector, DeviceId, DeviceRecord, DeviceStatus, DeviceType, ServiceInfo,
};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Device as returned by every device endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    /// Device identifier.
    pub id: DeviceId,
    /// Probe address.
    pub ip: String,
    /// Display name.
    pub name: String,
    /// Username used for probing.
    pub username: String,
    /// Derived device type.
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    /// Liveness status.
    pub status: DeviceStatus,
    /// Last stored capability vector.
    pub capabilities: CapabilityVector,
    /// Data source opt-ins.
    pub data_sources: Vec<String>,
    /// Last successful probe.
    pub last_seen: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<DeviceRecord> for DeviceResponse {
    fn from(record: DeviceRecord) -> Self {
        Self {
            id: record.id(),
            ip: record.ip().to_string(),
            name: record.name().as_str().to_owned(),
            username: record.credentials_ref().username().to_owned(),
            device_type: record.device_type(),
            status: record.status(),
            data_sources: record
                .data_sources()
                .iter()
                .map(|source| source.as_str().to_owned())
                .collect(),
            last_seen: record.last_seen(),
            created_at: record.created_at(),
            capabilities: record.capabilities().clone(),
        }
    }
}

/// Body of `POST /api/devices`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceBody {
    /// Address to probe.
    #[serde(default)]
    pub ip: Option<String>,
    /// Probe username.
    #[serde(default)]
    pub username: Option<String>,
    /// Probe secret.
    #[serde(default, alias = "password")]
    pub credentials: Option<SecretString>,
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional initial data sources.
    #[serde(default)]
    pub data_sources: Option<Vec<String>>,
}

/// Body of `PUT /api/devices/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateDeviceBody {
    /// Replacement name.
    #[serde(default)]
    pub name: Option<String>,
    /// Replacement data sources.
    #[serde(default)]
    pub data_sources: Option<Vec<String>>,
}

/// Body of `GET /api/devices/{id}/services`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicesResponse {
    /// Services observed at the last discovery.
    pub services: Vec<ServiceInfo>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    /// Service name.
    pub service: &'static str,
    /// Always `healthy` while the process answers.
    pub status: &'static str,
    /// Time of the answer.
    pub timestamp: DateTime<Utc>,
    /// Crate version.
    pub version: &'static str,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: &'static str,
}
