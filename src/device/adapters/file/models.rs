//! On-disk document model for the file device store.

use crate::device::{
    domain::{
        CapabilityVector, CredentialsRef, DataSourceId, DeviceAddress, DeviceId, DeviceName,
        DeviceRecord, DeviceStatus, PersistedDeviceData,
    },
    ports::DeviceStoreError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Current document format version.
pub(super) const FORMAT_VERSION: u32 = 1;

/// Raised when a document declares a format this build cannot read.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported device store format version {found}, expected {FORMAT_VERSION}")]
pub(super) struct UnsupportedFormatVersion {
    found: u32,
}

/// Whole-registry document.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct StoredRegistry {
    pub(super) version: u32,
    pub(super) devices: Vec<StoredDevice>,
}

/// One persisted device.
///
/// `type` is written for operators reading the file and ignored on load;
/// the type is re-derived from `capabilities`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StoredDevice {
    id: Uuid,
    ip: String,
    credentials: StoredCredentials,
    name: String,
    #[serde(rename = "type", default, skip_deserializing)]
    device_type: String,
    status: String,
    capabilities: CapabilityVector,
    #[serde(default)]
    data_sources: Vec<String>,
    last_seen: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredCredentials {
    username: String,
    fingerprint: Option<String>,
}

impl StoredRegistry {
    pub(super) fn from_records(records: &[DeviceRecord]) -> Self {
        Self {
            version: FORMAT_VERSION,
            devices: records.iter().map(StoredDevice::from_record).collect(),
        }
    }

    pub(super) fn into_records(self) -> Result<Vec<DeviceRecord>, DeviceStoreError> {
        if self.version != FORMAT_VERSION {
            return Err(DeviceStoreError::invalid_persisted_data(
                UnsupportedFormatVersion {
                    found: self.version,
                },
            ));
        }
        self.devices
            .into_iter()
            .map(StoredDevice::into_record)
            .collect()
    }
}

impl StoredDevice {
    fn from_record(record: &DeviceRecord) -> Self {
        Self {
            id: record.id().into_inner(),
            ip: record.ip().to_string(),
            credentials: StoredCredentials {
                username: record.credentials_ref().username().to_owned(),
                fingerprint: record.credentials_ref().fingerprint().map(str::to_owned),
            },
            name: record.name().to_string(),
            device_type: record.device_type().as_str().to_owned(),
            status: record.status().as_str().to_owned(),
            capabilities: record.capabilities().clone(),
            data_sources: record
                .data_sources()
                .iter()
                .map(ToString::to_string)
                .collect(),
            last_seen: record.last_seen(),
            created_at: record.created_at(),
        }
    }

    fn into_record(self) -> Result<DeviceRecord, DeviceStoreError> {
        let ip = DeviceAddress::parse(&self.ip).map_err(DeviceStoreError::invalid_persisted_data)?;
        let name = DeviceName::new(self.name).map_err(DeviceStoreError::invalid_persisted_data)?;
        let status = DeviceStatus::try_from(self.status.as_str())
            .map_err(DeviceStoreError::invalid_persisted_data)?;
        let data_sources = self
            .data_sources
            .into_iter()
            .map(DataSourceId::new)
            .collect::<Result<_, _>>()
            .map_err(DeviceStoreError::invalid_persisted_data)?;

        Ok(DeviceRecord::from_persisted(PersistedDeviceData {
            id: DeviceId::from_uuid(self.id),
            ip,
            credentials_ref: CredentialsRef::from_parts(
                self.credentials.username,
                self.credentials.fingerprint,
            ),
            name,
            status,
            capabilities: self.capabilities,
            data_sources,
            last_seen: self.last_seen,
            created_at: self.created_at,
        }))
    }
}
