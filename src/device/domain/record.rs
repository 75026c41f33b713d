//! Device record aggregate root and the updates that may be applied to it.

use super::{
    CapabilityVector, CredentialsRef, DataSourceId, DeviceAddress, DeviceId, DeviceName,
    DeviceStatus, DeviceType, classify,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::BTreeSet;

/// Device record aggregate root.
///
/// `device_type` is never stored independently of `capabilities`: every
/// constructor and mutation that touches the capability vector re-runs the
/// classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    id: DeviceId,
    ip: DeviceAddress,
    credentials_ref: CredentialsRef,
    name: DeviceName,
    device_type: DeviceType,
    status: DeviceStatus,
    capabilities: CapabilityVector,
    data_sources: BTreeSet<DataSourceId>,
    last_seen: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing persisted device state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedDeviceData {
    /// Persisted device identifier.
    pub id: DeviceId,
    /// Persisted probe address.
    pub ip: DeviceAddress,
    /// Persisted credentials reference.
    pub credentials_ref: CredentialsRef,
    /// Persisted device name.
    pub name: DeviceName,
    /// Persisted liveness status.
    pub status: DeviceStatus,
    /// Persisted capability vector.
    pub capabilities: CapabilityVector,
    /// Persisted data source opt-ins.
    pub data_sources: BTreeSet<DataSourceId>,
    /// Persisted last successful probe time.
    pub last_seen: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Client-settable fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDetailsPatch {
    name: Option<DeviceName>,
    data_sources: Option<BTreeSet<DataSourceId>>,
}

impl DeviceDetailsPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the replacement name.
    #[must_use]
    pub fn with_name(mut self, name: DeviceName) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets the replacement data source set.
    #[must_use]
    pub fn with_data_sources(mut self, sources: impl IntoIterator<Item = DataSourceId>) -> Self {
        self.data_sources = Some(sources.into_iter().collect());
        self
    }

    /// Returns the replacement name, if any.
    #[must_use]
    pub const fn name(&self) -> Option<&DeviceName> {
        self.name.as_ref()
    }

    /// Returns the replacement data sources, if any.
    #[must_use]
    pub const fn data_sources(&self) -> Option<&BTreeSet<DataSourceId>> {
        self.data_sources.as_ref()
    }

    /// Returns whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.data_sources.is_none()
    }
}

/// Outcome of a liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessObservation {
    /// The device answered at the given instant.
    Reachable {
        /// When the successful probe completed.
        at: DateTime<Utc>,
    },
    /// The device failed or timed out.
    Unreachable,
}

/// Fresh probe results for an already registered device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rediscovery {
    /// Newly probed capability vector.
    pub capabilities: CapabilityVector,
    /// Reference to the credentials used for the probe.
    pub credentials_ref: CredentialsRef,
    /// When the probe completed.
    pub observed_at: DateTime<Utc>,
    /// Client-settable fields supplied with the re-registration.
    pub details: DeviceDetailsPatch,
}

/// A narrow mutation applied atomically by a device store.
///
/// Each variant touches a disjoint set of fields, so a health poll and a
/// client edit racing on the same record cannot overwrite each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceUpdate {
    /// Writes `status` and, when reachable, `last_seen`.
    Liveness(LivenessObservation),
    /// Writes `name` and `data_sources`.
    Details(DeviceDetailsPatch),
    /// Replaces capabilities and re-derives type, marks the device online.
    Rediscovery(Rediscovery),
}

impl DeviceRecord {
    /// Creates the record for a freshly discovered device.
    ///
    /// The device is classified, marked online, and stamped with the clock's
    /// current time as both `created_at` and `last_seen`.
    #[must_use]
    pub fn discovered(
        ip: DeviceAddress,
        credentials_ref: CredentialsRef,
        name: Option<DeviceName>,
        capabilities: CapabilityVector,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        let resolved_name = name.unwrap_or_else(|| DeviceName::derived_from(&ip));
        Self {
            id: DeviceId::new(),
            device_type: classify(&capabilities),
            ip,
            credentials_ref,
            name: resolved_name,
            status: DeviceStatus::Online,
            capabilities,
            data_sources: BTreeSet::new(),
            last_seen: Some(timestamp),
            created_at: timestamp,
        }
    }

    /// Reconstructs a record from persistence.
    ///
    /// The device type is re-derived rather than trusted from storage.
    #[must_use]
    pub fn from_persisted(data: PersistedDeviceData) -> Self {
        Self {
            id: data.id,
            device_type: classify(&data.capabilities),
            ip: data.ip,
            credentials_ref: data.credentials_ref,
            name: data.name,
            status: data.status,
            capabilities: data.capabilities,
            data_sources: data.data_sources,
            last_seen: data.last_seen,
            created_at: data.created_at,
        }
    }

    /// Replaces the data source set.
    #[must_use]
    pub fn with_data_sources(mut self, sources: impl IntoIterator<Item = DataSourceId>) -> Self {
        self.data_sources = sources.into_iter().collect();
        self
    }

    /// Returns the device identifier.
    #[must_use]
    pub const fn id(&self) -> DeviceId {
        self.id
    }

    /// Returns the probe address.
    #[must_use]
    pub const fn ip(&self) -> &DeviceAddress {
        &self.ip
    }

    /// Returns the credentials reference.
    #[must_use]
    pub const fn credentials_ref(&self) -> &CredentialsRef {
        &self.credentials_ref
    }

    /// Returns the device name.
    #[must_use]
    pub const fn name(&self) -> &DeviceName {
        &self.name
    }

    /// Returns the derived device type.
    #[must_use]
    pub const fn device_type(&self) -> DeviceType {
        self.device_type
    }

    /// Returns the liveness status.
    #[must_use]
    pub const fn status(&self) -> DeviceStatus {
        self.status
    }

    /// Returns the capability vector.
    #[must_use]
    pub const fn capabilities(&self) -> &CapabilityVector {
        &self.capabilities
    }

    /// Returns the data source opt-ins.
    #[must_use]
    pub const fn data_sources(&self) -> &BTreeSet<DataSourceId> {
        &self.data_sources
    }

    /// Returns the time of the last successful probe.
    #[must_use]
    pub const fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_seen
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Applies a store-level update in place.
    pub fn apply(&mut self, update: DeviceUpdate) {
        match update {
            DeviceUpdate::Liveness(observation) => self.observe_liveness(observation),
            DeviceUpdate::Details(patch) => self.apply_details(patch),
            DeviceUpdate::Rediscovery(rediscovery) => self.apply_rediscovery(rediscovery),
        }
    }

    fn observe_liveness(&mut self, observation: LivenessObservation) {
        match observation {
            LivenessObservation::Reachable { at } => {
                self.status = DeviceStatus::Online;
                self.last_seen = Some(at);
            }
            LivenessObservation::Unreachable => self.status = DeviceStatus::Offline,
        }
    }

    fn apply_details(&mut self, patch: DeviceDetailsPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(sources) = patch.data_sources {
            self.data_sources = sources;
        }
    }

    fn apply_rediscovery(&mut self, rediscovery: Rediscovery) {
        self.device_type = classify(&rediscovery.capabilities);
        self.capabilities = rediscovery.capabilities;
        self.credentials_ref = rediscovery.credentials_ref;
        self.status = DeviceStatus::Online;
        self.last_seen = Some(rediscovery.observed_at);
        self.apply_details(rediscovery.details);
    }
}
