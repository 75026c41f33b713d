//! Domain model for edge devices.
//!
//! Covers device identity, the capability vector produced by probing, the
//! classifier that maps capabilities to a device type, and the record
//! aggregate with its narrow update variants. Infrastructure concerns remain
//! outside this boundary.

mod capabilities;
mod classification;
mod credentials;
mod error;
mod ids;
mod record;
mod status;

pub use capabilities::{
    CapabilityVector, ContainerRuntime, PlatformAgent, ServiceInfo, ServiceStatus, SystemInfo,
};
pub use classification::{DeviceType, classify};
pub use credentials::{CredentialsRef, ProbeCredentials};
pub use error::{DeviceDomainError, ParseDeviceStatusError, ParseDeviceTypeError};
pub use ids::{DataSourceId, DeviceAddress, DeviceId, DeviceName};
pub use record::{
    DeviceDetailsPatch, DeviceRecord, DeviceUpdate, LivenessObservation, PersistedDeviceData,
    Rediscovery,
};
pub use status::DeviceStatus;
