//! Application services for discovery, registry operations, and health
//! polling.

mod discovery;
mod health;
mod lock;
mod registry;

pub use discovery::{
    Discovery, DiscoveryConfig, DiscoveryCoordinator, DiscoveryDisposition, DiscoveryError,
    DiscoveryRequest, DiscoveryResult,
};
pub use health::{HealthMonitor, HealthMonitorConfig, PollSummary};
pub use lock::DiscoveryLockScope;
pub use registry::{
    DeviceRegistryService, DeviceRegistryServiceError, DeviceRegistryServiceResult,
    UpdateDeviceRequest,
};
