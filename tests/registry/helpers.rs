//! Shared fixtures for registry integration tests.

use edge_registry::device::{
    adapters::{ScriptedCapabilityProber, memory::InMemoryDeviceStore},
    domain::{
        CapabilityVector, ContainerRuntime, DeviceAddress, PlatformAgent, ServiceInfo,
        ServiceStatus, SystemInfo,
    },
    ports::ProbeReport,
    services::{
        DeviceRegistryService, DiscoveryConfig, DiscoveryCoordinator, HealthMonitor,
        HealthMonitorConfig,
    },
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;
use std::time::Duration;

/// Coordinator wired to in-memory adapters.
pub type TestCoordinator =
    DiscoveryCoordinator<InMemoryDeviceStore, ScriptedCapabilityProber, DefaultClock>;

/// Monitor wired to in-memory adapters.
pub type TestMonitor = HealthMonitor<InMemoryDeviceStore, ScriptedCapabilityProber, DefaultClock>;

/// Services sharing one store and one prober.
pub struct Harness {
    /// Backing store.
    pub store: Arc<InMemoryDeviceStore>,
    /// Scripted prober.
    pub prober: Arc<ScriptedCapabilityProber>,
    /// Discovery coordinator.
    pub discovery: Arc<TestCoordinator>,
    /// Registry read/update/delete service.
    pub registry: DeviceRegistryService<InMemoryDeviceStore>,
    /// Health monitor with a short per-device timeout.
    pub monitor: TestMonitor,
}

impl Harness {
    /// Builds a harness with the given discovery settings.
    pub fn with_discovery(config: &DiscoveryConfig) -> Self {
        let store = Arc::new(InMemoryDeviceStore::new());
        let prober = Arc::new(ScriptedCapabilityProber::new());
        let clock = Arc::new(DefaultClock);
        let discovery = Arc::new(DiscoveryCoordinator::new(
            Arc::clone(&store),
            Arc::clone(&prober),
            Arc::clone(&clock),
            config,
        ));
        let monitor = HealthMonitor::new(
            Arc::clone(&store),
            Arc::clone(&prober),
            clock,
            HealthMonitorConfig {
                interval: Duration::from_secs(30),
                probe_timeout: Duration::from_millis(100),
            },
        );
        Self {
            registry: DeviceRegistryService::new(Arc::clone(&store)),
            store,
            prober,
            discovery,
            monitor,
        }
    }
}

/// Provides a harness with default discovery settings.
#[fixture]
pub fn harness() -> Harness {
    Harness::with_discovery(&DiscoveryConfig::default())
}

/// Parses a test address.
pub fn address(raw: &str) -> DeviceAddress {
    DeviceAddress::parse(raw).expect("test address should parse")
}

/// Capabilities of a device running only a container runtime.
pub fn docker_ready() -> CapabilityVector {
    CapabilityVector::new(
        SystemInfo::available().with_architecture("aarch64"),
        ContainerRuntime::installed(Some("24.0.7".to_owned())),
        PlatformAgent::absent(),
        Vec::new(),
    )
}

/// Capabilities of a device running the container runtime and the agent.
pub fn full_platform() -> CapabilityVector {
    CapabilityVector::new(
        SystemInfo::available().with_architecture("aarch64"),
        ContainerRuntime::installed(Some("24.0.7".to_owned())),
        PlatformAgent::deployed(Some("1.4.0".to_owned())),
        vec![ServiceInfo::new("platform-edge", ServiceStatus::Running, 8080)],
    )
}

/// Capabilities of a device exposing only legacy services.
pub fn legacy_edge() -> CapabilityVector {
    CapabilityVector::new(
        SystemInfo::unavailable(),
        ContainerRuntime::absent(),
        PlatformAgent::absent(),
        vec![
            ServiceInfo::new("redis", ServiceStatus::AuthRequired, 6379),
            ServiceInfo::new("nginx", ServiceStatus::Running, 80),
        ],
    )
}

/// Scripts `ip` to answer capability probes with `capabilities`.
pub fn script_device(prober: &ScriptedCapabilityProber, ip: &str, capabilities: CapabilityVector) {
    prober.script_probe(address(ip), Ok(ProbeReport::complete(capabilities)));
}
