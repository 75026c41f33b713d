//! Shared world state for device discovery BDD scenarios.

use chrono::{DateTime, Utc};
use edge_registry::device::{
    adapters::{ScriptedCapabilityProber, memory::InMemoryDeviceStore},
    domain::{
        CapabilityVector, ContainerRuntime, DeviceAddress, DeviceId, PlatformAgent, SystemInfo,
    },
    ports::ProbeReport,
    services::{
        Discovery, DiscoveryConfig, DiscoveryCoordinator, DiscoveryError, DiscoveryRequest,
        HealthMonitor, HealthMonitorConfig,
    },
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;
use std::time::Duration;

/// Coordinator type used by the BDD world.
pub type TestCoordinator =
    DiscoveryCoordinator<InMemoryDeviceStore, ScriptedCapabilityProber, DefaultClock>;

/// Monitor type used by the BDD world.
pub type TestMonitor = HealthMonitor<InMemoryDeviceStore, ScriptedCapabilityProber, DefaultClock>;

/// Scenario world for discovery and health behaviour tests.
pub struct DiscoveryWorld {
    /// Backing store.
    pub store: Arc<InMemoryDeviceStore>,
    /// Scripted prober standing in for the network.
    pub prober: Arc<ScriptedCapabilityProber>,
    /// Coordinator under test.
    pub coordinator: TestCoordinator,
    /// Health monitor under test.
    pub monitor: TestMonitor,
    /// Address of the device the scenario is about.
    pub current_address: Option<DeviceAddress>,
    /// Identifier assigned by the first discovery.
    pub first_id: Option<DeviceId>,
    /// Result of the last discovery attempt.
    pub last_discovery: Option<Result<Discovery, DiscoveryError>>,
    /// `last_seen` captured before the most recent poll.
    pub last_seen_before_poll: Option<DateTime<Utc>>,
}

impl DiscoveryWorld {
    /// Creates a world with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryDeviceStore::new());
        let prober = Arc::new(ScriptedCapabilityProber::new());
        let clock = Arc::new(DefaultClock);
        let coordinator = DiscoveryCoordinator::new(
            Arc::clone(&store),
            Arc::clone(&prober),
            Arc::clone(&clock),
            &DiscoveryConfig::default(),
        );
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
            store,
            prober,
            coordinator,
            monitor,
            current_address: None,
            first_id: None,
            last_discovery: None,
            last_seen_before_poll: None,
        }
    }

    /// Scripts the capability probe answer for `ip`.
    pub fn script(&self, ip: &str, capabilities: CapabilityVector) -> Result<(), eyre::Report> {
        let address = DeviceAddress::parse(ip)?;
        self.prober
            .script_probe(address, Ok(ProbeReport::complete(capabilities)));
        Ok(())
    }

    /// Runs a discovery of `ip` and records its result.
    pub fn discover(&mut self, ip: &str) {
        let result = run_async(self.coordinator.discover(DiscoveryRequest::new(ip, "pi")));
        if let Ok(discovery) = &result {
            self.first_id.get_or_insert(discovery.record.id());
        }
        self.current_address = DeviceAddress::parse(ip).ok();
        self.last_discovery = Some(result);
    }

    /// Returns the address the scenario is about.
    pub fn address(&self) -> Result<&DeviceAddress, eyre::Report> {
        self.current_address
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no device address in scenario world"))
    }
}

impl Default for DiscoveryWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DiscoveryWorld {
    DiscoveryWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Capabilities of a host with only a container runtime.
pub fn docker_only() -> CapabilityVector {
    CapabilityVector::new(
        SystemInfo::available(),
        ContainerRuntime::installed(Some("24.0.7".to_owned())),
        PlatformAgent::absent(),
        Vec::new(),
    )
}

/// Capabilities of a host with the container runtime and platform agent.
pub fn docker_with_agent() -> CapabilityVector {
    CapabilityVector::new(
        SystemInfo::available(),
        ContainerRuntime::installed(Some("24.0.7".to_owned())),
        PlatformAgent::deployed(Some("1.4.0".to_owned())),
        Vec::new(),
    )
}
