//! Capability vector reported by a device probe.
//!
//! The vector is a fixed, tagged structure: every sub-capability has explicit
//! fields, and unavailable facts are `false` or `None` rather than absent
//! keys. Only services that answered a probe appear in
//! [`CapabilityVector::services`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// System metadata reported by the device health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    available: bool,
    architecture: Option<String>,
    memory: Option<String>,
    storage: Option<String>,
    service: Option<String>,
    version: Option<String>,
    #[serde(rename = "timestamp")]
    reported_at: Option<DateTime<Utc>>,
}

impl SystemInfo {
    /// System facts for a device whose health endpoint did not answer.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// System facts for a device whose health endpoint answered.
    #[must_use]
    pub fn available() -> Self {
        Self {
            available: true,
            ..Self::default()
        }
    }

    /// Sets the CPU architecture string.
    #[must_use]
    pub fn with_architecture(mut self, architecture: impl Into<String>) -> Self {
        self.architecture = Some(architecture.into());
        self
    }

    /// Sets the memory description.
    #[must_use]
    pub fn with_memory(mut self, memory: impl Into<String>) -> Self {
        self.memory = Some(memory.into());
        self
    }

    /// Sets the storage description.
    #[must_use]
    pub fn with_storage(mut self, storage: impl Into<String>) -> Self {
        self.storage = Some(storage.into());
        self
    }

    /// Sets the service name the device reported about itself.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Sets the software version the device reported.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the timestamp the device reported in its health payload.
    #[must_use]
    pub const fn with_reported_at(mut self, reported_at: DateTime<Utc>) -> Self {
        self.reported_at = Some(reported_at);
        self
    }

    /// Returns whether the health endpoint answered.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.available
    }

    /// Returns the CPU architecture, if reported.
    #[must_use]
    pub fn architecture(&self) -> Option<&str> {
        self.architecture.as_deref()
    }

    /// Returns the memory description, if reported.
    #[must_use]
    pub fn memory(&self) -> Option<&str> {
        self.memory.as_deref()
    }

    /// Returns the storage description, if reported.
    #[must_use]
    pub fn storage(&self) -> Option<&str> {
        self.storage.as_deref()
    }

    /// Returns the self-reported service name, if any.
    #[must_use]
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// Returns the self-reported version, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the self-reported timestamp, if any.
    #[must_use]
    pub const fn reported_at(&self) -> Option<DateTime<Utc>> {
        self.reported_at
    }
}

/// Container runtime presence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerRuntime {
    installed: bool,
    version: Option<String>,
}

impl ContainerRuntime {
    /// No container runtime answered.
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    /// A container runtime answered, optionally with its version.
    #[must_use]
    pub const fn installed(version: Option<String>) -> Self {
        Self {
            installed: true,
            version,
        }
    }

    /// Returns whether a runtime is installed.
    #[must_use]
    pub const fn is_installed(&self) -> bool {
        self.installed
    }

    /// Returns the runtime version, if reported.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

/// Platform agent deployment state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAgent {
    deployed: bool,
    version: Option<String>,
}

impl PlatformAgent {
    /// The agent marker did not answer.
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    /// The agent marker answered, optionally with its version.
    #[must_use]
    pub const fn deployed(version: Option<String>) -> Self {
        Self {
            deployed: true,
            version,
        }
    }

    /// Returns whether the agent is deployed.
    #[must_use]
    pub const fn is_deployed(&self) -> bool {
        self.deployed
    }

    /// Returns the agent version, if reported.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

/// Observed state of a well-known service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// The service answered normally.
    Running,
    /// The service answered but demanded authentication.
    AuthRequired,
}

impl ServiceStatus {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::AuthRequired => "auth_required",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A well-known service found on a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    name: String,
    status: ServiceStatus,
    port: u16,
}

impl ServiceInfo {
    /// Creates a service entry.
    #[must_use]
    pub fn new(name: impl Into<String>, status: ServiceStatus, port: u16) -> Self {
        Self {
            name: name.into(),
            status,
            port,
        }
    }

    /// Returns the service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the observed status.
    #[must_use]
    pub const fn status(&self) -> ServiceStatus {
        self.status
    }

    /// Returns the port the service answered on.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

/// Structured capability vector for a device.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityVector {
    system: SystemInfo,
    container_runtime: ContainerRuntime,
    platform_agent: PlatformAgent,
    services: Vec<ServiceInfo>,
}

impl CapabilityVector {
    /// Assembles a capability vector from settled sub-checks.
    #[must_use]
    pub const fn new(
        system: SystemInfo,
        container_runtime: ContainerRuntime,
        platform_agent: PlatformAgent,
        services: Vec<ServiceInfo>,
    ) -> Self {
        Self {
            system,
            container_runtime,
            platform_agent,
            services,
        }
    }

    /// Vector with every capability reported as absent.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns system metadata.
    #[must_use]
    pub const fn system(&self) -> &SystemInfo {
        &self.system
    }

    /// Returns container runtime state.
    #[must_use]
    pub const fn container_runtime(&self) -> &ContainerRuntime {
        &self.container_runtime
    }

    /// Returns platform agent state.
    #[must_use]
    pub const fn platform_agent(&self) -> &PlatformAgent {
        &self.platform_agent
    }

    /// Returns the services that answered.
    #[must_use]
    pub fn services(&self) -> &[ServiceInfo] {
        &self.services
    }
}
