//! Prober port for capability discovery and liveness checks.

use crate::device::domain::{CapabilityVector, DeviceAddress, ProbeCredentials};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Result type for prober operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Network probing contract.
///
/// Implementations never touch the device store.
#[async_trait]
pub trait CapabilityProber: Send + Sync {
    /// Runs every capability sub-check against `address` and assembles the
    /// vector once all of them have settled.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] only when no sub-check reached the device.
    async fn probe(
        &self,
        address: &DeviceAddress,
        credentials: Option<&ProbeCredentials>,
    ) -> ProbeResult<ProbeReport>;

    /// Checks whether the device's health endpoint answers.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] when the device does not answer.
    async fn check_liveness(&self, address: &DeviceAddress) -> ProbeResult<()>;
}

/// A single capability sub-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProbeCheck {
    /// Health endpoint and system metadata.
    System,
    /// Container runtime version query.
    ContainerRuntime,
    /// Platform agent marker.
    PlatformAgent,
    /// Cache server.
    Cache,
    /// Reverse proxy.
    ReverseProxy,
}

impl ProbeCheck {
    /// Returns a stable label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::ContainerRuntime => "container_runtime",
            Self::PlatformAgent => "platform_agent",
            Self::Cache => "cache",
            Self::ReverseProxy => "reverse_proxy",
        }
    }
}

impl fmt::Display for ProbeCheck {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Whether every sub-check produced a definite answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeCompleteness {
    /// Every sub-check answered or definitively refused.
    Complete,
    /// The device was reachable but some sub-checks timed out; their
    /// capabilities are reported conservatively as absent.
    Partial {
        /// Sub-checks that hit their timeout.
        timed_out: Vec<ProbeCheck>,
    },
}

impl ProbeCompleteness {
    /// Returns whether detection finished for every sub-check.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Settled output of a capability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    capabilities: CapabilityVector,
    completeness: ProbeCompleteness,
}

impl ProbeReport {
    /// A report where every sub-check settled definitively.
    #[must_use]
    pub const fn complete(capabilities: CapabilityVector) -> Self {
        Self {
            capabilities,
            completeness: ProbeCompleteness::Complete,
        }
    }

    /// A report for a reachable device with timed-out sub-checks.
    #[must_use]
    pub fn partial(capabilities: CapabilityVector, timed_out: Vec<ProbeCheck>) -> Self {
        if timed_out.is_empty() {
            return Self::complete(capabilities);
        }
        Self {
            capabilities,
            completeness: ProbeCompleteness::Partial { timed_out },
        }
    }

    /// Returns the capability vector.
    #[must_use]
    pub const fn capabilities(&self) -> &CapabilityVector {
        &self.capabilities
    }

    /// Returns the completeness marker.
    #[must_use]
    pub const fn completeness(&self) -> &ProbeCompleteness {
        &self.completeness
    }

    /// Splits the report into its parts.
    #[must_use]
    pub fn into_parts(self) -> (CapabilityVector, ProbeCompleteness) {
        (self.capabilities, self.completeness)
    }
}

/// Errors returned by probers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// Nothing on the device answered.
    #[error("device at {0} is unreachable")]
    Unreachable(DeviceAddress),

    /// Every sub-check ran out of time.
    #[error("probe of {0} timed out")]
    Timeout(DeviceAddress),
}
