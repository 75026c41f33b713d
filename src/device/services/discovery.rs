//! Discovery coordinator: probe, classify, persist.

use super::lock::{DiscoveryGuard, DiscoveryLockScope};
use crate::device::{
    domain::{
        DataSourceId, DeviceAddress, DeviceDetailsPatch, DeviceDomainError, DeviceId, DeviceName,
        DeviceRecord, DeviceUpdate, ProbeCredentials, Rediscovery,
    },
    ports::{
        CapabilityProber, DeviceStore, DeviceStoreError, ProbeCompleteness, ProbeError,
    },
};
use mockable::Clock;
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Settings for the discovery coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Mutual-exclusion granularity.
    pub lock_scope: DiscoveryLockScope,
    /// Upper bound for one whole capability probe.
    #[serde(with = "humantime_serde")]
    pub deadline: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            lock_scope: DiscoveryLockScope::default(),
            deadline: Duration::from_secs(15),
        }
    }
}

/// Request to discover the device at an address.
#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    ip: String,
    username: String,
    secret: Option<SecretString>,
    name: Option<String>,
    data_sources: Option<Vec<String>>,
}

impl DiscoveryRequest {
    /// Creates a request for `ip`, probed as `username`.
    #[must_use]
    pub fn new(ip: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            username: username.into(),
            secret: None,
            name: None,
            data_sources: None,
        }
    }

    /// Sets the probe secret.
    #[must_use]
    pub fn with_secret(mut self, secret: SecretString) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Sets an explicit device name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the initial data source opt-ins.
    #[must_use]
    pub fn with_data_sources(mut self, sources: impl IntoIterator<Item = String>) -> Self {
        self.data_sources = Some(sources.into_iter().collect());
        self
    }
}

/// Validated form of a [`DiscoveryRequest`].
struct DiscoveryTarget {
    address: DeviceAddress,
    credentials: ProbeCredentials,
    details: DeviceDetailsPatch,
}

impl TryFrom<DiscoveryRequest> for DiscoveryTarget {
    type Error = DeviceDomainError;

    fn try_from(request: DiscoveryRequest) -> Result<Self, Self::Error> {
        let address = DeviceAddress::parse(&request.ip)?;
        let credentials = ProbeCredentials::new(request.username, request.secret)?;
        let mut details = DeviceDetailsPatch::new();
        if let Some(name) = request.name {
            details = details.with_name(DeviceName::new(name)?);
        }
        if let Some(sources) = request.data_sources {
            let validated = sources
                .into_iter()
                .map(DataSourceId::new)
                .collect::<Result<Vec<_>, _>>()?;
            details = details.with_data_sources(validated);
        }
        Ok(Self {
            address,
            credentials,
            details,
        })
    }
}

/// Whether discovery created a record or refreshed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryDisposition {
    /// A new record was created.
    Created,
    /// The record already registered at the address was refreshed in place.
    Refreshed,
}

/// Result of a successful discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// The stored record.
    pub record: DeviceRecord,
    /// Whether the record is new.
    pub disposition: DiscoveryDisposition,
    /// Whether every capability sub-check settled definitively.
    pub completeness: ProbeCompleteness,
}

/// Errors returned by discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The request was malformed.
    #[error(transparent)]
    Validation(#[from] DeviceDomainError),

    /// Another discovery holds the lock for this target.
    #[error("discovery already in progress for {0}")]
    Busy(DeviceAddress),

    /// The target did not answer any probe.
    #[error("device at {address} could not be probed: {source}")]
    Unreachable {
        /// Probed address.
        address: DeviceAddress,
        /// Underlying probe failure.
        source: ProbeError,
    },

    /// Persisting the result failed.
    #[error(transparent)]
    Store(#[from] DeviceStoreError),
}

/// Result type for discovery.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Orchestrates probing, classification, and persistence of devices.
pub struct DiscoveryCoordinator<S, P, C>
where
    S: DeviceStore,
    P: CapabilityProber,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    prober: Arc<P>,
    clock: Arc<C>,
    guard: DiscoveryGuard,
    deadline: Duration,
}

impl<S, P, C> DiscoveryCoordinator<S, P, C>
where
    S: DeviceStore,
    P: CapabilityProber,
    C: Clock + Send + Sync,
{
    /// Creates a coordinator.
    #[must_use]
    pub fn new(store: Arc<S>, prober: Arc<P>, clock: Arc<C>, config: &DiscoveryConfig) -> Self {
        Self {
            store,
            prober,
            clock,
            guard: DiscoveryGuard::new(config.lock_scope),
            deadline: config.deadline,
        }
    }

    /// Discovers the device named by `request`.
    ///
    /// Re-discovering an address that is already registered refreshes that
    /// record under its existing id.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Validation`] for malformed input,
    /// [`DiscoveryError::Busy`] when an overlapping discovery holds the lock,
    /// [`DiscoveryError::Unreachable`] when the probe fails, and
    /// [`DiscoveryError::Store`] when persistence fails.
    pub async fn discover(&self, request: DiscoveryRequest) -> DiscoveryResult<Discovery> {
        let target = DiscoveryTarget::try_from(request)?;
        let Some(_permit) = self.guard.try_acquire(&target.address) else {
            warn!(ip = %target.address, "discovery rejected, another is in flight");
            return Err(DiscoveryError::Busy(target.address));
        };

        let credentials_ref = target.credentials.to_reference();
        info!(ip = %target.address, credentials = %credentials_ref, "discovery started");

        let outcome = tokio::time::timeout(
            self.deadline,
            self.prober
                .probe(&target.address, Some(&target.credentials)),
        )
        .await;
        let report = match outcome {
            Ok(Ok(report)) => report,
            Ok(Err(source)) => return Err(probe_failed(target.address, source)),
            Err(_) => {
                let source = ProbeError::Timeout(target.address.clone());
                return Err(probe_failed(target.address, source));
            }
        };
        let (capabilities, completeness) = report.into_parts();
        if let ProbeCompleteness::Partial { timed_out } = &completeness {
            warn!(ip = %target.address, ?timed_out, "capability detection incomplete");
        }

        let refreshed = match self.store.find_by_ip(&target.address).await? {
            Some(existing) => {
                let update = DeviceUpdate::Rediscovery(Rediscovery {
                    capabilities: capabilities.clone(),
                    credentials_ref: credentials_ref.clone(),
                    observed_at: self.clock.utc(),
                    details: target.details.clone(),
                });
                self.refresh(existing.id(), update).await?
            }
            None => None,
        };
        let (record, disposition) = match refreshed {
            Some(record) => (record, DiscoveryDisposition::Refreshed),
            None => {
                let mut record = DeviceRecord::discovered(
                    target.address,
                    credentials_ref,
                    target.details.name().cloned(),
                    capabilities,
                    &*self.clock,
                );
                if let Some(sources) = target.details.data_sources() {
                    record = record.with_data_sources(sources.iter().cloned());
                }
                self.store.put(&record).await?;
                (record, DiscoveryDisposition::Created)
            }
        };

        info!(
            device_id = %record.id(),
            ip = %record.ip(),
            device_type = %record.device_type(),
            refreshed = disposition == DiscoveryDisposition::Refreshed,
            "discovery finished"
        );
        Ok(Discovery {
            record,
            disposition,
            completeness,
        })
    }

    /// Applies a rediscovery, yielding `None` when the record vanished
    /// after the address lookup.
    async fn refresh(
        &self,
        id: DeviceId,
        update: DeviceUpdate,
    ) -> DiscoveryResult<Option<DeviceRecord>> {
        match self.store.apply(id, update).await {
            Ok(record) => Ok(Some(record)),
            Err(DeviceStoreError::NotFound(_)) => {
                info!(device_id = %id, "device deleted during discovery, registering anew");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn probe_failed(address: DeviceAddress, source: ProbeError) -> DiscoveryError {
    warn!(ip = %address, error = %source, "discovery probe failed");
    DiscoveryError::Unreachable { address, source }
}
