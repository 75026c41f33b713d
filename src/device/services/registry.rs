//! Read, update, and delete operations on registered devices.

use crate::device::{
    domain::{
        CapabilityVector, DataSourceId, DeviceDetailsPatch, DeviceDomainError, DeviceId,
        DeviceName, DeviceRecord, DeviceUpdate, ServiceInfo,
    },
    ports::{DeviceStore, DeviceStoreError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Client request to change the settable fields of a device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateDeviceRequest {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement data source set.
    pub data_sources: Option<Vec<String>>,
}

impl UpdateDeviceRequest {
    fn into_patch(self) -> Result<DeviceDetailsPatch, DeviceDomainError> {
        let mut patch = DeviceDetailsPatch::new();
        if let Some(name) = self.name {
            patch = patch.with_name(DeviceName::new(name)?);
        }
        if let Some(sources) = self.data_sources {
            let validated = sources
                .into_iter()
                .map(DataSourceId::new)
                .collect::<Result<Vec<_>, _>>()?;
            patch = patch.with_data_sources(validated);
        }
        Ok(patch)
    }
}

/// Service-level errors for registry operations.
#[derive(Debug, Error)]
pub enum DeviceRegistryServiceError {
    /// No device exists with the given identifier.
    #[error("device {0} not found")]
    NotFound(DeviceId),
    /// The update request carried no settable field.
    #[error("update changes no settable field")]
    EmptyUpdate,
    /// Domain validation failed.
    #[error(transparent)]
    Validation(#[from] DeviceDomainError),
    /// Store operation failed.
    #[error(transparent)]
    Store(DeviceStoreError),
}

impl From<DeviceStoreError> for DeviceRegistryServiceError {
    fn from(err: DeviceStoreError) -> Self {
        match err {
            DeviceStoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Result type for registry service operations.
pub type DeviceRegistryServiceResult<T> = Result<T, DeviceRegistryServiceError>;

/// Registry operations that do not involve probing.
pub struct DeviceRegistryService<S>
where
    S: DeviceStore,
{
    store: Arc<S>,
}

impl<S> DeviceRegistryService<S>
where
    S: DeviceStore,
{
    /// Creates a registry service.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Lists every registered device.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceRegistryServiceError::Store`] when the store fails.
    pub async fn list(&self) -> DeviceRegistryServiceResult<Vec<DeviceRecord>> {
        Ok(self.store.list().await?)
    }

    /// Fetches one device.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceRegistryServiceError::NotFound`] for unknown ids.
    pub async fn get(&self, id: DeviceId) -> DeviceRegistryServiceResult<DeviceRecord> {
        Ok(self.store.get(id).await?)
    }

    /// Changes the name and data sources of a device.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceRegistryServiceError::EmptyUpdate`] when nothing would
    /// change, [`DeviceRegistryServiceError::Validation`] for invalid values,
    /// and [`DeviceRegistryServiceError::NotFound`] for unknown ids.
    pub async fn update(
        &self,
        id: DeviceId,
        request: UpdateDeviceRequest,
    ) -> DeviceRegistryServiceResult<DeviceRecord> {
        let patch = request.into_patch()?;
        if patch.is_empty() {
            return Err(DeviceRegistryServiceError::EmptyUpdate);
        }
        let record = self.store.apply(id, DeviceUpdate::Details(patch)).await?;
        info!(device_id = %id, "device details updated");
        Ok(record)
    }

    /// Removes a device.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceRegistryServiceError::NotFound`] for unknown ids.
    pub async fn delete(&self, id: DeviceId) -> DeviceRegistryServiceResult<()> {
        self.store.delete(id).await?;
        info!(device_id = %id, "device deleted");
        Ok(())
    }

    /// Returns the stored capability vector of a device.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceRegistryServiceError::NotFound`] for unknown ids.
    pub async fn capabilities(&self, id: DeviceId) -> DeviceRegistryServiceResult<CapabilityVector> {
        Ok(self.get(id).await?.capabilities().clone())
    }

    /// Returns the services found on a device.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceRegistryServiceError::NotFound`] for unknown ids.
    pub async fn services(&self, id: DeviceId) -> DeviceRegistryServiceResult<Vec<ServiceInfo>> {
        Ok(self.get(id).await?.capabilities().services().to_vec())
    }
}
