//! Store port for device record persistence.

use crate::device::domain::{DeviceAddress, DeviceId, DeviceRecord, DeviceUpdate};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for device store operations.
pub type DeviceStoreResult<T> = Result<T, DeviceStoreError>;

/// Persistence contract for device records.
///
/// Every operation is atomic with respect to every other: readers never see
/// a record half-written, and a failed write leaves the previous state
/// visible.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Fetches one record.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceStoreError::NotFound`] when no record has this id.
    async fn get(&self, id: DeviceId) -> DeviceStoreResult<DeviceRecord>;

    /// Finds the record registered at `ip`, if any.
    async fn find_by_ip(&self, ip: &DeviceAddress) -> DeviceStoreResult<Option<DeviceRecord>>;

    /// Returns every stored record.
    async fn list(&self) -> DeviceStoreResult<Vec<DeviceRecord>>;

    /// Inserts or replaces a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceStoreError::DuplicateAddress`] when a different record
    /// already owns the address.
    async fn put(&self, record: &DeviceRecord) -> DeviceStoreResult<()>;

    /// Applies `update` to the stored record and returns the result.
    ///
    /// The read, modification, and write happen under one write lock.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceStoreError::NotFound`] when no record has this id.
    async fn apply(&self, id: DeviceId, update: DeviceUpdate) -> DeviceStoreResult<DeviceRecord>;

    /// Removes a record.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceStoreError::NotFound`] when no record has this id.
    async fn delete(&self, id: DeviceId) -> DeviceStoreResult<()>;
}

/// Errors returned by device store implementations.
#[derive(Debug, Clone, Error)]
pub enum DeviceStoreError {
    /// No record has the given id.
    #[error("device not found: {0}")]
    NotFound(DeviceId),

    /// Another record is already registered at the address.
    #[error("address {address} already registered to device {existing}")]
    DuplicateAddress {
        /// Conflicting address.
        address: DeviceAddress,
        /// Record currently holding the address.
        existing: DeviceId,
    },

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted device data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DeviceStoreError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
