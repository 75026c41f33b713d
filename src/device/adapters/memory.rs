//! In-memory device store.

use super::table::DeviceTable;
use crate::device::{
    domain::{DeviceAddress, DeviceId, DeviceRecord, DeviceUpdate},
    ports::{DeviceStore, DeviceStoreError, DeviceStoreResult},
};
use async_trait::async_trait;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory device store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeviceStore {
    state: Arc<RwLock<DeviceTable>>,
}

impl InMemoryDeviceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DeviceStoreResult<RwLockReadGuard<'_, DeviceTable>> {
        self.state
            .read()
            .map_err(|err| DeviceStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> DeviceStoreResult<RwLockWriteGuard<'_, DeviceTable>> {
        self.state
            .write()
            .map_err(|err| DeviceStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn get(&self, id: DeviceId) -> DeviceStoreResult<DeviceRecord> {
        self.read()?.get(id)
    }

    async fn find_by_ip(&self, ip: &DeviceAddress) -> DeviceStoreResult<Option<DeviceRecord>> {
        Ok(self.read()?.find_by_ip(ip))
    }

    async fn list(&self) -> DeviceStoreResult<Vec<DeviceRecord>> {
        Ok(self.read()?.list())
    }

    async fn put(&self, record: &DeviceRecord) -> DeviceStoreResult<()> {
        self.write()?.put(record.clone())
    }

    async fn apply(&self, id: DeviceId, update: DeviceUpdate) -> DeviceStoreResult<DeviceRecord> {
        self.write()?.apply(id, update)
    }

    async fn delete(&self, id: DeviceId) -> DeviceStoreResult<()> {
        self.write()?.delete(id).map(|_| ())
    }
}
