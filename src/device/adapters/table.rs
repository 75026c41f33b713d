//! Indexed record table shared by the store adapters.

use crate::device::{
    domain::{DeviceAddress, DeviceId, DeviceRecord, DeviceUpdate},
    ports::{DeviceStoreError, DeviceStoreResult},
};
use std::collections::HashMap;

/// Records keyed by id, with a unique address index.
#[derive(Debug, Clone, Default)]
pub(crate) struct DeviceTable {
    devices: HashMap<DeviceId, DeviceRecord>,
    ip_index: HashMap<DeviceAddress, DeviceId>,
}

impl DeviceTable {
    /// Builds a table from records, rejecting duplicate addresses.
    pub(crate) fn from_records(
        records: impl IntoIterator<Item = DeviceRecord>,
    ) -> DeviceStoreResult<Self> {
        let mut table = Self::default();
        for record in records {
            table.put(record)?;
        }
        Ok(table)
    }

    pub(crate) fn get(&self, id: DeviceId) -> DeviceStoreResult<DeviceRecord> {
        self.devices
            .get(&id)
            .cloned()
            .ok_or(DeviceStoreError::NotFound(id))
    }

    pub(crate) fn find_by_ip(&self, ip: &DeviceAddress) -> Option<DeviceRecord> {
        self.ip_index
            .get(ip)
            .and_then(|id| self.devices.get(id))
            .cloned()
    }

    /// Returns records ordered by creation time, oldest first.
    pub(crate) fn list(&self) -> Vec<DeviceRecord> {
        let mut records: Vec<DeviceRecord> = self.devices.values().cloned().collect();
        records.sort_by(|left, right| {
            left.created_at()
                .cmp(&right.created_at())
                .then_with(|| left.id().cmp(&right.id()))
        });
        records
    }

    pub(crate) fn put(&mut self, record: DeviceRecord) -> DeviceStoreResult<()> {
        if let Some(&existing) = self.ip_index.get(record.ip())
            && existing != record.id()
        {
            return Err(DeviceStoreError::DuplicateAddress {
                address: record.ip().clone(),
                existing,
            });
        }

        if let Some(previous) = self.devices.get(&record.id())
            && previous.ip() != record.ip()
        {
            self.ip_index.remove(previous.ip());
        }

        self.ip_index.insert(record.ip().clone(), record.id());
        self.devices.insert(record.id(), record);
        Ok(())
    }

    pub(crate) fn apply(
        &mut self,
        id: DeviceId,
        update: DeviceUpdate,
    ) -> DeviceStoreResult<DeviceRecord> {
        let record = self
            .devices
            .get_mut(&id)
            .ok_or(DeviceStoreError::NotFound(id))?;
        record.apply(update);
        Ok(record.clone())
    }

    pub(crate) fn delete(&mut self, id: DeviceId) -> DeviceStoreResult<DeviceRecord> {
        let removed = self
            .devices
            .remove(&id)
            .ok_or(DeviceStoreError::NotFound(id))?;
        self.ip_index.remove(removed.ip());
        Ok(removed)
    }
}
