//! Mutual exclusion for in-flight discoveries.

use crate::device::domain::DeviceAddress;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Granularity of the discovery mutual-exclusion lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryLockScope {
    /// One discovery at a time per target address.
    #[default]
    PerTarget,
    /// One discovery at a time across the whole registry.
    Global,
}

/// Tracks which discovery keys are in flight.
#[derive(Debug)]
pub(crate) struct DiscoveryGuard {
    scope: DiscoveryLockScope,
    in_flight: Mutex<HashSet<Option<DeviceAddress>>>,
}

impl DiscoveryGuard {
    pub(crate) fn new(scope: DiscoveryLockScope) -> Self {
        Self {
            scope,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Claims the key for `address`, or returns `None` when it is taken.
    pub(crate) fn try_acquire(&self, address: &DeviceAddress) -> Option<DiscoveryPermit<'_>> {
        let key = match self.scope {
            DiscoveryLockScope::PerTarget => Some(address.clone()),
            DiscoveryLockScope::Global => None,
        };
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(key.clone()) {
            return None;
        }
        Some(DiscoveryPermit { guard: self, key })
    }
}

/// Held for the duration of one discovery; releases its key on drop.
#[derive(Debug)]
pub(crate) struct DiscoveryPermit<'guard> {
    guard: &'guard DiscoveryGuard,
    key: Option<DeviceAddress>,
}

impl Drop for DiscoveryPermit<'_> {
    fn drop(&mut self) {
        self.guard
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
