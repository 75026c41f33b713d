//! Port contracts for device persistence and probing.

mod prober;
mod store;

pub use prober::{
    CapabilityProber, ProbeCheck, ProbeCompleteness, ProbeError, ProbeReport, ProbeResult,
};
#[cfg(test)]
pub use store::MockDeviceStore;
pub use store::{DeviceStore, DeviceStoreError, DeviceStoreResult};
