//! Edge device registry and capability classification.
//!
//! Devices are discovered by probing their address, classified from the
//! resulting capability vector, persisted, and then kept current by a
//! background health monitor. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
