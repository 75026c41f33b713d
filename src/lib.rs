//! Edge device registry.
//!
//! Tracks a fleet of edge compute nodes, discovers what each one can run,
//! classifies it into a device-type taxonomy, and keeps its liveness current
//! through periodic health polling.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: pure records, capability vectors, and the classifier
//! - **Ports**: the device store and capability prober traits
//! - **Adapters**: in-memory and file-backed stores, network and scripted
//!   probers
//! - **Services**: discovery, registry operations, and health monitoring
//!
//! # Modules
//!
//! - [`device`]: device registry core
//! - [`access`]: API key gate with monitor and enforce modes
//! - [`api`]: axum router exposing the registry over HTTP
//! - [`config`]: layered process configuration
//! - [`telemetry`]: tracing subscriber setup

pub mod access;
pub mod api;
pub mod config;
pub mod device;
pub mod telemetry;
