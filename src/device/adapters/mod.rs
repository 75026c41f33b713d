//! Adapter implementations for device store and prober ports.

pub mod file;
pub mod http;
pub mod memory;

mod scripted;
mod table;

pub use scripted::ScriptedCapabilityProber;
