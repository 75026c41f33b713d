//! Step definitions for device discovery BDD scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
