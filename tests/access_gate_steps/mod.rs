//! Step definitions for access gate BDD scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
