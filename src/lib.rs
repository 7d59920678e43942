//! Orbital Sentinel - Orbital Simulation Engine
//!
//! Propagates a catalog of Earth-orbiting objects from their two-line
//! element sets, maps them into a scene around a unit globe, flags close
//! approaches every tick and periodically scans ahead for conjunctions.

pub mod catalog;
pub mod clock;
pub mod collision;
pub mod config;
pub mod debris;
pub mod engine;
pub mod prediction;
pub mod propagation;
pub mod selection;
pub mod types;

pub use config::EngineConfig;
pub use engine::{EnginePlugin, EngineSnapshot, SimulationEngine};

#[cfg(test)]
mod proptest_engine;

#[cfg(test)]
pub mod test_utils;
