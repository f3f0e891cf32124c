//! Deterministic stress scenarios applied to a snapshot.

mod scenario_model;
mod scenario_simulator;

pub use scenario_model::*;
pub use scenario_simulator::*;
