//! Risk decomposition: systematic vs. idiosyncratic risk, sector risk,
//! concentration and factor exposures.

mod risk_decomposer;
mod risk_model;

pub use risk_decomposer::*;
pub use risk_model::*;
