//! Performance attribution: selection vs. allocation effects.

mod attribution_engine;
mod attribution_model;

pub use attribution_engine::*;
pub use attribution_model::*;
