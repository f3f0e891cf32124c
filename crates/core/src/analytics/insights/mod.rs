//! Insight synthesis: health score, risk profile, diversification summary,
//! alerts, and the sector-based ESG roll-up.

pub mod esg;
mod insight_synthesizer;
mod insights_model;

pub use esg::{EsgCalculator, EsgMetrics};
pub use insight_synthesizer::*;
pub use insights_model::*;
