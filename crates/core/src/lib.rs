//! Aksjefolio Core - portfolio analytics engine.
//!
//! Given a point-in-time snapshot of holdings, the engine computes performance
//! and risk statistics, decomposes risk, attributes performance, ranks
//! rebalancing recommendations, runs stress scenarios and rolls everything up
//! into a health score. Storage and live prices are reached through the
//! traits in `market_data`.

pub mod analytics;
pub mod config;
pub mod constants;
pub mod errors;
pub mod market_data;
pub mod snapshot;
pub mod statistics;
pub mod utils;

// Re-export the primary entry points
pub use analytics::{AnalysisRequest, AnalysisResult, AnalysisService};
pub use config::AnalyticsConfig;
pub use snapshot::{DataWarning, Holding, PortfolioSnapshot, ReturnSeries};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
