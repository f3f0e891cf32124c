//! Analytics stages and the service that runs them.

pub mod attribution;
pub mod insights;
pub mod metrics;
pub mod recommendations;
pub mod risk;
pub mod scenarios;

mod analysis_cache;
mod analysis_model;
mod analysis_service;

pub use analysis_cache::{AnalysisCache, CacheKey};
pub use analysis_model::{AnalysisRequest, AnalysisResult};
pub use analysis_service::AnalysisService;

#[cfg(test)]
mod analysis_service_tests;
