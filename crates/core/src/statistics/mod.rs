//! Statistics strategy used by the analytics stages.
//!
//! The engine only needs a handful of descriptive statistics. They are behind
//! the `StatisticsProvider` trait so the statrs-backed implementation can be
//! switched in with the `extended-stats` feature.

mod basic;
#[cfg(feature = "extended-stats")]
mod extended;

use std::sync::Arc;

pub use basic::BasicStatistics;
#[cfg(feature = "extended-stats")]
pub use extended::ExtendedStatistics;

/// Descriptive statistics over a slice of observations.
///
/// Every method returns 0 for an empty slice.
pub trait StatisticsProvider: Send + Sync {
    /// Identifier reported in logs.
    fn name(&self) -> &'static str;

    fn mean(&self, values: &[f64]) -> f64;

    /// Population variance (divides by n).
    fn variance(&self, values: &[f64]) -> f64;

    /// Population standard deviation.
    fn std_dev(&self, values: &[f64]) -> f64 {
        self.variance(values).sqrt()
    }

    fn median(&self, values: &[f64]) -> f64 {
        self.percentile(values, 50.0)
    }

    /// Percentile with `pct` in [0, 100].
    fn percentile(&self, values: &[f64], pct: f64) -> f64;
}

/// Returns the provider selected by the crate features.
pub fn default_provider() -> Arc<dyn StatisticsProvider> {
    #[cfg(feature = "extended-stats")]
    {
        Arc::new(ExtendedStatistics)
    }
    #[cfg(not(feature = "extended-stats"))]
    {
        Arc::new(BasicStatistics)
    }
}
