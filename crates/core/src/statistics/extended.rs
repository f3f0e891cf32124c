use statrs::statistics::{Data, OrderStatistics, Statistics};

use super::StatisticsProvider;

/// statrs-backed statistics.
///
/// Quantiles follow statrs' order-statistic estimator, which can differ
/// slightly from the basic provider on small samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendedStatistics;

impl StatisticsProvider for ExtendedStatistics {
    fn name(&self) -> &'static str {
        "extended"
    }

    fn mean(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        Statistics::mean(values.iter())
    }

    fn variance(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        Statistics::population_variance(values.iter())
    }

    fn percentile(&self, values: &[f64], pct: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let mut data = Data::new(values.to_vec());
        data.quantile(pct.clamp(0.0, 100.0) / 100.0)
    }
}
