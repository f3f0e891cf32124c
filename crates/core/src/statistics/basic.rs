use super::StatisticsProvider;

/// Dependency-free statistics. Percentiles interpolate linearly between the
/// closest ranks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicStatistics;

impl StatisticsProvider for BasicStatistics {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn mean(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    fn variance(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let mean = self.mean(values);
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
    }

    fn percentile(&self, values: &[f64], pct: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = rank.ceil() as usize;
        let fraction = rank - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_empty_inputs_are_zero() {
        let stats = BasicStatistics;
        assert_eq!(stats.mean(&[]), 0.0);
        assert_eq!(stats.variance(&[]), 0.0);
        assert_eq!(stats.percentile(&[], 5.0), 0.0);
    }

    #[test]
    fn test_population_variance() {
        let stats = BasicStatistics;
        // mean 5, squared deviations sum to 32 over 8 values
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((stats.variance(&values) - 4.0).abs() < TOL);
        assert!((stats.std_dev(&values) - 2.0).abs() < TOL);
    }

    #[test]
    fn test_percentile_interpolates() {
        let stats = BasicStatistics;
        let values = [0.3, -0.1, 0.1, 0.2, 0.0];
        // sorted: -0.1, 0.0, 0.1, 0.2, 0.3; rank 0.2 -> -0.1 + 0.1 * 0.2
        assert!((stats.percentile(&values, 5.0) - (-0.08)).abs() < TOL);
        assert!((stats.median(&values) - 0.1).abs() < TOL);
        assert!((stats.percentile(&values, 100.0) - 0.3).abs() < TOL);
    }

    #[test]
    fn test_percentile_single_value() {
        let stats = BasicStatistics;
        assert_eq!(stats.percentile(&[0.42], 5.0), 0.42);
    }
}
