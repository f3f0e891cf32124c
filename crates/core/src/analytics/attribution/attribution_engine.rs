use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::PerformanceAttribution;
use crate::errors::CalculatorError;
use crate::snapshot::NormalizedPortfolio;
use crate::statistics::StatisticsProvider;
use crate::utils::math::ensure_finite;

const STAGE: &str = "attribution";

/// Attributes performance against a naive equal-weight baseline.
pub struct AttributionEngine {
    stats: Arc<dyn StatisticsProvider>,
}

impl AttributionEngine {
    pub fn new(stats: Arc<dyn StatisticsProvider>) -> Self {
        Self { stats }
    }

    pub fn attribute(
        &self,
        portfolio: &NormalizedPortfolio,
    ) -> Result<PerformanceAttribution, CalculatorError> {
        let total_return = portfolio.weighted_return();
        let security_selection = total_return - self.stats.mean(&portfolio.returns());

        let sector_weights: Vec<f64> = portfolio.sector_weights().into_values().collect();
        let asset_allocation = self.stats.variance(&sector_weights);
        let interaction = security_selection * asset_allocation;

        let mut sector_contributions: BTreeMap<String, f64> = BTreeMap::new();
        let mut stock_contributions: BTreeMap<String, f64> = BTreeMap::new();
        for holding in &portfolio.holdings {
            let contribution = holding.weight * holding.simple_return;
            *sector_contributions
                .entry(holding.sector.clone())
                .or_insert(0.0) += contribution;
            stock_contributions.insert(holding.symbol.clone(), contribution);
        }

        let total_excess_return = security_selection + asset_allocation + interaction;
        ensure_finite(STAGE, "total_excess_return", total_excess_return)?;

        debug!(
            "Attribution: selection {:.5}, allocation {:.5}",
            security_selection, asset_allocation
        );

        Ok(PerformanceAttribution {
            security_selection,
            asset_allocation,
            interaction,
            total_excess_return,
            sector_contributions,
            stock_contributions,
        })
    }
}
