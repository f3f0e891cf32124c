use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{RiskDecomposition, FACTOR_GROWTH, FACTOR_MOMENTUM, FACTOR_QUALITY, FACTOR_VALUE};
use crate::config::MarketAssumptions;
use crate::errors::CalculatorError;
use crate::snapshot::{NormalizedHolding, NormalizedPortfolio};
use crate::statistics::StatisticsProvider;
use crate::utils::math::ensure_finite;

const STAGE: &str = "risk";

/// Splits portfolio risk into explainable components.
///
/// Systematic risk uses an assumed market correlation and variance in place
/// of a covariance history.
pub struct RiskDecomposer {
    market: MarketAssumptions,
    momentum_window_days: i64,
    stats: Arc<dyn StatisticsProvider>,
}

impl RiskDecomposer {
    pub fn new(
        market: MarketAssumptions,
        momentum_window_days: i64,
        stats: Arc<dyn StatisticsProvider>,
    ) -> Self {
        Self {
            market,
            momentum_window_days,
            stats,
        }
    }

    pub fn decompose(
        &self,
        portfolio: &NormalizedPortfolio,
    ) -> Result<RiskDecomposition, CalculatorError> {
        let concentration_risk = herfindahl(portfolio.holdings.iter().map(|h| h.weight));
        let correlation_risk = herfindahl(portfolio.sector_weights().into_values());

        let systematic_risk = portfolio.portfolio_beta()
            * self.market.market_correlation.powi(2)
            * self.market.market_variance();
        let idiosyncratic_risk =
            (weighted_return_variance(portfolio) - systematic_risk.powi(2)).max(0.0);

        let sector_risk = self.sector_risk(portfolio);
        let factor_exposures = self.factor_exposures(portfolio);

        ensure_finite(STAGE, "systematic_risk", systematic_risk)?;
        ensure_finite(STAGE, "idiosyncratic_risk", idiosyncratic_risk)?;
        for (sector, value) in &sector_risk {
            ensure_finite(STAGE, &format!("sector_risk[{}]", sector), *value)?;
        }

        debug!(
            "Risk decomposition: HHI {:.4}, systematic {:.5}, {} sectors",
            concentration_risk,
            systematic_risk,
            sector_risk.len()
        );

        Ok(RiskDecomposition {
            systematic_risk,
            idiosyncratic_risk,
            sector_risk,
            factor_exposures,
            correlation_risk,
            concentration_risk,
        })
    }

    /// Sector weight × population std dev of the sector's holding returns.
    /// A single-holding sector has no dispersion and contributes 0.
    fn sector_risk(&self, portfolio: &NormalizedPortfolio) -> BTreeMap<String, f64> {
        portfolio
            .by_sector()
            .into_iter()
            .map(|(sector, holdings)| {
                let weight: f64 = holdings.iter().map(|h| h.weight).sum();
                let returns: Vec<f64> = holdings.iter().map(|h| h.simple_return).collect();
                let dispersion = if returns.len() > 1 {
                    self.stats.std_dev(&returns)
                } else {
                    0.0
                };
                (sector.to_string(), weight * dispersion)
            })
            .collect()
    }

    fn factor_exposures(&self, portfolio: &NormalizedPortfolio) -> BTreeMap<String, f64> {
        let median = self.stats.median(&portfolio.returns());

        let growth = weight_where(portfolio, |h| h.simple_return > median);
        let momentum = weight_where(portfolio, |h| {
            h.holding_age_days < self.momentum_window_days
        });
        let quality = weight_where(portfolio, |h| h.dividend_yield > 0.0);

        BTreeMap::from([
            (FACTOR_GROWTH.to_string(), growth),
            (FACTOR_VALUE.to_string(), (1.0 - growth).max(0.0)),
            (FACTOR_MOMENTUM.to_string(), momentum),
            (FACTOR_QUALITY.to_string(), quality),
        ])
    }
}

/// Total weight of the holdings matching `predicate`.
fn weight_where(
    portfolio: &NormalizedPortfolio,
    predicate: impl Fn(&NormalizedHolding) -> bool,
) -> f64 {
    portfolio
        .holdings
        .iter()
        .filter(|h| predicate(h))
        .map(|h| h.weight)
        .sum()
}

/// Σ share², the Herfindahl–Hirschman index.
pub fn herfindahl(shares: impl IntoIterator<Item = f64>) -> f64 {
    shares.into_iter().map(|w| w * w).sum()
}

/// Σ weight × (return − total_return)².
fn weighted_return_variance(portfolio: &NormalizedPortfolio) -> f64 {
    let mean = portfolio.weighted_return();
    portfolio
        .holdings
        .iter()
        .map(|h| h.weight * (h.simple_return - mean).powi(2))
        .sum()
}
