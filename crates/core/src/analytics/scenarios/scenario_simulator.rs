use log::debug;

use super::{
    HoldingStress, MarketCrashScenario, QualitativeScenario, ScenarioAnalysis, ScenarioKind,
};
use crate::config::{MarketAssumptions, ScenarioConfig};
use crate::constants::EPSILON;
use crate::errors::CalculatorError;
use crate::snapshot::NormalizedPortfolio;
use crate::utils::math::ensure_finite;

const STAGE: &str = "scenarios";

const QUALITATIVE_SCENARIOS: [ScenarioKind; 3] = [
    ScenarioKind::SectorRotation,
    ScenarioKind::RateShock,
    ScenarioKind::InflationSurge,
];

pub struct ScenarioSimulator {
    config: ScenarioConfig,
    market: MarketAssumptions,
}

impl ScenarioSimulator {
    pub fn new(config: ScenarioConfig, market: MarketAssumptions) -> Self {
        Self { config, market }
    }

    /// Runs the numeric crash scenario and annotates the qualitative ones.
    pub fn simulate(
        &self,
        portfolio: &NormalizedPortfolio,
    ) -> Result<ScenarioAnalysis, CalculatorError> {
        let market_crash = self.market_crash(portfolio)?;
        let qualitative = QUALITATIVE_SCENARIOS
            .iter()
            .map(|kind| qualitative_scenario(*kind, portfolio))
            .collect();
        Ok(ScenarioAnalysis {
            market_crash,
            qualitative,
        })
    }

    /// stress_i = market_move × beta_i × amplifier, applied to each
    /// holding's market value.
    pub fn market_crash(
        &self,
        portfolio: &NormalizedPortfolio,
    ) -> Result<MarketCrashScenario, CalculatorError> {
        let holdings: Vec<HoldingStress> = portfolio
            .holdings
            .iter()
            .map(|h| {
                let stress_factor =
                    self.config.crash_market_move * h.beta * self.config.crash_beta_amplifier;
                let value_change = stress_factor * h.market_value;
                HoldingStress {
                    symbol: h.symbol.clone(),
                    market_value: h.market_value,
                    stress_factor,
                    value_change,
                    stressed_value: h.market_value + value_change,
                }
            })
            .collect();

        let total_value: f64 = holdings.iter().map(|h| h.market_value).sum();
        let total_change: f64 = holdings.iter().map(|h| h.value_change).sum();
        let total_portfolio_impact = if total_value.abs() <= EPSILON {
            0.0
        } else {
            total_change / total_value
        };
        ensure_finite(STAGE, "total_portfolio_impact", total_portfolio_impact)?;
        for h in &holdings {
            ensure_finite(STAGE, &format!("{}.stressed_value", h.symbol), h.stressed_value)?;
        }

        let estimated_recovery_months =
            recovery_months(total_portfolio_impact, self.market.assumed_market_return);
        debug!(
            "Market crash: impact {:.4}, recovery {} months",
            total_portfolio_impact, estimated_recovery_months
        );

        Ok(MarketCrashScenario {
            market_move: self.config.crash_market_move,
            beta_amplifier: self.config.crash_beta_amplifier,
            total_portfolio_impact,
            holdings,
            stressed_portfolio_value: total_value + total_change,
            estimated_recovery_months,
        })
    }
}

/// Label and exposed sectors for a scenario without a numeric model.
pub fn qualitative_scenario(
    kind: ScenarioKind,
    portfolio: &NormalizedPortfolio,
) -> QualitativeScenario {
    let keywords = kind.sector_keywords();
    let most_exposed_sectors = portfolio
        .sector_weights()
        .into_keys()
        .filter(|sector| {
            let lower = sector.to_lowercase();
            keywords.iter().any(|k| lower.contains(k))
        })
        .collect();

    QualitativeScenario {
        kind,
        label: kind.label().to_string(),
        description: kind.description().to_string(),
        impact: None,
        most_exposed_sectors,
    }
}

/// ceil(|impact| / monthly market return). 0 without a loss or without a
/// positive market return to recover at.
pub fn recovery_months(impact: f64, annual_market_return: f64) -> u32 {
    let monthly = annual_market_return / 12.0;
    if impact >= 0.0 || monthly <= EPSILON {
        return 0;
    }
    let months = (impact.abs() / monthly - EPSILON).ceil();
    months.clamp(0.0, u32::MAX as f64) as u32
}
