//! Sector-based ESG roll-up.
//!
//! Scores come from a configurable sector table; there is no per-issuer
//! data behind them.

use serde::{Deserialize, Serialize};

use super::Grade;
use crate::config::EsgConfig;
use crate::errors::CalculatorError;
use crate::snapshot::NormalizedPortfolio;
use crate::utils::math::{clamp_score, ensure_finite};

const STAGE: &str = "esg";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EsgMetrics {
    /// Weighted mean sector score in [0, 100]
    pub esg_score: f64,
    /// Weight share of holdings whose sector has an explicit score
    pub coverage: f64,
    pub rating: Grade,
}

pub struct EsgCalculator {
    config: EsgConfig,
}

impl EsgCalculator {
    pub fn new(config: EsgConfig) -> Self {
        Self { config }
    }

    /// Score for a sector, and whether it came from the table.
    pub fn sector_score(&self, sector: &str) -> (f64, bool) {
        match self.config.sector_scores.get(&sector.trim().to_lowercase()) {
            Some(score) => (clamp_score(*score), true),
            None => (clamp_score(self.config.default_score), false),
        }
    }

    pub fn calculate(
        &self,
        portfolio: &NormalizedPortfolio,
    ) -> Result<EsgMetrics, CalculatorError> {
        let mut esg_score = 0.0;
        let mut coverage = 0.0;
        for holding in &portfolio.holdings {
            let (score, known) = self.sector_score(&holding.sector);
            esg_score += holding.weight * score;
            if known {
                coverage += holding.weight;
            }
        }
        let esg_score = clamp_score(ensure_finite(STAGE, "esg_score", esg_score)?);

        Ok(EsgMetrics {
            esg_score,
            coverage: coverage.clamp(0.0, 1.0),
            rating: Grade::from_score(esg_score),
        })
    }
}
