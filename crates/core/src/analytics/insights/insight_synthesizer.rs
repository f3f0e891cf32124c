use log::debug;

use super::{
    AiInsights, AlertKind, DiversificationAnalysis, Grade, HealthComponents, InsightAlert,
    PortfolioShare, RiskProfile, Severity,
};
use crate::analytics::metrics::PortfolioMetrics;
use crate::analytics::risk::{herfindahl, RiskDecomposition};
use crate::config::InsightConfig;
use crate::constants::EPSILON;
use crate::errors::CalculatorError;
use crate::snapshot::NormalizedPortfolio;
use crate::utils::math::{clamp_score, ensure_finite};

const STAGE: &str = "insights";

/// Rolls metrics and risk into a health score, a risk profile and alerts.
pub struct InsightSynthesizer {
    config: InsightConfig,
}

impl InsightSynthesizer {
    pub fn new(config: InsightConfig) -> Self {
        Self { config }
    }

    pub fn synthesize(
        &self,
        portfolio: &NormalizedPortfolio,
        metrics: &PortfolioMetrics,
        risk: &RiskDecomposition,
    ) -> Result<AiInsights, CalculatorError> {
        let components = health_components(portfolio, metrics);
        let health_score = clamp_score(components.mean());
        ensure_finite(STAGE, "health_score", health_score)?;

        let insights = AiInsights {
            health_score,
            grade: Grade::from_score(health_score),
            components,
            risk_profile: self.risk_profile(metrics),
            diversification_analysis: diversification_analysis(portfolio, risk),
            alerts: self.alerts(portfolio, metrics),
        };

        debug!(
            "Health score {:.1} ({}), {} alerts",
            insights.health_score,
            insights.grade,
            insights.alerts.len()
        );
        Ok(insights)
    }

    pub fn risk_profile(&self, metrics: &PortfolioMetrics) -> RiskProfile {
        let beta = metrics.beta.abs();
        if beta < self.config.conservative_max_beta
            && metrics.volatility < self.config.conservative_max_volatility
        {
            RiskProfile::Conservative
        } else if beta > self.config.aggressive_min_beta
            || metrics.volatility > self.config.aggressive_min_volatility
        {
            RiskProfile::Aggressive
        } else {
            RiskProfile::Moderate
        }
    }

    /// Alert rules are independent of each other.
    fn alerts(
        &self,
        portfolio: &NormalizedPortfolio,
        metrics: &PortfolioMetrics,
    ) -> Vec<InsightAlert> {
        let mut alerts = Vec::new();

        if let Some(largest) = portfolio
            .largest_holding()
            .filter(|h| h.weight > self.config.concentration_alert_weight)
        {
            alerts.push(InsightAlert {
                kind: AlertKind::Concentration,
                severity: Severity::Warning,
                message: format!(
                    "{} is {:.1}% of the portfolio, above the {:.0}% concentration limit",
                    largest.symbol,
                    largest.weight * 100.0,
                    self.config.concentration_alert_weight * 100.0
                ),
                symbols: vec![largest.symbol.clone()],
            });
        }

        if metrics.sharpe_ratio < self.config.poor_sharpe_threshold {
            alerts.push(InsightAlert {
                kind: AlertKind::PoorRiskAdjustedReturn,
                severity: Severity::Info,
                message: format!(
                    "Sharpe ratio of {:.2} indicates poor risk-adjusted returns",
                    metrics.sharpe_ratio
                ),
                symbols: Vec::new(),
            });
        }

        let underperformers: Vec<String> = portfolio
            .holdings
            .iter()
            .filter(|h| h.simple_return < self.config.underperformer_return)
            .map(|h| h.symbol.clone())
            .collect();
        if !underperformers.is_empty() {
            alerts.push(InsightAlert {
                kind: AlertKind::Underperformer,
                severity: Severity::Warning,
                message: format!(
                    "{} holding(s) down more than {:.0}%: {}",
                    underperformers.len(),
                    self.config.underperformer_return.abs() * 100.0,
                    underperformers.join(", ")
                ),
                symbols: underperformers,
            });
        }

        let stale: Vec<String> = portfolio
            .holdings
            .iter()
            .filter(|h| h.price_degraded)
            .map(|h| h.symbol.clone())
            .collect();
        if !stale.is_empty() {
            alerts.push(InsightAlert {
                kind: AlertKind::StaleData,
                severity: Severity::Info,
                message: format!(
                    "No live price for {}; purchase price used instead",
                    stale.join(", ")
                ),
                symbols: stale,
            });
        }

        alerts
    }
}

pub fn health_components(
    portfolio: &NormalizedPortfolio,
    metrics: &PortfolioMetrics,
) -> HealthComponents {
    let max_sector_weight = portfolio
        .sector_weights()
        .into_values()
        .fold(0.0_f64, f64::max);

    HealthComponents {
        diversification: clamp_score((1.0 - portfolio.max_weight()) * 100.0),
        performance: clamp_score((metrics.total_return + 0.20) * 250.0),
        risk_management: clamp_score((2.0 - metrics.beta.abs()) * 50.0),
        sector_balance: clamp_score((1.0 - max_sector_weight) * 100.0),
    }
}

fn diversification_analysis(
    portfolio: &NormalizedPortfolio,
    risk: &RiskDecomposition,
) -> DiversificationAnalysis {
    let sector_weights = portfolio.sector_weights();

    // A risk stage that fell back to defaults reports an HHI of 0.
    let hhi = if risk.concentration_risk > EPSILON {
        risk.concentration_risk
    } else {
        herfindahl(portfolio.holdings.iter().map(|h| h.weight))
    };
    let effective_holdings = if hhi > EPSILON { 1.0 / hhi } else { 0.0 };

    let largest_sector = sector_weights
        .iter()
        .fold(None, |best: Option<(&String, f64)>, (name, weight)| match best {
            Some((_, w)) if w >= *weight => best,
            _ => Some((name, *weight)),
        })
        .map(|(name, weight)| PortfolioShare {
            name: name.clone(),
            weight,
        });

    DiversificationAnalysis {
        holding_count: portfolio.len(),
        sector_count: sector_weights.len(),
        effective_holdings,
        largest_position: portfolio.largest_holding().map(|h| PortfolioShare {
            name: h.symbol.clone(),
            weight: h.weight,
        }),
        largest_sector,
    }
}
