use log::debug;

use super::{default_rules, OptimizationRecommendation, RecommendationRule, RuleContext};
use crate::config::RecommendationConfig;
use crate::errors::CalculatorError;
use crate::snapshot::NormalizedPortfolio;
use crate::utils::math::ensure_finite;

const STAGE: &str = "recommendations";

/// Evaluates the decision table and ranks the results.
pub struct RecommendationEngine {
    config: RecommendationConfig,
    rules: Vec<Box<dyn RecommendationRule>>,
}

impl RecommendationEngine {
    /// Creates an engine with the standard rule table.
    pub fn new(config: RecommendationConfig) -> Self {
        Self::with_rules(config, default_rules())
    }

    pub fn with_rules(
        config: RecommendationConfig,
        rules: Vec<Box<dyn RecommendationRule>>,
    ) -> Self {
        Self { config, rules }
    }

    /// Appends a rule after the existing ones.
    pub fn push_rule(&mut self, rule: Box<dyn RecommendationRule>) {
        self.rules.push(rule);
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Runs every rule in table order, then sorts by confidence (highest
    /// first, ties keep table order) and truncates to the configured maximum.
    pub fn recommend(
        &self,
        portfolio: &NormalizedPortfolio,
    ) -> Result<Vec<OptimizationRecommendation>, CalculatorError> {
        if portfolio.is_empty() {
            return Ok(Vec::new());
        }

        let ctx = RuleContext::new(portfolio, &self.config);
        let mut recommendations = Vec::new();
        for rule in &self.rules {
            let emitted = rule.evaluate(&ctx);
            debug!("Rule '{}' emitted {} recommendations", rule.id(), emitted.len());
            recommendations.extend(emitted);
        }

        for rec in &recommendations {
            ensure_finite(
                STAGE,
                &format!("{}.recommended_weight", rec.symbol),
                rec.recommended_weight,
            )?;
            ensure_finite(
                STAGE,
                &format!("{}.confidence_score", rec.symbol),
                rec.confidence_score,
            )?;
        }

        recommendations.sort_by(|a, b| b.confidence_score.total_cmp(&a.confidence_score));
        recommendations.truncate(self.config.max_recommendations);
        Ok(recommendations)
    }
}
