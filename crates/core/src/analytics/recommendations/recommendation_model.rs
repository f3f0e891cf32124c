use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::snapshot::NormalizedHolding;

/// Impact keys reported in `OptimizationRecommendation::expected_impact`.
pub const IMPACT_POSITION_WEIGHT: &str = "position_weight";
pub const IMPACT_EXPECTED_RETURN: &str = "expected_return";
pub const IMPACT_CONCENTRATION: &str = "concentration_risk";
pub const IMPACT_BETA: &str = "portfolio_beta";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationAction {
    Buy,
    Sell,
    Hold,
    Rebalance,
}

impl RecommendationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationAction::Buy => "buy",
            RecommendationAction::Sell => "sell",
            RecommendationAction::Hold => "hold",
            RecommendationAction::Rebalance => "rebalance",
        }
    }
}

impl std::fmt::Display for RecommendationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a rule's action builder decides; the engine adds the holding context.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationDraft {
    pub action: RecommendationAction,
    pub recommended_weight: f64,
    pub reasoning: String,
    pub confidence_score: f64,
}

/// A ranked rebalancing action for one holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRecommendation {
    pub action: RecommendationAction,
    pub symbol: String,
    pub current_weight: f64,
    pub recommended_weight: f64,
    pub reasoning: String,
    /// Metric -> first-order change if the recommendation is followed
    pub expected_impact: BTreeMap<String, f64>,
    /// In [0, 1]
    pub confidence_score: f64,
    /// Decision-table rule that produced this recommendation
    pub rule_id: String,
}

impl OptimizationRecommendation {
    pub fn from_draft(
        rule_id: &str,
        holding: &NormalizedHolding,
        draft: RecommendationDraft,
    ) -> Self {
        let delta = draft.recommended_weight - holding.weight;
        let expected_impact = BTreeMap::from([
            (IMPACT_POSITION_WEIGHT.to_string(), delta),
            (
                IMPACT_EXPECTED_RETURN.to_string(),
                delta * holding.simple_return,
            ),
            (
                IMPACT_CONCENTRATION.to_string(),
                draft.recommended_weight.powi(2) - holding.weight.powi(2),
            ),
            (IMPACT_BETA.to_string(), delta * holding.beta),
        ]);

        Self {
            action: draft.action,
            symbol: holding.symbol.clone(),
            current_weight: holding.weight,
            recommended_weight: draft.recommended_weight,
            reasoning: draft.reasoning,
            expected_impact,
            confidence_score: draft.confidence_score.clamp(0.0, 1.0),
            rule_id: rule_id.to_string(),
        }
    }
}
