//! The rebalancing decision table.
//!
//! Rules are plain data: an id, a predicate and an action builder. Adding a
//! rule means appending an entry to `default_rules`; existing entries keep
//! their position, so their relative ranking among equal confidences is
//! preserved.

use std::collections::BTreeMap;

use super::{OptimizationRecommendation, RecommendationAction, RecommendationDraft};
use crate::config::RecommendationConfig;
use crate::snapshot::{NormalizedHolding, NormalizedPortfolio};

pub const RULE_CONCENTRATION: &str = "concentration";
pub const RULE_SECTOR_OVERWEIGHT: &str = "sector_overweight";
pub const RULE_STALE_LOSER: &str = "stale_loser";
pub const RULE_SMALL_WINNER: &str = "small_winner";

const CONCENTRATION_CONFIDENCE: f64 = 0.85;
const SECTOR_CONFIDENCE: f64 = 0.75;
const LOSER_CONFIDENCE: f64 = 0.70;
const WINNER_CONFIDENCE: f64 = 0.65;

/// Inputs shared by every rule during one evaluation.
pub struct RuleContext<'a> {
    pub portfolio: &'a NormalizedPortfolio,
    pub config: &'a RecommendationConfig,
    pub sector_weights: BTreeMap<String, f64>,
}

impl<'a> RuleContext<'a> {
    pub fn new(portfolio: &'a NormalizedPortfolio, config: &'a RecommendationConfig) -> Self {
        Self {
            portfolio,
            config,
            sector_weights: portfolio.sector_weights(),
        }
    }
}

/// One row of the decision table.
pub trait RecommendationRule: Send + Sync {
    /// Stable identifier, reported on every recommendation the rule emits.
    fn id(&self) -> &'static str;

    /// Emits one recommendation per match.
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<OptimizationRecommendation>;
}

type HoldingPredicate = fn(&NormalizedHolding, &RuleContext<'_>) -> bool;
type HoldingAction = fn(&NormalizedHolding, &RuleContext<'_>) -> RecommendationDraft;

/// A rule evaluated against every holding, optionally gated on the portfolio.
pub struct HoldingRule {
    pub id: &'static str,
    pub enabled_when: fn(&RuleContext<'_>) -> bool,
    pub predicate: HoldingPredicate,
    pub action: HoldingAction,
}

impl RecommendationRule for HoldingRule {
    fn id(&self) -> &'static str {
        self.id
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<OptimizationRecommendation> {
        if !(self.enabled_when)(ctx) {
            return Vec::new();
        }
        ctx.portfolio
            .holdings
            .iter()
            .filter(|h| (self.predicate)(h, ctx))
            .map(|h| OptimizationRecommendation::from_draft(self.id, h, (self.action)(h, ctx)))
            .collect()
    }
}

type SectorPredicate = fn(&str, f64, &RuleContext<'_>) -> bool;
type SectorAction = fn(&str, f64, &NormalizedHolding, &RuleContext<'_>) -> RecommendationDraft;

/// A rule evaluated per sector that acts on the sector's largest holding.
pub struct SectorRule {
    pub id: &'static str,
    pub predicate: SectorPredicate,
    pub action: SectorAction,
}

impl RecommendationRule for SectorRule {
    fn id(&self) -> &'static str {
        self.id
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<OptimizationRecommendation> {
        let groups = ctx.portfolio.by_sector();
        ctx.sector_weights
            .iter()
            .filter(|(sector, weight)| (self.predicate)(sector, **weight, ctx))
            .filter_map(|(sector, weight)| {
                let largest = groups.get(sector.as_str()).and_then(|holdings| {
                    holdings.iter().copied().fold(None, |best: Option<&NormalizedHolding>, h| {
                        match best {
                            Some(b) if b.weight >= h.weight => Some(b),
                            _ => Some(h),
                        }
                    })
                })?;
                let draft = (self.action)(sector, *weight, largest, ctx);
                Some(OptimizationRecommendation::from_draft(self.id, largest, draft))
            })
            .collect()
    }
}

/// The standard decision table, in evaluation order.
pub fn default_rules() -> Vec<Box<dyn RecommendationRule>> {
    vec![
        Box::new(HoldingRule {
            id: RULE_CONCENTRATION,
            enabled_when: |_| true,
            predicate: |h, ctx| h.weight > ctx.config.max_position_weight,
            action: |h, ctx| RecommendationDraft {
                action: RecommendationAction::Sell,
                recommended_weight: ctx.config.target_position_weight,
                reasoning: format!(
                    "{} makes up {:.1}% of the portfolio; trimming it to {:.1}% reduces concentration risk",
                    h.symbol,
                    h.weight * 100.0,
                    ctx.config.target_position_weight * 100.0
                ),
                confidence_score: CONCENTRATION_CONFIDENCE,
            },
        }),
        Box::new(SectorRule {
            id: RULE_SECTOR_OVERWEIGHT,
            predicate: |_, weight, ctx| weight > ctx.config.max_sector_weight,
            action: |sector, weight, h, ctx| RecommendationDraft {
                action: RecommendationAction::Rebalance,
                recommended_weight: h.weight * ctx.config.sector_trim_factor,
                reasoning: format!(
                    "{} is {:.1}% of the portfolio, above the {:.1}% sector limit; trim its largest position {}",
                    sector,
                    weight * 100.0,
                    ctx.config.max_sector_weight * 100.0,
                    h.symbol
                ),
                confidence_score: SECTOR_CONFIDENCE,
            },
        }),
        Box::new(HoldingRule {
            id: RULE_STALE_LOSER,
            enabled_when: |_| true,
            predicate: |h, ctx| {
                h.simple_return < ctx.config.loss_threshold
                    && h.holding_age_days > ctx.config.loss_min_age_days
            },
            action: |h, _| RecommendationDraft {
                action: RecommendationAction::Sell,
                recommended_weight: 0.0,
                reasoning: format!(
                    "{} is down {:.1}% after {} days without recovering; consider exiting",
                    h.symbol,
                    h.simple_return.abs() * 100.0,
                    h.holding_age_days
                ),
                confidence_score: LOSER_CONFIDENCE,
            },
        }),
        Box::new(HoldingRule {
            id: RULE_SMALL_WINNER,
            enabled_when: |ctx| ctx.portfolio.len() > ctx.config.min_holdings_for_buy,
            predicate: |h, ctx| {
                h.weight < ctx.config.small_position_weight
                    && h.simple_return > ctx.config.winner_return_threshold
            },
            action: |h, ctx| RecommendationDraft {
                action: RecommendationAction::Buy,
                recommended_weight: ctx.config.buy_target_weight,
                reasoning: format!(
                    "{} has returned {:.1}% but is only {:.1}% of the portfolio; consider adding to it",
                    h.symbol,
                    h.simple_return * 100.0,
                    h.weight * 100.0
                ),
                confidence_score: WINNER_CONFIDENCE,
            },
        }),
    ]
}
