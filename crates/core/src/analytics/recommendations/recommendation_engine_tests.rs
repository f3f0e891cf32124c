//! Tests for the recommendation decision table.

#[cfg(test)]
mod tests {
    use crate::analytics::recommendations::{
        HoldingRule, RecommendationAction, RecommendationDraft, RecommendationEngine,
        IMPACT_CONCENTRATION, IMPACT_POSITION_WEIGHT, RULE_CONCENTRATION,
        RULE_SECTOR_OVERWEIGHT, RULE_SMALL_WINNER, RULE_STALE_LOSER,
    };
    use crate::config::RecommendationConfig;
    use crate::snapshot::{Holding, NormalizedPortfolio, PortfolioSnapshot, SnapshotNormalizer};
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const TOL: f64 = 1e-9;

    /// (symbol, sector, value, return, age_days)
    fn portfolio(specs: &[(&str, &str, Decimal, Decimal, i64)]) -> NormalizedPortfolio {
        let as_of = Utc.with_ymd_and_hms(2024, 6, 28, 16, 0, 0).unwrap();
        let holdings = specs
            .iter()
            .map(|(symbol, sector, value, ret, age)| {
                let price = dec!(100) * (Decimal::ONE + *ret);
                Holding::new(
                    *symbol,
                    *value / price,
                    price,
                    dec!(100),
                    *sector,
                    as_of.date_naive() - Duration::days(*age),
                )
            })
            .collect();
        SnapshotNormalizer::new()
            .normalize(&PortfolioSnapshot::new(holdings, as_of))
            .unwrap()
    }

    fn engine() -> RecommendationEngine {
        RecommendationEngine::new(RecommendationConfig::default())
    }

    // ==================== Rule 1: Concentration ====================

    #[test]
    fn test_heavy_holdings_are_sold_down_to_target() {
        let p = portfolio(&[
            ("SMALL", "Energy", dec!(200), dec!(0.05), 400),
            ("BIG", "Technology", dec!(800), dec!(0.05), 400),
        ]);
        let recs = engine().recommend(&p).unwrap();

        let big = recs
            .iter()
            .find(|r| r.symbol == "BIG" && r.rule_id == RULE_CONCENTRATION)
            .expect("BIG should trigger the concentration rule");
        assert_eq!(big.action, RecommendationAction::Sell);
        assert!((big.current_weight - 0.8).abs() < TOL);
        assert_eq!(big.recommended_weight, 0.10);
        assert_eq!(big.confidence_score, 0.85);
        assert!(big.reasoning.contains("concentration risk"));

        // 0.20 is also above the 0.15 limit
        assert!(recs
            .iter()
            .any(|r| r.symbol == "SMALL" && r.rule_id == RULE_CONCENTRATION));
    }

    #[test]
    fn test_expected_impact_deltas() {
        let p = portfolio(&[
            ("A", "Energy", dec!(500), dec!(0.20), 400),
            ("B", "Technology", dec!(500), dec!(0.20), 400),
        ]);
        let recs = engine().recommend(&p).unwrap();
        let rec = recs.iter().find(|r| r.rule_id == RULE_CONCENTRATION).unwrap();
        assert!((rec.expected_impact[IMPACT_POSITION_WEIGHT] - (-0.4)).abs() < TOL);
        assert!((rec.expected_impact[IMPACT_CONCENTRATION] - (0.01 - 0.25)).abs() < TOL);
    }

    // ==================== Rule 2: Sector Overweight ====================

    #[test]
    fn test_overweight_sector_rebalances_its_largest_holding_once() {
        let p = portfolio(&[
            ("EQNR", "Energy", dec!(140), dec!(0.10), 400),
            ("AKRBP", "Energy", dec!(120), dec!(-0.05), 400),
            ("VAR", "Energy", dec!(90), dec!(0.02), 400),
            ("DNB", "Financials", dec!(130), dec!(0.04), 400),
            ("STB", "Financials", dec!(120), dec!(0.03), 400),
            ("MOWI", "Seafood", dec!(130), dec!(0.01), 400),
            ("SALM", "Seafood", dec!(120), dec!(0.00), 400),
            ("FRO", "Shipping", dec!(140), dec!(0.06), 400),
            ("KOG", "Industrials", dec!(10), dec!(0.00), 400),
        ]);
        let recs = engine().recommend(&p).unwrap();

        let rebalances: Vec<_> = recs
            .iter()
            .filter(|r| r.action == RecommendationAction::Rebalance)
            .collect();
        assert_eq!(rebalances.len(), 1);
        let rec = rebalances[0];
        assert_eq!(rec.symbol, "EQNR");
        assert_eq!(rec.rule_id, RULE_SECTOR_OVERWEIGHT);
        assert!((rec.recommended_weight - 0.14 * 0.8).abs() < TOL);
        assert_eq!(rec.confidence_score, 0.75);
        assert!(recs.iter().all(|r| r.rule_id != RULE_CONCENTRATION));
    }

    // ==================== Rule 3: Stale Loser ====================

    #[test]
    fn test_old_losers_are_sold_young_losers_kept() {
        let p = portfolio(&[
            ("OLD", "Energy", dec!(100), dec!(-0.20), 120),
            ("NEW", "Financials", dec!(100), dec!(-0.20), 60),
            ("FLAT", "Seafood", dec!(100), dec!(0), 400),
            ("UP", "Shipping", dec!(100), dec!(0.05), 400),
            ("A", "Technology", dec!(100), dec!(0.01), 400),
            ("B", "Industrials", dec!(100), dec!(0.01), 400),
            ("C", "Materials", dec!(100), dec!(0.01), 400),
        ]);
        let recs = engine().recommend(&p).unwrap();
        let losers: Vec<_> = recs
            .iter()
            .filter(|r| r.rule_id == RULE_STALE_LOSER)
            .collect();
        assert_eq!(losers.len(), 1);
        assert_eq!(losers[0].symbol, "OLD");
        assert_eq!(losers[0].action, RecommendationAction::Sell);
        assert_eq!(losers[0].recommended_weight, 0.0);
        assert_eq!(losers[0].confidence_score, 0.70);
    }

    // ==================== Rule 4: Small Winner ====================

    fn winners_portfolio(count: usize) -> NormalizedPortfolio {
        let sectors = [
            "Energy",
            "Financials",
            "Seafood",
            "Shipping",
            "Technology",
            "Industrials",
        ];
        let mut specs: Vec<(String, &str, Decimal, Decimal, i64)> = (0..count)
            .map(|i| {
                (
                    format!("H{}", i),
                    sectors[i % sectors.len()],
                    dec!(1000),
                    dec!(0.01),
                    400,
                )
            })
            .collect();
        specs.push(("TINY".to_string(), "Materials", dec!(100), dec!(0.25), 30));
        let borrowed: Vec<(&str, &str, Decimal, Decimal, i64)> = specs
            .iter()
            .map(|(s, sec, v, r, a)| (s.as_str(), *sec, *v, *r, *a))
            .collect();
        portfolio(&borrowed)
    }

    #[test]
    fn test_small_winner_requires_more_than_ten_holdings() {
        // 9 + TINY = 10 holdings: not enough
        let recs = engine().recommend(&winners_portfolio(9)).unwrap();
        assert!(recs.iter().all(|r| r.rule_id != RULE_SMALL_WINNER));

        // 10 + TINY = 11 holdings
        let recs = engine().recommend(&winners_portfolio(10)).unwrap();
        let buy = recs
            .iter()
            .find(|r| r.rule_id == RULE_SMALL_WINNER)
            .expect("TINY should be a buy");
        assert_eq!(buy.symbol, "TINY");
        assert_eq!(buy.action, RecommendationAction::Buy);
        assert_eq!(buy.recommended_weight, 0.05);
        assert_eq!(buy.confidence_score, 0.65);
    }

    // ==================== Ranking ====================

    #[test]
    fn test_sorted_by_confidence_and_truncated() {
        let config = RecommendationConfig {
            max_position_weight: 0.0,
            loss_min_age_days: 0,
            ..RecommendationConfig::default()
        };
        let specs: Vec<(String, Decimal)> = (0..12)
            .map(|i| {
                let ret = if i % 2 == 0 { dec!(-0.30) } else { dec!(0.10) };
                (format!("S{}", i), ret)
            })
            .collect();
        let borrowed: Vec<(&str, &str, Decimal, Decimal, i64)> = specs
            .iter()
            .map(|(s, r)| (s.as_str(), "Energy", dec!(100), *r, 200))
            .collect();
        let p = portfolio(&borrowed);

        let recs = RecommendationEngine::new(config).recommend(&p).unwrap();
        assert_eq!(recs.len(), 10);
        assert!(recs
            .windows(2)
            .all(|w| w[0].confidence_score >= w[1].confidence_score));
        // 12 concentration sells outrank everything else
        assert!(recs.iter().all(|r| r.rule_id == RULE_CONCENTRATION));
        // ties keep holding order
        assert_eq!(recs[0].symbol, "S0");
        assert_eq!(recs[9].symbol, "S9");
    }

    #[test]
    fn test_appended_rule_runs_last() {
        let mut engine = engine();
        engine.push_rule(Box::new(HoldingRule {
            id: "hold_everything",
            enabled_when: |_| true,
            predicate: |_, _| true,
            action: |h, _| RecommendationDraft {
                action: RecommendationAction::Hold,
                recommended_weight: h.weight,
                reasoning: "no change".to_string(),
                confidence_score: 0.1,
            },
        }));
        assert_eq!(
            engine.rule_ids(),
            vec![
                RULE_CONCENTRATION,
                RULE_SECTOR_OVERWEIGHT,
                RULE_STALE_LOSER,
                RULE_SMALL_WINNER,
                "hold_everything"
            ]
        );

        let p = portfolio(&[
            ("A", "Energy", dec!(100), dec!(0.0), 400),
            ("B", "Technology", dec!(100), dec!(0.0), 400),
        ]);
        let recs = engine.recommend(&p).unwrap();
        let last = recs.last().unwrap();
        assert_eq!(last.action, RecommendationAction::Hold);
        assert_eq!(last.expected_impact[IMPACT_POSITION_WEIGHT], 0.0);
    }

    #[test]
    fn test_action_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RecommendationAction::Rebalance).unwrap(),
            "\"rebalance\""
        );
    }
}
