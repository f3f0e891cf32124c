//! End-to-end scenarios through the public API.

use aksjefolio_core::analytics::recommendations::{RecommendationAction, RULE_SECTOR_OVERWEIGHT};
use aksjefolio_core::{AnalysisService, AnalyticsConfig, Holding, PortfolioSnapshot};
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn snapshot(specs: &[(&str, &str, Decimal, f64)]) -> PortfolioSnapshot {
    let bought = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
    let holdings = specs
        .iter()
        .map(|(symbol, sector, value, beta)| {
            Holding::new(*symbol, *value / dec!(100), dec!(100), dec!(100), *sector, bought)
                .with_beta(*beta)
        })
        .collect();
    PortfolioSnapshot::new(holdings, Utc.with_ymd_and_hms(2024, 6, 28, 16, 0, 0).unwrap())
}

fn analyze(snapshot: &PortfolioSnapshot) -> aksjefolio_core::AnalysisResult {
    AnalysisService::new(AnalyticsConfig::default()).analyze(snapshot, None, 252)
}

#[test]
fn single_unit_beta_holding_crash_impact() {
    let result = analyze(&snapshot(&[("EQNR", "Energy", dec!(100), 1.0)]));
    let crash = result.scenario_analysis.unwrap().market_crash;
    assert!((crash.total_portfolio_impact - (-0.24)).abs() < 1e-9);
}

#[test]
fn dominant_holding_is_sold_to_target_weight() {
    let result = analyze(&snapshot(&[
        ("DNB", "Financials", dec!(200), 1.0),
        ("EQNR", "Energy", dec!(800), 1.0),
    ]));
    let recs = result.optimization_recommendations.unwrap();
    let sell = recs
        .iter()
        .find(|r| r.symbol == "EQNR" && r.action == RecommendationAction::Sell)
        .unwrap();
    assert_eq!(sell.recommended_weight, 0.10);
}

#[test]
fn overweight_sector_gets_one_rebalance() {
    let mut specs = vec![
        ("EQNR", "Energy", dec!(140), 1.0),
        ("AKRBP", "Energy", dec!(120), 1.0),
        ("VAR", "Energy", dec!(90), 1.0),
    ];
    // 13 holdings of 50 spread over four other sectors, none above 30%
    let others = [
        "F1", "F2", "F3", "F4", "S1", "S2", "S3", "T1", "T2", "T3", "M1", "M2", "M3",
    ];
    let sectors = ["Financials", "Seafood", "Technology", "Materials"];
    for (i, symbol) in others.iter().enumerate() {
        specs.push((*symbol, sectors[i / 4], dec!(50), 1.0));
    }
    // Distinct returns inside Energy give the sector dispersion
    let bought = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
    let mut holdings: Vec<Holding> = snapshot(&specs).holdings().to_vec();
    holdings[0] = Holding::new("EQNR", dec!(1), dec!(140), dec!(120), "Energy", bought);
    holdings[1] = Holding::new("AKRBP", dec!(1), dec!(120), dec!(130), "Energy", bought);
    let as_of = Utc.with_ymd_and_hms(2024, 6, 28, 16, 0, 0).unwrap();
    let snapshot = PortfolioSnapshot::new(holdings, as_of);

    let result = analyze(&snapshot);
    let risk = result.risk_decomposition.unwrap();
    assert!(risk.sector_risk["Energy"] > 0.0);

    let rebalances: Vec<_> = result
        .optimization_recommendations
        .unwrap()
        .into_iter()
        .filter(|r| r.rule_id == RULE_SECTOR_OVERWEIGHT)
        .collect();
    assert_eq!(rebalances.len(), 1);
    assert_eq!(rebalances[0].symbol, "EQNR");
    assert_eq!(rebalances[0].action, RecommendationAction::Rebalance);
}

#[test]
fn empty_snapshot_reports_failure() {
    let result = analyze(&snapshot(&[]));
    assert!(!result.success);
    assert!(result.portfolio_metrics.is_none());

    let json = serde_json::to_string(&result).unwrap();
    assert!(!json.contains("portfolio_metrics"));
    assert!(json.contains("\"success\":false"));
}

#[test]
fn result_round_trips_through_json() {
    let result = analyze(&snapshot(&[
        ("EQNR", "Energy", dec!(500), 1.2),
        ("MOWI", "Seafood", dec!(300), 0.7),
        ("NOD", "Technology", dec!(200), 1.6),
    ]));
    let json = serde_json::to_string_pretty(&result).unwrap();
    let parsed: aksjefolio_core::AnalysisResult = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.success, result.success);
    assert_eq!(parsed.analysis_summary, result.analysis_summary);
    assert_eq!(
        parsed.optimization_recommendations.map(|r| r.len()),
        result.optimization_recommendations.map(|r| r.len())
    );
}
