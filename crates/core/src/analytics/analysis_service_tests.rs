//! Tests for the analysis service.

#[cfg(test)]
mod tests {
    use crate::analytics::recommendations::{HoldingRule, RecommendationAction, RecommendationDraft};
    use crate::analytics::{AnalysisRequest, AnalysisService};
    use crate::config::{AnalyticsConfig, CacheConfig};
    use crate::errors::{Error, Result};
    use crate::market_data::{MarketDataProvider, PortfolioStore, PricePoint, SnapshotAssembler};
    use crate::snapshot::{Holding, PortfolioSnapshot, ReturnSeries, WarningKind};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 28, 16, 0, 0).unwrap()
    }

    fn holding(
        symbol: &str,
        sector: &str,
        shares: Decimal,
        price: Decimal,
        cost: Decimal,
    ) -> Holding {
        Holding::new(
            symbol,
            shares,
            price,
            cost,
            sector,
            as_of().date_naive() - Duration::days(200),
        )
    }

    fn oslo_portfolio() -> PortfolioSnapshot {
        PortfolioSnapshot::new(
            vec![
                holding("EQNR", "Energy", dec!(100), dec!(290), dec!(250)).with_beta(1.1),
                holding("DNB", "Financials", dec!(120), dec!(210), dec!(190)).with_beta(1.0),
                holding("MOWI", "Seafood", dec!(80), dec!(190), dec!(205)).with_beta(0.7),
                holding("NHY", "Materials", dec!(300), dec!(68), dec!(80)).with_beta(1.3),
                holding("TEL", "Communication Services", dec!(150), dec!(130), dec!(150))
                    .with_beta(0.6),
            ],
            as_of(),
        )
    }

    fn service() -> AnalysisService {
        AnalysisService::new(AnalyticsConfig::default())
    }

    // ==================== Analyze ====================

    #[test]
    fn test_full_analysis_has_every_section() {
        let result = service().analyze(&oslo_portfolio(), None, 252);

        assert!(result.success);
        assert!(result.error.is_none());
        assert!(result.portfolio_metrics.is_some());
        assert!(result.risk_decomposition.is_some());
        assert!(result.performance_attribution.is_some());
        assert!(result.optimization_recommendations.is_some());
        assert!(result.ai_insights.is_some());
        assert!(result.scenario_analysis.is_some());
        assert!(result.esg_metrics.is_some());
        assert!(result.warnings.is_empty());

        let summary = &result.analysis_summary;
        assert!(summary.ends_with('.'));
        assert_eq!(summary.matches(". ").count(), 1);
    }

    #[test]
    fn test_empty_snapshot_fails_without_sections() {
        let result = service().analyze(&PortfolioSnapshot::new(Vec::new(), as_of()), None, 252);

        assert!(!result.success);
        assert!(result.portfolio_metrics.is_none());
        assert!(result.optimization_recommendations.is_none());
        assert!(result.error.as_deref().unwrap().contains("no valid holdings"));

        let json = serde_json::to_value(&result).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("portfolio_metrics"));
        assert!(!object.contains_key("ai_insights"));
        assert_eq!(object["success"], false);
    }

    #[test]
    fn test_all_invalid_holdings_is_an_empty_portfolio() {
        let snapshot = PortfolioSnapshot::new(
            vec![holding("BAD", "Energy", dec!(0), dec!(10), dec!(10))],
            as_of(),
        );
        let result = service().analyze(&snapshot, None, 252);
        assert!(!result.success);
    }

    #[test]
    fn test_excluded_holdings_are_reported() {
        let mut holdings = oslo_portfolio().holdings().to_vec();
        holdings.push(holding("NEG", "Energy", dec!(-5), dec!(10), dec!(10)));
        let result = service().analyze(&PortfolioSnapshot::new(holdings, as_of()), None, 252);

        assert!(result.success);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::ExcludedHolding);
        assert_eq!(result.warnings[0].symbol.as_deref(), Some("NEG"));
    }

    #[test]
    fn test_zero_timeframe_uses_default_window() {
        let service = service();
        let series = ReturnSeries::new(
            None,
            (0..400).map(|i| (i % 7) as f64 * 0.001 - 0.002).collect(),
        );
        let default = service.analyze(&oslo_portfolio(), Some(&series), 0);
        let explicit = service.analyze(&oslo_portfolio(), Some(&series), 252);
        assert_eq!(default.portfolio_metrics, explicit.portfolio_metrics);
    }

    #[test]
    fn test_result_json_field_names() {
        let result = service().analyze(&oslo_portfolio(), None, 252);
        let json = serde_json::to_value(&result).unwrap();
        for field in [
            "portfolio_metrics",
            "risk_decomposition",
            "performance_attribution",
            "optimization_recommendations",
            "ai_insights",
            "scenario_analysis",
            "esg_metrics",
            "analysis_summary",
            "success",
            "timestamp",
        ] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
        assert!(json["portfolio_metrics"].get("sharpe_ratio").is_some());
        assert!(json["ai_insights"].get("health_score").is_some());
        assert!(json.get("error").is_none());
    }

    // ==================== Stage Fallback ====================

    #[test]
    fn test_failing_stage_falls_back_to_default() {
        let service = service().with_recommendation_rule(Box::new(HoldingRule {
            id: "broken",
            enabled_when: |_| true,
            predicate: |_, _| true,
            action: |_, _| RecommendationDraft {
                action: RecommendationAction::Hold,
                recommended_weight: f64::NAN,
                reasoning: String::new(),
                confidence_score: 0.5,
            },
        }));
        let result = service.analyze(&oslo_portfolio(), None, 252);

        assert!(result.success);
        assert_eq!(result.optimization_recommendations, Some(Vec::new()));
        assert!(result.portfolio_metrics.is_some());
        let fallback: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::StageFallback)
            .collect();
        assert_eq!(fallback.len(), 1);
        assert!(fallback[0].message.contains("recommendations"));
    }

    // ==================== Cache ====================

    #[test]
    fn test_repeated_analysis_is_served_from_cache() {
        let service = service();
        let first = service.analyze(&oslo_portfolio(), None, 252);
        let second = service.analyze(&oslo_portfolio(), None, 252);
        assert_eq!(first, second);
        assert_eq!(service.cache().unwrap().len(), 1);

        service.analyze(&oslo_portfolio(), None, 126);
        assert_eq!(service.cache().unwrap().len(), 2);
    }

    #[test]
    fn test_cache_can_be_disabled() {
        let config = AnalyticsConfig {
            cache: CacheConfig {
                enabled: false,
                ..CacheConfig::default()
            },
            ..AnalyticsConfig::default()
        };
        let service = AnalysisService::new(config);
        service.analyze(&oslo_portfolio(), None, 252);
        assert!(service.cache().is_none());
    }

    // ==================== Batch ====================

    #[test]
    fn test_analyze_many_preserves_order() {
        let single = PortfolioSnapshot::new(
            vec![holding("SOLO", "Energy", dec!(10), dec!(100), dec!(100))],
            as_of(),
        );
        let requests = vec![
            AnalysisRequest::new(oslo_portfolio()),
            AnalysisRequest::new(PortfolioSnapshot::new(Vec::new(), as_of())),
            AnalysisRequest::new(single).with_timeframe(21),
        ];
        let results = service().analyze_many(&requests);

        assert_eq!(results.len(), 3);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert!(results[2].success);
        let diversification = &results[2].ai_insights.as_ref().unwrap().diversification_analysis;
        assert_eq!(diversification.holding_count, 1);
    }

    // ==================== Stored Portfolios ====================

    struct MemoryStore;

    #[async_trait]
    impl PortfolioStore for MemoryStore {
        async fn get_holdings(&self, portfolio_id: &str) -> Result<Vec<Holding>> {
            match portfolio_id {
                "main" => Ok(vec![
                    holding("EQNR", "Energy", dec!(100), dec!(250), dec!(250)),
                    holding("DNB", "Financials", dec!(100), dec!(190), dec!(190)),
                ]),
                other => Err(Error::Repository(format!("portfolio '{}' not found", other))),
            }
        }
    }

    struct FixedPrices;

    #[async_trait]
    impl MarketDataProvider for FixedPrices {
        async fn latest_price(&self, symbol: &str) -> Result<Option<Decimal>> {
            Ok((symbol == "EQNR").then_some(dec!(300)))
        }

        async fn price_history(&self, symbol: &str, _days: u32) -> Result<Vec<PricePoint>> {
            if symbol != "OSEBX" {
                return Err(Error::MarketData(format!("unknown index {}", symbol)));
            }
            let start = as_of().date_naive();
            Ok([dec!(1400), dec!(1410), dec!(1395)]
                .into_iter()
                .enumerate()
                .map(|(i, close)| PricePoint::new(start + Duration::days(i as i64), close))
                .collect())
        }
    }

    fn assembler() -> SnapshotAssembler {
        SnapshotAssembler::new(Arc::new(FixedPrices), &AnalyticsConfig::default().market_data)
    }

    #[tokio::test]
    async fn test_analyze_stored_portfolio() {
        let result = service()
            .analyze_portfolio(&MemoryStore, &assembler(), "main", Some("OSEBX"), 252)
            .await
            .unwrap();

        assert!(result.success);
        let degraded: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::DegradedData)
            .filter_map(|w| w.symbol.as_deref())
            .collect();
        assert_eq!(degraded, vec!["DNB"]);
        let metrics = result.portfolio_metrics.unwrap();
        assert!(metrics.total_return > 0.0);
    }

    #[tokio::test]
    async fn test_unknown_benchmark_degrades_to_market_assumptions() {
        let result = service()
            .analyze_portfolio(&MemoryStore, &assembler(), "main", Some("SPX"), 252)
            .await
            .unwrap();
        assert!(result.success);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.symbol.as_deref() == Some("SPX")));
    }

    #[tokio::test]
    async fn test_store_failure_is_an_error() {
        let err = service()
            .analyze_portfolio(&MemoryStore, &assembler(), "missing", None, 252)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Repository(_)));
    }

    struct HangingHistory;

    #[async_trait]
    impl MarketDataProvider for HangingHistory {
        async fn latest_price(&self, _symbol: &str) -> Result<Option<Decimal>> {
            Ok(Some(dec!(300)))
        }

        async fn price_history(&self, _symbol: &str, _days: u32) -> Result<Vec<PricePoint>> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_benchmark_degrades_instead_of_blocking() {
        let assembler = SnapshotAssembler::new(
            Arc::new(HangingHistory),
            &AnalyticsConfig::default().market_data,
        );
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(3600),
            service().analyze_portfolio(&MemoryStore, &assembler, "main", Some("OSEBX"), 252),
        )
        .await
        .expect("analysis should finish once the benchmark request times out")
        .unwrap();

        assert!(result.success);
        assert!(result.warnings.iter().any(|w| {
            w.kind == WarningKind::DegradedData
                && w.symbol.as_deref() == Some("OSEBX")
                && w.message.contains("timed out")
        }));
    }
}
