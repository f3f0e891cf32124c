//! Orchestrates the analytics stages over one snapshot.

use chrono::Utc;
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::sync::Arc;

use super::analysis_cache::{AnalysisCache, CacheKey};
use super::attribution::AttributionEngine;
use super::insights::{AiInsights, EsgCalculator, InsightSynthesizer};
use super::metrics::{MetricsCalculator, PortfolioMetrics};
use super::recommendations::{RecommendationEngine, RecommendationRule};
use super::risk::RiskDecomposer;
use super::scenarios::{ScenarioAnalysis, ScenarioSimulator};
use super::{AnalysisRequest, AnalysisResult};
use crate::config::AnalyticsConfig;
use crate::constants::DEFAULT_TIMEFRAME_DAYS;
use crate::errors::{CalculatorError, Result};
use crate::market_data::{PortfolioStore, SnapshotAssembler};
use crate::snapshot::{
    DataWarning, NormalizedPortfolio, PortfolioSnapshot, ReturnSeries, SnapshotNormalizer,
};
use crate::statistics::{default_provider, StatisticsProvider};

/// Runs the full analysis pipeline.
///
/// Stages run in dependency order: normalization, then metrics and risk,
/// then attribution, recommendations, scenarios and ESG, then insights. A
/// failing stage is replaced by its neutral default and reported as a
/// warning; only an empty portfolio fails the analysis.
pub struct AnalysisService {
    normalizer: SnapshotNormalizer,
    metrics: MetricsCalculator,
    risk: RiskDecomposer,
    attribution: AttributionEngine,
    recommendations: RecommendationEngine,
    scenarios: ScenarioSimulator,
    insights: InsightSynthesizer,
    esg: EsgCalculator,
    cache: Option<AnalysisCache>,
}

impl AnalysisService {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self::with_statistics(config, default_provider())
    }

    pub fn with_statistics(config: AnalyticsConfig, stats: Arc<dyn StatisticsProvider>) -> Self {
        let cache = config
            .cache
            .enabled
            .then(|| AnalysisCache::new(config.cache.max_entries));

        Self {
            normalizer: SnapshotNormalizer::new(),
            metrics: MetricsCalculator::new(config.market.clone(), stats.clone()),
            risk: RiskDecomposer::new(
                config.market.clone(),
                config.insights.momentum_window_days,
                stats.clone(),
            ),
            attribution: AttributionEngine::new(stats),
            recommendations: RecommendationEngine::new(config.recommendations.clone()),
            scenarios: ScenarioSimulator::new(config.scenarios.clone(), config.market.clone()),
            insights: InsightSynthesizer::new(config.insights.clone()),
            esg: EsgCalculator::new(config.esg),
            cache,
        }
    }

    /// Appends a rule to the recommendation decision table.
    pub fn with_recommendation_rule(mut self, rule: Box<dyn RecommendationRule>) -> Self {
        self.recommendations.push_rule(rule);
        self
    }

    pub fn cache(&self) -> Option<&AnalysisCache> {
        self.cache.as_ref()
    }

    /// Analyzes one snapshot. `timeframe_days == 0` selects the default
    /// window of 252 trading days.
    pub fn analyze(
        &self,
        snapshot: &PortfolioSnapshot,
        benchmark: Option<&ReturnSeries>,
        timeframe_days: u32,
    ) -> AnalysisResult {
        let timeframe_days = if timeframe_days == 0 {
            DEFAULT_TIMEFRAME_DAYS
        } else {
            timeframe_days
        };

        let key = self
            .cache
            .as_ref()
            .map(|_| CacheKey::new(snapshot, benchmark, timeframe_days));
        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(hit) = cache.get(key) {
                debug!("Analysis cache hit for snapshot {}", &key.snapshot_hash[..12]);
                return hit;
            }
        }

        let portfolio = match self.normalizer.normalize(snapshot) {
            Ok(portfolio) => portfolio,
            Err(e) => {
                warn!("Portfolio analysis aborted: {}", e);
                return AnalysisResult::failed(e.to_string(), snapshot.warnings().to_vec());
            }
        };

        let result = self.run_stages(&portfolio, benchmark, timeframe_days);
        info!(
            "Analyzed {} holdings: health {:.1}, {} recommendations, {} warnings",
            portfolio.len(),
            result.ai_insights.as_ref().map_or(0.0, |i| i.health_score),
            result.optimization_recommendations.as_ref().map_or(0, Vec::len),
            result.warnings.len()
        );

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.insert(key, &result);
        }
        result
    }

    /// Analyzes independent requests in parallel. Output order matches input
    /// order.
    pub fn analyze_many(&self, requests: &[AnalysisRequest]) -> Vec<AnalysisResult> {
        requests
            .par_iter()
            .map(|request| {
                self.analyze(
                    &request.snapshot,
                    request.benchmark.as_ref(),
                    request.timeframe_days,
                )
            })
            .collect()
    }

    /// Loads a stored portfolio, prices it with live quotes and analyzes it.
    ///
    /// A benchmark that cannot be loaded degrades to the market assumptions
    /// with a warning. Store failures are returned as errors.
    pub async fn analyze_portfolio(
        &self,
        store: &dyn PortfolioStore,
        assembler: &SnapshotAssembler,
        portfolio_id: &str,
        benchmark_symbol: Option<&str>,
        timeframe_days: u32,
    ) -> Result<AnalysisResult> {
        let holdings = store.get_holdings(portfolio_id).await?;
        debug!(
            "Loaded {} holdings for portfolio '{}'",
            holdings.len(),
            portfolio_id
        );
        let snapshot = assembler.assemble(holdings, Utc::now()).await;

        let window = if timeframe_days == 0 {
            DEFAULT_TIMEFRAME_DAYS
        } else {
            timeframe_days
        };
        let mut benchmark_warning = None;
        let benchmark = match benchmark_symbol {
            Some(symbol) => match assembler.benchmark_series(symbol, window).await {
                Ok(series) if !series.is_empty() => Some(series),
                Ok(_) => {
                    benchmark_warning = Some(DataWarning::degraded_price(
                        symbol,
                        "benchmark has no price history; using market assumptions",
                    ));
                    None
                }
                Err(e) => {
                    warn!("Benchmark '{}' unavailable: {}", symbol, e);
                    benchmark_warning = Some(DataWarning::degraded_price(
                        symbol,
                        format!("benchmark unavailable: {}", e),
                    ));
                    None
                }
            },
            None => None,
        };

        let mut result = self.analyze(&snapshot, benchmark.as_ref(), timeframe_days);
        result.warnings.extend(benchmark_warning);
        Ok(result)
    }

    fn run_stages(
        &self,
        portfolio: &NormalizedPortfolio,
        benchmark: Option<&ReturnSeries>,
        timeframe_days: u32,
    ) -> AnalysisResult {
        let mut warnings = portfolio.warnings.clone();

        let metrics = stage_or_default(
            "metrics",
            self.metrics.calculate(portfolio, benchmark, timeframe_days),
            &mut warnings,
        );
        let risk = stage_or_default("risk", self.risk.decompose(portfolio), &mut warnings);

        let attribution = stage_or_default(
            "attribution",
            self.attribution.attribute(portfolio),
            &mut warnings,
        );
        let recommendations = stage_or_default(
            "recommendations",
            self.recommendations.recommend(portfolio),
            &mut warnings,
        );
        let scenarios = stage_or_default(
            "scenarios",
            self.scenarios.simulate(portfolio),
            &mut warnings,
        );
        let esg = stage_or_default("esg", self.esg.calculate(portfolio), &mut warnings);

        let insights = stage_or_default(
            "insights",
            self.insights.synthesize(portfolio, &metrics, &risk),
            &mut warnings,
        );

        let analysis_summary =
            summarize(portfolio, &metrics, &insights, &scenarios, recommendations.len());

        AnalysisResult {
            portfolio_metrics: Some(metrics),
            risk_decomposition: Some(risk),
            performance_attribution: Some(attribution),
            optimization_recommendations: Some(recommendations),
            ai_insights: Some(insights),
            scenario_analysis: Some(scenarios),
            esg_metrics: Some(esg),
            analysis_summary,
            success: true,
            timestamp: Utc::now(),
            warnings,
            error: None,
        }
    }
}

fn stage_or_default<T: Default>(
    stage: &str,
    outcome: std::result::Result<T, CalculatorError>,
    warnings: &mut Vec<DataWarning>,
) -> T {
    match outcome {
        Ok(value) => value,
        Err(e) => {
            error!("Analytics stage '{}' failed, using defaults: {}", stage, e);
            warnings.push(DataWarning::stage_fallback(stage, &e));
            T::default()
        }
    }
}

/// Two sentences: performance, then health and outlook.
fn summarize(
    portfolio: &NormalizedPortfolio,
    metrics: &PortfolioMetrics,
    insights: &AiInsights,
    scenarios: &ScenarioAnalysis,
    recommendation_count: usize,
) -> String {
    format!(
        "The portfolio of {} holdings has returned {:.1}% ({:.1}% annualized) with a Sharpe ratio of {:.2}. \
         Its health score is {:.0}/100 (grade {}) with a {} risk profile, {} recommendation(s) and an estimated {:.1}% impact in a market crash.",
        portfolio.len(),
        metrics.total_return * 100.0,
        metrics.annualized_return * 100.0,
        metrics.sharpe_ratio,
        insights.health_score,
        insights.grade,
        insights.risk_profile,
        recommendation_count,
        scenarios.market_crash.total_portfolio_impact * 100.0
    )
}
