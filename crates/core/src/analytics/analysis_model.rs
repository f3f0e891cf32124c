//! The aggregate analysis result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attribution::PerformanceAttribution;
use super::insights::{AiInsights, EsgMetrics};
use super::metrics::PortfolioMetrics;
use super::recommendations::OptimizationRecommendation;
use super::risk::RiskDecomposition;
use super::scenarios::ScenarioAnalysis;
use crate::snapshot::{DataWarning, PortfolioSnapshot, ReturnSeries};

/// Everything computed for one snapshot.
///
/// Analysis sections are `None` only for a failed analysis, in which case
/// `success` is false and `error` says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_metrics: Option<PortfolioMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_decomposition: Option<RiskDecomposition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_attribution: Option<PerformanceAttribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization_recommendations: Option<Vec<OptimizationRecommendation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_insights: Option<AiInsights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_analysis: Option<ScenarioAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esg_metrics: Option<EsgMetrics>,
    pub analysis_summary: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DataWarning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// A result with no analysis sections.
    pub fn failed(error: impl Into<String>, warnings: Vec<DataWarning>) -> Self {
        let error = error.into();
        Self {
            portfolio_metrics: None,
            risk_decomposition: None,
            performance_attribution: None,
            optimization_recommendations: None,
            ai_insights: None,
            scenario_analysis: None,
            esg_metrics: None,
            analysis_summary: format!("Portfolio analysis could not be completed: {}.", error),
            success: false,
            timestamp: Utc::now(),
            warnings,
            error: Some(error),
        }
    }
}

/// One entry of a batch analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub snapshot: PortfolioSnapshot,
    #[serde(default)]
    pub benchmark: Option<ReturnSeries>,
    /// 0 selects the default window
    #[serde(default)]
    pub timeframe_days: u32,
}

impl AnalysisRequest {
    pub fn new(snapshot: PortfolioSnapshot) -> Self {
        Self {
            snapshot,
            benchmark: None,
            timeframe_days: 0,
        }
    }

    pub fn with_benchmark(mut self, benchmark: ReturnSeries) -> Self {
        self.benchmark = Some(benchmark);
        self
    }

    pub fn with_timeframe(mut self, timeframe_days: u32) -> Self {
        self.timeframe_days = timeframe_days;
        self
    }
}
