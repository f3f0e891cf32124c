//! Analytics configuration.
//!
//! Every heuristic threshold the engine uses lives here rather than in the
//! stages themselves. All sections default to the documented values, so a
//! partial JSON document only needs to name the values it overrides.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{Error, Result};

/// Market assumptions used where no full covariance history is available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketAssumptions {
    /// Annual risk-free rate (default: 0.02)
    pub risk_free_rate: f64,
    /// Expected annual market return (default: 0.08)
    pub assumed_market_return: f64,
    /// Annualized market volatility; its square is the market variance (default: 0.16)
    pub assumed_market_volatility: f64,
    /// Correlation between the portfolio and the market (default: 0.7)
    pub market_correlation: f64,
}

impl Default for MarketAssumptions {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.02,
            assumed_market_return: 0.08,
            assumed_market_volatility: 0.16,
            market_correlation: 0.7,
        }
    }
}

impl MarketAssumptions {
    pub fn market_variance(&self) -> f64 {
        self.assumed_market_volatility * self.assumed_market_volatility
    }
}

/// Thresholds for the rebalancing decision table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub max_position_weight: f64,
    pub target_position_weight: f64,
    pub max_sector_weight: f64,
    pub sector_trim_factor: f64,
    pub loss_threshold: f64,
    pub loss_min_age_days: i64,
    /// Small-winner buys only fire above this many holdings
    pub min_holdings_for_buy: usize,
    pub small_position_weight: f64,
    pub winner_return_threshold: f64,
    pub buy_target_weight: f64,
    pub max_recommendations: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            max_position_weight: 0.15,
            target_position_weight: 0.10,
            max_sector_weight: 0.30,
            sector_trim_factor: 0.8,
            loss_threshold: -0.15,
            loss_min_age_days: 90,
            min_holdings_for_buy: 10,
            small_position_weight: 0.02,
            winner_return_threshold: 0.10,
            buy_target_weight: 0.05,
            max_recommendations: 10,
        }
    }
}

/// Stress scenario parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Market move applied in the crash scenario (default: -0.20)
    pub crash_market_move: f64,
    /// Amplifier applied on top of each holding's beta (default: 1.2)
    pub crash_beta_amplifier: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            crash_market_move: -0.20,
            crash_beta_amplifier: 1.2,
        }
    }
}

/// Health score alert thresholds and risk profile bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    pub concentration_alert_weight: f64,
    pub poor_sharpe_threshold: f64,
    pub underperformer_return: f64,
    /// Holdings younger than this count toward the momentum factor
    pub momentum_window_days: i64,
    pub conservative_max_beta: f64,
    pub conservative_max_volatility: f64,
    pub aggressive_min_beta: f64,
    pub aggressive_min_volatility: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            concentration_alert_weight: 0.20,
            poor_sharpe_threshold: 0.5,
            underperformer_return: -0.15,
            momentum_window_days: 90,
            conservative_max_beta: 0.8,
            conservative_max_volatility: 0.15,
            aggressive_min_beta: 1.2,
            aggressive_min_volatility: 0.35,
        }
    }
}

/// Sector-level ESG scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EsgConfig {
    /// Lower-cased sector name -> score in [0, 100]
    pub sector_scores: BTreeMap<String, f64>,
    /// Score for sectors missing from the table
    pub default_score: f64,
}

impl Default for EsgConfig {
    fn default() -> Self {
        let sector_scores = [
            ("technology", 72.0),
            ("communication services", 64.0),
            ("health care", 70.0),
            ("healthcare", 70.0),
            ("financials", 62.0),
            ("consumer staples", 60.0),
            ("consumer discretionary", 58.0),
            ("industrials", 57.0),
            ("utilities", 66.0),
            ("renewable energy", 85.0),
            ("real estate", 55.0),
            ("materials", 45.0),
            ("seafood", 52.0),
            ("shipping", 40.0),
            ("energy", 35.0),
        ]
        .into_iter()
        .map(|(sector, score)| (sector.to_string(), score))
        .collect();

        Self {
            sector_scores,
            default_score: 50.0,
        }
    }
}

/// Result cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 256,
        }
    }
}

/// Snapshot assembly settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    /// Upper bound on the whole price fetch (default: 5000 ms)
    pub price_timeout_ms: u64,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            price_timeout_ms: 5_000,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub market: MarketAssumptions,
    pub recommendations: RecommendationConfig,
    pub scenarios: ScenarioConfig,
    pub insights: InsightConfig,
    pub esg: EsgConfig,
    pub cache: CacheConfig,
    pub market_data: MarketDataConfig,
}

impl AnalyticsConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AnalyticsConfig = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfigValue(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigIO(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }

    /// Rejects values that would make the stages meaningless.
    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, message: &str) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(Error::InvalidConfigValue(message.to_string()))
            }
        }

        let m = &self.market;
        check(m.risk_free_rate.is_finite(), "market.risk_free_rate must be finite")?;
        check(
            m.assumed_market_return.is_finite(),
            "market.assumed_market_return must be finite",
        )?;
        check(
            m.assumed_market_volatility.is_finite() && m.assumed_market_volatility >= 0.0,
            "market.assumed_market_volatility must be >= 0",
        )?;
        check(
            (-1.0..=1.0).contains(&m.market_correlation),
            "market.market_correlation must be within [-1, 1]",
        )?;

        let r = &self.recommendations;
        for (name, value) in [
            ("max_position_weight", r.max_position_weight),
            ("target_position_weight", r.target_position_weight),
            ("max_sector_weight", r.max_sector_weight),
            ("small_position_weight", r.small_position_weight),
            ("buy_target_weight", r.buy_target_weight),
            ("sector_trim_factor", r.sector_trim_factor),
        ] {
            check(
                (0.0..=1.0).contains(&value),
                &format!("recommendations.{} must be within [0, 1]", name),
            )?;
        }
        check(
            r.max_recommendations > 0,
            "recommendations.max_recommendations must be positive",
        )?;

        check(
            self.scenarios.crash_market_move.is_finite()
                && self.scenarios.crash_beta_amplifier.is_finite(),
            "scenarios values must be finite",
        )?;

        check(
            self.esg.sector_scores.values().all(|s| (0.0..=100.0).contains(s))
                && (0.0..=100.0).contains(&self.esg.default_score),
            "esg scores must be within [0, 100]",
        )?;

        check(
            self.market_data.price_timeout_ms > 0,
            "market_data.price_timeout_ms must be positive",
        )?;

        Ok(())
    }
}
