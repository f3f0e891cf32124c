use serde::{Deserialize, Serialize};

/// Portfolio-level statistics computed from one snapshot.
///
/// Returns and risk figures are fractions (0.05 = 5%). Drawdown, VaR and
/// CVaR are returns, so losses are negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub total_return: f64,
    pub annualized_return: f64,
    /// Cross-sectional volatility proxy, annualized with √252
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub calmar_ratio: f64,
    pub beta: f64,
    pub alpha: f64,
    pub information_ratio: f64,
    pub tracking_error: f64,
    pub var_95: f64,
    pub cvar_95: f64,
}
