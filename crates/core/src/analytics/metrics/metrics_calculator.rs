//! Metrics calculator.
//!
//! No price history is required: dispersion figures are computed across the
//! holdings of the snapshot, which makes them proxies for the time-series
//! measures of the same name.

use log::debug;
use std::sync::Arc;

use super::PortfolioMetrics;
use crate::config::MarketAssumptions;
use crate::constants::{CALENDAR_DAYS_PER_YEAR, EPSILON, TRADING_DAYS_PER_YEAR, VAR_PERCENTILE};
use crate::errors::CalculatorError;
use crate::snapshot::{NormalizedPortfolio, ReturnSeries};
use crate::statistics::StatisticsProvider;
use crate::utils::math::{ensure_finite, floored_div, safe_div};

const STAGE: &str = "metrics";

/// Annualized return and volatility of the reference the portfolio is
/// compared against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkProfile {
    pub annualized_return: f64,
    pub volatility: f64,
}

/// Computes `PortfolioMetrics` for a normalized portfolio.
pub struct MetricsCalculator {
    market: MarketAssumptions,
    stats: Arc<dyn StatisticsProvider>,
}

impl MetricsCalculator {
    pub fn new(market: MarketAssumptions, stats: Arc<dyn StatisticsProvider>) -> Self {
        Self { market, stats }
    }

    pub fn calculate(
        &self,
        portfolio: &NormalizedPortfolio,
        benchmark: Option<&ReturnSeries>,
        timeframe_days: u32,
    ) -> Result<PortfolioMetrics, CalculatorError> {
        let returns = portfolio.returns();
        let rf = self.market.risk_free_rate;

        let total_return = portfolio.weighted_return();
        let annualized_return =
            annualize_holding_return(total_return, portfolio.average_holding_age_days());
        let volatility = volatility_proxy(portfolio);
        let excess = annualized_return - rf;

        let sharpe_ratio = floored_div(excess, volatility);
        let downside = self.downside_deviation(&returns).unwrap_or(volatility);
        let sortino_ratio = floored_div(excess, downside);

        let max_drawdown = max_drawdown(&returns);
        let calmar_ratio = if max_drawdown == 0.0 {
            0.0
        } else {
            annualized_return / max_drawdown.abs()
        };

        let beta = portfolio.portfolio_beta();
        let alpha = annualized_return - (rf + beta * self.market.assumed_market_return);

        let var_95 = self.stats.percentile(&returns, VAR_PERCENTILE);
        let cvar_95 = conditional_var(&returns, var_95);

        let reference = self.benchmark_profile(benchmark, timeframe_days);
        let tracking_error = tracking_error(
            volatility,
            reference.volatility,
            self.market.market_correlation,
        );
        let information_ratio = if tracking_error <= EPSILON {
            0.0
        } else {
            (annualized_return - reference.annualized_return) / tracking_error
        };

        let metrics = PortfolioMetrics {
            total_return,
            annualized_return,
            volatility,
            sharpe_ratio,
            sortino_ratio,
            max_drawdown,
            calmar_ratio,
            beta,
            alpha,
            information_ratio,
            tracking_error,
            var_95,
            cvar_95,
        };
        check_finite(&metrics)?;

        debug!(
            "Metrics via {} statistics: return {:.4}, volatility {:.4}, sharpe {:.3}",
            self.stats.name(),
            metrics.total_return,
            metrics.volatility,
            metrics.sharpe_ratio
        );
        Ok(metrics)
    }

    /// Population standard deviation of the negative returns.
    ///
    /// `None` when there are no losers or they have no dispersion, in which
    /// case the caller falls back to total volatility.
    fn downside_deviation(&self, returns: &[f64]) -> Option<f64> {
        let negatives: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        if negatives.is_empty() {
            return None;
        }
        let deviation = self.stats.std_dev(&negatives);
        (deviation > EPSILON).then_some(deviation)
    }

    /// Benchmark figures from the trailing `timeframe_days` of the series, or
    /// the configured market assumptions when no usable series is supplied.
    pub fn benchmark_profile(
        &self,
        benchmark: Option<&ReturnSeries>,
        timeframe_days: u32,
    ) -> BenchmarkProfile {
        let window = benchmark
            .map(|series| series.trailing(timeframe_days as usize))
            .filter(|window| !window.is_empty());

        match window {
            Some(window) => {
                let growth: f64 = window.iter().map(|r| 1.0 + r).product();
                let annualized_return = if growth <= 0.0 {
                    -1.0
                } else {
                    let annualized =
                        growth.powf(TRADING_DAYS_PER_YEAR / window.len() as f64) - 1.0;
                    if annualized.is_finite() {
                        annualized
                    } else {
                        growth - 1.0
                    }
                };
                BenchmarkProfile {
                    annualized_return,
                    volatility: self.stats.std_dev(window) * TRADING_DAYS_PER_YEAR.sqrt(),
                }
            }
            None => BenchmarkProfile {
                annualized_return: self.market.assumed_market_return,
                volatility: self.market.assumed_market_volatility,
            },
        }
    }
}

/// (1 + r)^(365 / age) − 1 with the age floored at one day.
///
/// A total loss or worse annualizes to −1. An overflowing power falls back to
/// the unannualized return.
pub fn annualize_holding_return(total_return: f64, average_age_days: f64) -> f64 {
    let growth = 1.0 + total_return;
    if growth <= 0.0 {
        return -1.0;
    }
    let exponent = CALENDAR_DAYS_PER_YEAR / average_age_days.max(1.0);
    let annualized = growth.powf(exponent) - 1.0;
    if annualized.is_finite() {
        annualized
    } else {
        total_return
    }
}

/// Σ(weight × |return|) × √252.
pub fn volatility_proxy(portfolio: &NormalizedPortfolio) -> f64 {
    portfolio
        .holdings
        .iter()
        .map(|h| h.weight * h.simple_return.abs())
        .sum::<f64>()
        * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Most negative value of cumulative growth relative to its running peak,
/// walking the returns in order.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for r in returns {
        cumulative *= 1.0 + r;
        peak = peak.max(cumulative);
        let drawdown = safe_div(cumulative, peak) - 1.0;
        worst = worst.min(drawdown);
    }
    worst
}

/// Mean of the returns at or below `var`. Falls back to `var` itself when
/// nothing qualifies.
pub fn conditional_var(returns: &[f64], var: f64) -> f64 {
    let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var).collect();
    if tail.is_empty() {
        return var;
    }
    tail.iter().sum::<f64>() / tail.len() as f64
}

/// √(σp² + σb² − 2ρσpσb), clamped at zero.
pub fn tracking_error(portfolio_vol: f64, benchmark_vol: f64, correlation: f64) -> f64 {
    let variance = portfolio_vol.powi(2) + benchmark_vol.powi(2)
        - 2.0 * correlation * portfolio_vol * benchmark_vol;
    variance.max(0.0).sqrt()
}

fn check_finite(m: &PortfolioMetrics) -> Result<(), CalculatorError> {
    for (name, value) in [
        ("total_return", m.total_return),
        ("annualized_return", m.annualized_return),
        ("volatility", m.volatility),
        ("sharpe_ratio", m.sharpe_ratio),
        ("sortino_ratio", m.sortino_ratio),
        ("max_drawdown", m.max_drawdown),
        ("calmar_ratio", m.calmar_ratio),
        ("beta", m.beta),
        ("alpha", m.alpha),
        ("information_ratio", m.information_ratio),
        ("tracking_error", m.tracking_error),
        ("var_95", m.var_95),
        ("cvar_95", m.cvar_95),
    ] {
        ensure_finite(STAGE, name, value)?;
    }
    Ok(())
}
