//! Snapshot normalization.
//!
//! Converts raw store holdings into `NormalizedHolding`s. Invalid holdings are
//! dropped with a warning instead of failing the whole snapshot; only an empty
//! result is an error.

use log::{debug, warn};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashSet;

use super::{DataWarning, Holding, NormalizedHolding, NormalizedPortfolio, PortfolioSnapshot};
use crate::errors::{Error, Result, ValidationError};
use crate::utils::time_utils::days_since;

/// Sector label for holdings that arrive without one.
pub const UNKNOWN_SECTOR: &str = "Unknown";

/// Validates holdings and derives weight, simple return and holding age.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotNormalizer;

impl SnapshotNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalizes a snapshot.
    ///
    /// Returns `Error::EmptyPortfolio` when no holding survives validation.
    pub fn normalize(&self, snapshot: &PortfolioSnapshot) -> Result<NormalizedPortfolio> {
        let degraded: HashSet<&str> = snapshot.degraded_symbols().collect();
        let mut warnings: Vec<DataWarning> = snapshot.warnings().to_vec();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut valid: Vec<NormalizedHolding> = Vec::with_capacity(snapshot.len());

        for holding in snapshot.holdings() {
            let symbol = holding.symbol.trim();
            // Only a valid holding claims its symbol.
            let outcome = if seen.contains(symbol) {
                Err(ValidationError::DuplicateSymbol(symbol.to_string()))
            } else {
                self.validate(holding, snapshot)
            };

            match outcome {
                Ok(mut normalized) => {
                    seen.insert(symbol);
                    normalized.price_degraded = degraded.contains(symbol);
                    valid.push(normalized);
                }
                Err(e) => {
                    warn!("Excluding holding '{}' from analysis: {}", symbol, e);
                    warnings.push(DataWarning::excluded(symbol, e.to_string()));
                }
            }
        }

        if valid.is_empty() {
            return Err(Error::EmptyPortfolio);
        }

        let total_market_value: f64 = valid.iter().map(|h| h.market_value).sum();
        let count = valid.len() as f64;
        for holding in valid.iter_mut() {
            holding.weight = if total_market_value > 0.0 {
                holding.market_value / total_market_value
            } else {
                // Nothing is worth anything; equal weights keep Σ weight = 1.
                1.0 / count
            };
        }

        debug!(
            "Normalized {} of {} holdings (total value {:.2})",
            valid.len(),
            snapshot.len(),
            total_market_value
        );

        Ok(NormalizedPortfolio {
            holdings: valid,
            as_of: snapshot.as_of(),
            total_market_value,
            warnings,
        })
    }

    /// Validates one holding and computes everything except its weight.
    fn validate(
        &self,
        holding: &Holding,
        snapshot: &PortfolioSnapshot,
    ) -> std::result::Result<NormalizedHolding, ValidationError> {
        let symbol = holding.symbol.trim();
        if symbol.is_empty() {
            return Err(ValidationError::MissingField("symbol".to_string()));
        }

        if holding.shares <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveShares {
                symbol: symbol.to_string(),
            });
        }
        for (field, value) in [
            ("current_price", holding.current_price),
            ("purchase_price", holding.purchase_price),
            ("dividend_yield", holding.dividend_yield),
        ] {
            if value < Decimal::ZERO {
                return Err(ValidationError::NegativeValue {
                    symbol: symbol.to_string(),
                    field,
                });
            }
        }
        if !holding.beta.is_finite() {
            return Err(ValidationError::Unrepresentable {
                symbol: symbol.to_string(),
                field: "beta",
            });
        }

        let to_f64 = |field: &'static str, value: Decimal| {
            value.to_f64().ok_or_else(|| ValidationError::Unrepresentable {
                symbol: symbol.to_string(),
                field,
            })
        };
        let shares = to_f64("shares", holding.shares)?;
        let current_price = to_f64("current_price", holding.current_price)?;
        let purchase_price = to_f64("purchase_price", holding.purchase_price)?;
        let dividend_yield = to_f64("dividend_yield", holding.dividend_yield)?;

        let market_value = shares * current_price;
        if !market_value.is_finite() {
            return Err(ValidationError::Unrepresentable {
                symbol: symbol.to_string(),
                field: "market_value",
            });
        }

        let simple_return = if purchase_price > 0.0 {
            (current_price - purchase_price) / purchase_price
        } else {
            0.0
        };

        let sector = holding.sector.trim();
        let sector = if sector.is_empty() {
            UNKNOWN_SECTOR.to_string()
        } else {
            sector.to_string()
        };

        Ok(NormalizedHolding {
            symbol: symbol.to_string(),
            sector,
            shares,
            current_price,
            purchase_price,
            dividend_yield,
            beta: holding.beta,
            market_value,
            weight: 0.0,
            simple_return,
            holding_age_days: days_since(holding.purchase_date, snapshot.as_of()),
            price_degraded: false,
        })
    }
}
