//! JSON-file backed collaborators: a portfolio store and a static price feed.

use aksjefolio_core::errors::{Error, Result};
use aksjefolio_core::market_data::{MarketDataProvider, PortfolioStore, PricePoint};
use aksjefolio_core::Holding;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// On-disk layout of a portfolio file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PortfolioFile {
    /// Portfolio id -> stored holdings
    pub portfolios: HashMap<String, Vec<Holding>>,
    /// Symbol -> latest price
    pub prices: HashMap<String, Decimal>,
    /// Symbol -> daily closes, oldest first
    pub history: HashMap<String, Vec<PricePoint>>,
}

impl PortfolioFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Repository(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Repository(format!("{}: {}", path.display(), e)))
    }

    /// Splits the file into its store and price feed halves.
    pub fn into_parts(self) -> (FilePortfolioStore, StaticPriceFeed) {
        (
            FilePortfolioStore {
                portfolios: self.portfolios,
            },
            StaticPriceFeed {
                prices: self.prices,
                history: self.history,
            },
        )
    }
}

pub struct FilePortfolioStore {
    portfolios: HashMap<String, Vec<Holding>>,
}

#[async_trait]
impl PortfolioStore for FilePortfolioStore {
    async fn get_holdings(&self, portfolio_id: &str) -> Result<Vec<Holding>> {
        self.portfolios
            .get(portfolio_id)
            .cloned()
            .ok_or_else(|| Error::Repository(format!("Portfolio '{}' not found", portfolio_id)))
    }
}

pub struct StaticPriceFeed {
    prices: HashMap<String, Decimal>,
    history: HashMap<String, Vec<PricePoint>>,
}

#[async_trait]
impl MarketDataProvider for StaticPriceFeed {
    async fn latest_price(&self, symbol: &str) -> Result<Option<Decimal>> {
        Ok(self.prices.get(symbol).copied())
    }

    async fn price_history(&self, symbol: &str, days: u32) -> Result<Vec<PricePoint>> {
        let history = self
            .history
            .get(symbol)
            .ok_or_else(|| Error::MarketData(format!("No price history for '{}'", symbol)))?;
        let skip = history.len().saturating_sub(days as usize + 1);
        Ok(history[skip..].to_vec())
    }
}
