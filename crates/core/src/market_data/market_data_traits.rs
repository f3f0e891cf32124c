use async_trait::async_trait;
use rust_decimal::Decimal;

use super::PricePoint;
use crate::errors::Result;
use crate::snapshot::Holding;

/// Source of live and historical prices.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Latest known price, or `None` when the provider has no quote.
    async fn latest_price(&self, symbol: &str) -> Result<Option<Decimal>>;

    /// Daily closes for the last `days` days, oldest first.
    async fn price_history(&self, symbol: &str, days: u32) -> Result<Vec<PricePoint>>;
}

/// Read access to stored portfolios.
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    async fn get_holdings(&self, portfolio_id: &str) -> Result<Vec<Holding>>;
}
