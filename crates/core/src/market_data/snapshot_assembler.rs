use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, warn};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, timeout_at, Instant};

use super::MarketDataProvider;
use crate::config::MarketDataConfig;
use crate::errors::{Error, Result};
use crate::snapshot::{DataWarning, Holding, PortfolioSnapshot, ReturnSeries};

/// Reprices stored holdings with live quotes.
///
/// Price requests run concurrently against a single deadline. A holding
/// whose price cannot be fetched in time keeps its purchase price and is
/// flagged with a `DegradedData` warning; assembly itself never fails.
pub struct SnapshotAssembler {
    provider: Arc<dyn MarketDataProvider>,
    price_timeout: Duration,
}

impl SnapshotAssembler {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: &MarketDataConfig) -> Self {
        Self {
            provider,
            price_timeout: Duration::from_millis(config.price_timeout_ms),
        }
    }

    pub async fn assemble(
        &self,
        holdings: Vec<Holding>,
        as_of: DateTime<Utc>,
    ) -> PortfolioSnapshot {
        let deadline = Instant::now() + self.price_timeout;
        let provider = &self.provider;

        let requests = holdings.iter().map(|holding| async move {
            let outcome = timeout_at(deadline, provider.latest_price(&holding.symbol)).await;
            let fallback_reason = match outcome {
                Ok(Ok(Some(price))) if price >= Decimal::ZERO => {
                    return (holding.repriced(price), None);
                }
                Ok(Ok(Some(price))) => format!("provider returned negative price {}", price),
                Ok(Ok(None)) => "no price available".to_string(),
                Ok(Err(e)) => format!("price request failed: {}", e),
                Err(_) => format!(
                    "price request timed out after {} ms",
                    self.price_timeout.as_millis()
                ),
            };
            warn!(
                "Using purchase price for '{}': {}",
                holding.symbol, fallback_reason
            );
            (
                holding.repriced(holding.purchase_price),
                Some(DataWarning::degraded_price(
                    holding.symbol.clone(),
                    fallback_reason,
                )),
            )
        });

        let (priced, warnings): (Vec<Holding>, Vec<Option<DataWarning>>) =
            join_all(requests).await.into_iter().unzip();
        let warnings: Vec<DataWarning> = warnings.into_iter().flatten().collect();

        debug!(
            "Assembled snapshot of {} holdings ({} degraded)",
            priced.len(),
            warnings.len()
        );
        PortfolioSnapshot::with_warnings(priced, as_of, warnings)
    }

    /// Daily returns of `symbol` over the last `days` days.
    ///
    /// Bounded by the same price timeout as `assemble`; an elapsed request
    /// is reported as `Error::MarketData`.
    pub async fn benchmark_series(&self, symbol: &str, days: u32) -> Result<ReturnSeries> {
        let history = timeout(self.price_timeout, self.provider.price_history(symbol, days))
            .await
            .map_err(|_| {
                Error::MarketData(format!(
                    "price history for '{}' timed out after {} ms",
                    symbol,
                    self.price_timeout.as_millis()
                ))
            })??;
        let closes: Vec<f64> = history
            .iter()
            .filter_map(|point| point.close.to_f64())
            .collect();
        Ok(ReturnSeries::from_prices(Some(symbol.to_string()), &closes))
    }
}
