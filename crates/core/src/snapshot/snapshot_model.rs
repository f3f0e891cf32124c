use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

// =============================================================================
// Holding
// =============================================================================

fn default_beta() -> f64 {
    1.0
}

/// A position as supplied by the portfolio store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker, unique within a snapshot (e.g. "EQNR")
    pub symbol: String,
    pub shares: Decimal,
    pub current_price: Decimal,
    pub purchase_price: Decimal,
    /// Free-text sector label
    #[serde(default)]
    pub sector: String,
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub dividend_yield: Decimal,
    #[serde(default = "default_beta")]
    pub beta: f64,
}

impl Holding {
    pub fn new(
        symbol: impl Into<String>,
        shares: Decimal,
        current_price: Decimal,
        purchase_price: Decimal,
        sector: impl Into<String>,
        purchase_date: NaiveDate,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            shares,
            current_price,
            purchase_price,
            sector: sector.into(),
            purchase_date,
            dividend_yield: Decimal::ZERO,
            beta: default_beta(),
        }
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_dividend_yield(mut self, dividend_yield: Decimal) -> Self {
        self.dividend_yield = dividend_yield;
        self
    }

    /// Returns a copy priced at `price`.
    pub fn repriced(&self, price: Decimal) -> Self {
        Self {
            current_price: price,
            ..self.clone()
        }
    }
}

// =============================================================================
// Data Warning
// =============================================================================

/// Kind of non-fatal problem recorded while building or analyzing a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningKind {
    /// Live price unavailable; the holding is valued at its purchase price.
    DegradedData,
    /// Holding failed validation and was left out of the analysis.
    ExcludedHolding,
    /// An analytics stage failed and its neutral default was used.
    StageFallback,
}

/// A non-fatal warning attached to a snapshot or an analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataWarning {
    pub kind: WarningKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub symbol: Option<String>,
    pub message: String,
}

impl DataWarning {
    pub fn degraded_price(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::DegradedData,
            symbol: Some(symbol.into()),
            message: reason.into(),
        }
    }

    pub fn excluded(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ExcludedHolding,
            symbol: Some(symbol.into()),
            message: reason.into(),
        }
    }

    pub fn stage_fallback(stage: &str, reason: impl std::fmt::Display) -> Self {
        Self {
            kind: WarningKind::StageFallback,
            symbol: None,
            message: format!("{} stage fell back to defaults: {}", stage, reason),
        }
    }
}

impl std::fmt::Display for DataWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "{:?} [{}]: {}", self.kind, symbol, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

// =============================================================================
// Portfolio Snapshot
// =============================================================================

/// Point-in-time view of a portfolio. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    holdings: Vec<Holding>,
    as_of: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<DataWarning>,
}

impl PortfolioSnapshot {
    pub fn new(holdings: Vec<Holding>, as_of: DateTime<Utc>) -> Self {
        Self {
            holdings,
            as_of,
            warnings: Vec::new(),
        }
    }

    /// Builds a snapshot carrying warnings recorded during assembly.
    pub fn with_warnings(
        holdings: Vec<Holding>,
        as_of: DateTime<Utc>,
        warnings: Vec<DataWarning>,
    ) -> Self {
        Self {
            holdings,
            as_of,
            warnings,
        }
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    pub fn warnings(&self) -> &[DataWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    /// Symbols whose price fell back to the purchase price.
    pub fn degraded_symbols(&self) -> impl Iterator<Item = &str> {
        self.warnings
            .iter()
            .filter(|w| w.kind == WarningKind::DegradedData)
            .filter_map(|w| w.symbol.as_deref())
    }

    /// Stable hex-encoded SHA-256 over the snapshot's analytical content.
    ///
    /// Holding order is significant because max drawdown depends on it.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.as_of.timestamp().to_le_bytes());
        for holding in &self.holdings {
            hasher.update(holding.symbol.as_bytes());
            hasher.update([0u8]);
            hasher.update(holding.shares.normalize().to_string().as_bytes());
            hasher.update([0u8]);
            hasher.update(holding.current_price.normalize().to_string().as_bytes());
            hasher.update([0u8]);
            hasher.update(holding.purchase_price.normalize().to_string().as_bytes());
            hasher.update([0u8]);
            hasher.update(holding.sector.as_bytes());
            hasher.update([0u8]);
            hasher.update(holding.purchase_date.to_string().as_bytes());
            hasher.update([0u8]);
            hasher.update(holding.dividend_yield.normalize().to_string().as_bytes());
            hasher.update([0u8]);
            hasher.update(holding.beta.to_le_bytes());
        }
        for symbol in self.degraded_symbols() {
            hasher.update(b"degraded:");
            hasher.update(symbol.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

// =============================================================================
// Return Series
// =============================================================================

/// Ordered periodic (daily) returns, used for the benchmark.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
    pub returns: Vec<f64>,
}

impl ReturnSeries {
    pub fn new(label: Option<String>, returns: Vec<f64>) -> Self {
        Self { label, returns }
    }

    /// Builds simple period returns from consecutive prices. Non-positive
    /// previous prices are skipped.
    pub fn from_prices(label: Option<String>, prices: &[f64]) -> Self {
        let returns = prices
            .windows(2)
            .filter(|w| w[0] > 0.0 && w[1].is_finite())
            .map(|w| (w[1] - w[0]) / w[0])
            .collect();
        Self { label, returns }
    }

    /// The last `periods` observations.
    pub fn trailing(&self, periods: usize) -> &[f64] {
        let start = self.returns.len().saturating_sub(periods);
        &self.returns[start..]
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Short content fingerprint used in cache keys.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        if let Some(label) = &self.label {
            hasher.update(label.as_bytes());
        }
        for r in &self.returns {
            hasher.update(r.to_le_bytes());
        }
        hex::encode(&hasher.finalize()[..8])
    }
}

// =============================================================================
// Normalized Portfolio
// =============================================================================

/// A validated holding with every derived field the stages need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedHolding {
    pub symbol: String,
    pub sector: String,
    pub shares: f64,
    pub current_price: f64,
    pub purchase_price: f64,
    pub dividend_yield: f64,
    pub beta: f64,
    pub market_value: f64,
    pub weight: f64,
    pub simple_return: f64,
    pub holding_age_days: i64,
    /// True when the valuation uses the purchase price instead of a live quote
    pub price_degraded: bool,
}

/// Output of the normalizer, shared read-only by every analytics stage.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPortfolio {
    pub holdings: Vec<NormalizedHolding>,
    pub as_of: DateTime<Utc>,
    pub total_market_value: f64,
    pub warnings: Vec<DataWarning>,
}

impl NormalizedPortfolio {
    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn returns(&self) -> Vec<f64> {
        self.holdings.iter().map(|h| h.simple_return).collect()
    }

    /// Σ(weight × return).
    pub fn weighted_return(&self) -> f64 {
        self.holdings
            .iter()
            .map(|h| h.weight * h.simple_return)
            .sum()
    }

    pub fn portfolio_beta(&self) -> f64 {
        self.holdings.iter().map(|h| h.weight * h.beta).sum()
    }

    pub fn max_weight(&self) -> f64 {
        self.holdings.iter().map(|h| h.weight).fold(0.0, f64::max)
    }

    /// The holding with the largest weight. Ties resolve to the earliest.
    pub fn largest_holding(&self) -> Option<&NormalizedHolding> {
        self.holdings.iter().fold(None, |best, h| match best {
            Some(b) if b.weight >= h.weight => Some(b),
            _ => Some(h),
        })
    }

    /// Holdings grouped by sector, keeping snapshot order within each sector.
    pub fn by_sector(&self) -> BTreeMap<&str, Vec<&NormalizedHolding>> {
        let mut groups: BTreeMap<&str, Vec<&NormalizedHolding>> = BTreeMap::new();
        for holding in &self.holdings {
            groups.entry(holding.sector.as_str()).or_default().push(holding);
        }
        groups
    }

    /// Total weight per sector.
    pub fn sector_weights(&self) -> BTreeMap<String, f64> {
        let mut weights = BTreeMap::new();
        for holding in &self.holdings {
            *weights.entry(holding.sector.clone()).or_insert(0.0) += holding.weight;
        }
        weights
    }

    /// Unweighted mean holding age in days.
    pub fn average_holding_age_days(&self) -> f64 {
        if self.holdings.is_empty() {
            return 0.0;
        }
        self.holdings
            .iter()
            .map(|h| h.holding_age_days as f64)
            .sum::<f64>()
            / self.holdings.len() as f64
    }

    pub fn has_degraded_prices(&self) -> bool {
        self.holdings.iter().any(|h| h.price_degraded)
    }
}
