use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decomposition of portfolio return into selection and allocation effects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceAttribution {
    /// Weighted return minus the equal-weight return of the same holdings
    pub security_selection: f64,
    /// Variance of sector weight totals; higher means larger sector bets
    pub asset_allocation: f64,
    pub interaction: f64,
    pub total_excess_return: f64,
    pub sector_contributions: BTreeMap<String, f64>,
    pub stock_contributions: BTreeMap<String, f64>,
}
