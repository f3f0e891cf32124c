use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Factor names reported in `RiskDecomposition::factor_exposures`.
pub const FACTOR_GROWTH: &str = "growth";
pub const FACTOR_VALUE: &str = "value";
pub const FACTOR_MOMENTUM: &str = "momentum";
pub const FACTOR_QUALITY: &str = "quality";

/// Explainable breakdown of portfolio risk.
///
/// The default (all zeros, empty maps) is the neutral value used when the
/// stage fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskDecomposition {
    pub systematic_risk: f64,
    pub idiosyncratic_risk: f64,
    /// Sector -> weight × dispersion of the sector's returns
    pub sector_risk: BTreeMap<String, f64>,
    /// Factor -> share of portfolio weight exposed to it
    pub factor_exposures: BTreeMap<String, f64>,
    /// Sector-level Herfindahl index
    pub correlation_risk: f64,
    /// Holding-level Herfindahl index, in [1/n, 1]
    pub concentration_risk: f64,
}
