use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    MarketCrash,
    SectorRotation,
    RateShock,
    InflationSurge,
}

impl ScenarioKind {
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioKind::MarketCrash => "Market crash",
            ScenarioKind::SectorRotation => "Sector rotation",
            ScenarioKind::RateShock => "Interest rate shock",
            ScenarioKind::InflationSurge => "Inflation surge",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScenarioKind::MarketCrash => {
                "Broad market decline, amplified for high-beta holdings"
            }
            ScenarioKind::SectorRotation => {
                "Capital rotates out of growth sectors into defensive ones"
            }
            ScenarioKind::RateShock => {
                "A sudden rise in policy rates reprices rate-sensitive sectors"
            }
            ScenarioKind::InflationSurge => {
                "Rising input costs squeeze margins in consumer and industrial companies"
            }
        }
    }

    /// Lower-case fragments matched against sector names.
    pub fn sector_keywords(&self) -> &'static [&'static str] {
        match self {
            ScenarioKind::MarketCrash => &[],
            ScenarioKind::SectorRotation => &["technology"],
            ScenarioKind::RateShock => &["real estate", "utilities", "financials"],
            ScenarioKind::InflationSurge => &["consumer", "industrials"],
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Effect of a stress scenario on one holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingStress {
    pub symbol: String,
    pub market_value: f64,
    pub stress_factor: f64,
    pub value_change: f64,
    pub stressed_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketCrashScenario {
    pub market_move: f64,
    pub beta_amplifier: f64,
    /// Value-weighted mean stress factor
    pub total_portfolio_impact: f64,
    pub holdings: Vec<HoldingStress>,
    pub stressed_portfolio_value: f64,
    /// Months at the assumed market return to recover the loss
    pub estimated_recovery_months: u32,
}

/// A scenario described in words only. `impact` stays `None` until a numeric
/// model exists for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitativeScenario {
    pub kind: ScenarioKind,
    pub label: String,
    pub description: String,
    pub impact: Option<f64>,
    pub most_exposed_sectors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    pub market_crash: MarketCrashScenario,
    pub qualitative: Vec<QualitativeScenario>,
}
