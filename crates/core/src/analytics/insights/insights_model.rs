//! Insight models.

use serde::{Deserialize, Serialize};

// =============================================================================
// Severity
// =============================================================================

/// Severity of an insight alert. Ordered Info < Warning < Critical.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Alerts
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    Concentration,
    PoorRiskAdjustedReturn,
    Underperformer,
    StaleData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightAlert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    /// Holdings the alert refers to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<String>,
}

// =============================================================================
// Grades & Profiles
// =============================================================================

/// Letter grade derived from a 0-100 score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[default]
    #[serde(rename = "D")]
    D,
}

/// Lower bound of each grade band, best first.
const GRADE_BANDS: [(f64, Grade); 8] = [
    (90.0, Grade::APlus),
    (85.0, Grade::A),
    (80.0, Grade::AMinus),
    (75.0, Grade::BPlus),
    (70.0, Grade::B),
    (65.0, Grade::BMinus),
    (60.0, Grade::CPlus),
    (55.0, Grade::C),
];

impl Grade {
    pub fn from_score(score: f64) -> Self {
        GRADE_BANDS
            .iter()
            .find(|(floor, _)| score >= *floor)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::D)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl std::fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RiskProfile::Conservative => "conservative",
            RiskProfile::Moderate => "moderate",
            RiskProfile::Aggressive => "aggressive",
        };
        write!(f, "{}", label)
    }
}

// =============================================================================
// Insights
// =============================================================================

/// The four health score components, each in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthComponents {
    pub diversification: f64,
    pub performance: f64,
    pub risk_management: f64,
    pub sector_balance: f64,
}

impl HealthComponents {
    pub fn mean(&self) -> f64 {
        (self.diversification + self.performance + self.risk_management + self.sector_balance)
            / 4.0
    }
}

/// A named share of the portfolio (a holding or a sector).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioShare {
    pub name: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiversificationAnalysis {
    pub holding_count: usize,
    pub sector_count: usize,
    /// 1 / HHI: the number of equal positions with the same concentration
    pub effective_holdings: f64,
    pub largest_position: Option<PortfolioShare>,
    pub largest_sector: Option<PortfolioShare>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiInsights {
    /// In [0, 100]
    pub health_score: f64,
    pub grade: Grade,
    pub components: HealthComponents,
    pub risk_profile: RiskProfile,
    pub diversification_analysis: DiversificationAnalysis,
    pub alerts: Vec<InsightAlert>,
}
