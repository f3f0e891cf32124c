//! Core error types for the Aksjefolio analytics engine.
//!
//! Collaborator errors (storage, market data) are carried in string form so this
//! type stays independent of whichever backend implements the traits.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the analytics engine.
#[derive(Error, Debug)]
pub enum Error {
    /// No valid holdings survived normalization.
    #[error("Portfolio has no valid holdings to analyze")]
    EmptyPortfolio,

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Analytics calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Market data operation failed: {0}")]
    MarketData(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Failed to load configuration: {0}")]
    ConfigIO(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),
}

/// Errors raised inside a single analytics stage.
///
/// These never escape `AnalysisService::analyze`: the service logs them and
/// substitutes the stage's neutral default.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Non-finite value for {metric} in {stage}")]
    NonFinite { stage: &'static str, metric: String },
}

impl CalculatorError {
    pub fn non_finite(stage: &'static str, metric: impl Into<String>) -> Self {
        Self::NonFinite {
            stage,
            metric: metric.into(),
        }
    }
}

/// Validation errors for holdings and user input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Holding '{symbol}' has non-positive shares")]
    NonPositiveShares { symbol: String },

    #[error("Holding '{symbol}' has negative {field}")]
    NegativeValue { symbol: String, field: &'static str },

    #[error("Holding '{symbol}' has a value that cannot be represented: {field}")]
    Unrepresentable { symbol: String, field: &'static str },

    #[error("Duplicate symbol '{0}' in snapshot")]
    DuplicateSymbol(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}
