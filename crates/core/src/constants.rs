/// Trading days used to annualize volatility
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Calendar days used to annualize holding-period returns
pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;

/// Default analysis window in trading days
pub const DEFAULT_TIMEFRAME_DAYS: u32 = 252;

/// Floor applied to every ratio denominator
pub const EPSILON: f64 = 1e-9;

/// Tolerance for the weight-sum invariant
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Percentile used for historical VaR / CVaR
pub const VAR_PERCENTILE: f64 = 5.0;
