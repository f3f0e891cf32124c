//! Guarded arithmetic shared by the analytics stages.

use crate::constants::EPSILON;
use crate::errors::CalculatorError;

/// Divides, returning 0 when the denominator is within `EPSILON` of zero.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() <= EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}

/// Divides by `max(denominator, EPSILON)`.
///
/// Used for ratios whose denominator is a non-negative dispersion measure.
pub fn floored_div(numerator: f64, denominator: f64) -> f64 {
    numerator / denominator.max(EPSILON)
}

/// Clamps a component score into [0, 100].
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Fails the stage when a computed figure is NaN or infinite.
pub fn ensure_finite(
    stage: &'static str,
    metric: &str,
    value: f64,
) -> Result<f64, CalculatorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalculatorError::non_finite(stage, metric))
    }
}
