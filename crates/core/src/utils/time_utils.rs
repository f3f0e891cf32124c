use chrono::{DateTime, NaiveDate, Utc};

/// Whole calendar days from `start` to the valuation instant's UTC date.
///
/// Dates in the future clamp to zero so a mistyped purchase date can never
/// produce a negative holding age.
pub fn days_since(start: NaiveDate, as_of: DateTime<Utc>) -> i64 {
    (as_of.date_naive() - start).num_days().max(0)
}
