// src/finance/ratios.rs
//! Null-safe arithmetic for derived indicators.
//!
//! A ratio whose denominator is zero or absent is `None` ("not available"),
//! never an infinity or NaN.

/// Round to two decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// `numerator / denominator * scale`, rounded to two decimals.
pub fn safe_ratio(numerator: Option<f64>, denominator: Option<f64>, scale: f64) -> Option<f64> {
    let numerator = numerator?;
    let denominator = denominator.filter(|d| *d != 0.0)?;
    let value = numerator / denominator * scale;
    value.is_finite().then(|| round2(value))
}

/// `numerator / denominator * 100`, rounded to two decimals.
pub fn percent(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    safe_ratio(numerator, denominator, 100.0)
}

pub fn difference(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? - b?)
}
