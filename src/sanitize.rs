//! Data Sanitization
//!
//! Numeric hygiene for scoring inputs and outputs: unit-interval clamping,
//! fixed-decimal rounding, and zero-safe percentages. Upstream validation is
//! an external concern, so nothing here trusts its input.

/// Clamp a value into [0, 1]. NaN becomes 0.0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Clamp a value into [0, 100]. NaN becomes 0.0.
pub fn clamp_percentage(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Round to a fixed number of decimal places.
pub fn round_dp(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// `100 * part / whole` rounded to one decimal, 0.0 when `whole` is zero.
pub fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_dp(clamp_percentage(100.0 * part as f64 / whole as f64), 1)
}
