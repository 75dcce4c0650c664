//! # Units and Rounding
//!
//! The engine works in a single consistent set of SI units:
//! - Length: millimetres (mm)
//! - Force: kilonewtons (kN), newtons (N) inside stress calculations
//! - Distributed load: kilonewtons per metre (kN/m)
//! - Moment: kilonewton-metres (kNm), newton-millimetres (Nmm) inside stress calculations
//! - Stress: N/mm²
//! - Mass: kilograms (kg), kilograms per metre (kg/m)
//!
//! Plain `f64` fields carry the unit in their documentation rather than in a
//! wrapper type, so JSON stays a flat set of numbers.
//!
//! ## Rounding contract
//!
//! Every value a stage *returns* is rounded to exactly 12 decimal places with
//! [`round12`]. Intermediates that feed the next line of the same stage are
//! kept at full precision.
//!
//! ```rust
//! use support_core::units::{round12, kn_to_n};
//!
//! assert_eq!(round12(14.0 * 1.35), 18.9);
//! assert_eq!(kn_to_n(9.45), 9450.0);
//! ```

/// Number of decimal places every returned quantity is rounded to
pub const RESULT_DECIMALS: i32 = 12;

/// Largest magnitude that survives scaling by 1e12 without losing the
/// fractional part (2^53 / 1e12).
const ROUNDING_MAGNITUDE_LIMIT: f64 = 9_007.199_254_740_992;

// ============================================================================
// Rounding
// ============================================================================

/// Round to 12 decimal places, half away from zero.
///
/// Values too large for the scaled product to hold a fractional part are
/// already at or beyond 12-decimal resolution and are returned unchanged.
/// Non-finite values pass through.
pub fn round12(value: f64) -> f64 {
    round_to(value, RESULT_DECIMALS)
}

/// Round to an arbitrary number of decimal places, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    if decimals == RESULT_DECIMALS && value.abs() >= ROUNDING_MAGNITUDE_LIMIT {
        return value;
    }
    let scale = 10f64.powi(decimals);
    let rounded = (value * scale).round() / scale;
    // Avoid "-0" in serialized output
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// True if `value` has no more than 12 decimal places (i.e. rounding is a no-op).
pub fn has_at_most_12_decimals(value: f64) -> bool {
    round12(value) == value
}

/// Round down to a multiple of `step` (e.g. 5 mm manufacturing increments).
pub fn floor_to_step(value: f64, step: f64) -> f64 {
    (value / step).floor() * step
}

/// Round up to a multiple of `step`.
pub fn ceil_to_step(value: f64, step: f64) -> f64 {
    (value / step).ceil() * step
}

// ============================================================================
// Force and Moment Conversions
// ============================================================================

/// kN → N
pub fn kn_to_n(kn: f64) -> f64 {
    kn * 1000.0
}

/// N → kN
pub fn n_to_kn(n: f64) -> f64 {
    n / 1000.0
}

/// kNm → Nmm
pub fn knm_to_nmm(knm: f64) -> f64 {
    knm * 1.0e6
}

/// Nmm → kNm
pub fn nmm_to_knm(nmm: f64) -> f64 {
    nmm / 1.0e6
}

/// Force (kN) times lever arm (mm) → moment (kNm)
pub fn moment_knm(force_kn: f64, lever_mm: f64) -> f64 {
    force_kn * lever_mm / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round12_examples() {
        assert_eq!(round12(18.900000000000002), 18.9);
        assert_eq!(round12(34.166666666666664), 34.166666666667);
        assert_eq!(round12(-0.0000000000001), 0.0);
    }

    #[test]
    fn test_round12_large_values_unchanged() {
        let big = 2_401_875.123_456_789;
        assert_eq!(round12(big), big);
    }

    #[test]
    fn test_round12_non_finite() {
        assert!(round12(f64::NAN).is_nan());
        assert_eq!(round12(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_step_rounding() {
        assert_eq!(floor_to_step(204.0, 5.0), 200.0);
        assert_eq!(ceil_to_step(88.3, 5.0), 90.0);
        assert_eq!(ceil_to_step(90.0, 5.0), 90.0);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(kn_to_n(1.5), 1500.0);
        assert_eq!(n_to_kn(1500.0), 1.5);
        assert_eq!(knm_to_nmm(2.0), 2.0e6);
        assert_eq!(nmm_to_knm(2.0e6), 2.0);
        assert!((moment_knm(9.45, 220.0) - 2.079).abs() < 1e-12);
    }
}
