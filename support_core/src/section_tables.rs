//! Second moments of area used by the drop-below-slab and span deflection checks.
//!
//! Both tables are keyed by angle thickness only. `IXX_2` is the stiffness of
//! the bracket and angle assembly below the slab soffit; `IXX_3` is the angle
//! section spanning between brackets, tabulated for the standard 60 x 90 angle.

use crate::errors::{CalcError, CalcResult};

/// Drop-below-slab assembly stiffness (thickness mm, Ixx mm⁴)
const IXX_2: [(f64, f64); 6] = [
    (3.0, 110_000.0),
    (4.0, 142_000.0),
    (5.0, 174_000.0),
    (6.0, 205_000.0),
    (8.0, 266_000.0),
    (10.0, 325_000.0),
];

/// Angle span stiffness (thickness mm, Ixx mm⁴)
const IXX_3: [(f64, f64); 6] = [
    (3.0, 140_725.0),
    (4.0, 183_293.0),
    (5.0, 223_881.0),
    (6.0, 262_602.0),
    (8.0, 334_874.0),
    (10.0, 400_952.0),
];

fn lookup(table: &[(f64, f64)], name: &str, angle_thickness: f64) -> CalcResult<f64> {
    table
        .iter()
        .find(|(t, _)| (t - angle_thickness).abs() < 1e-9)
        .map(|(_, ixx)| *ixx)
        .ok_or_else(|| {
            CalcError::missing_reference_data(name, format!("angle thickness {} mm", angle_thickness))
        })
}

/// Ixx for the drop-below-slab check
pub fn ixx_drop(angle_thickness: f64) -> CalcResult<f64> {
    lookup(&IXX_2, "Ixx_2", angle_thickness)
}

/// Ixx for the span deflection term of the system check
pub fn ixx_span(angle_thickness: f64) -> CalcResult<f64> {
    lookup(&IXX_3, "Ixx_3", angle_thickness)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_searched_thickness_is_tabulated() {
        for t in [3.0, 4.0, 5.0, 6.0, 8.0, 10.0] {
            assert!(ixx_drop(t).is_ok());
            assert!(ixx_span(t).is_ok());
        }
    }

    #[test]
    fn test_stiffness_increases_with_thickness() {
        assert!(ixx_span(8.0).unwrap() > ixx_span(6.0).unwrap());
        assert!(ixx_drop(4.0).unwrap() > ixx_drop(3.0).unwrap());
    }

    #[test]
    fn test_missing_thickness() {
        let err = ixx_span(7.0).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_REFERENCE_DATA");
        assert!(err.to_string().contains("Ixx_3"));
    }
}
