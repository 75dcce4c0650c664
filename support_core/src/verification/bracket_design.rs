//! Bracket plate classification and moment capacity.
//!
//! The bracket web is Class 1 when `H/t_b ≤ 56ε`, in which case the plastic
//! modulus `t_b·H²/4` is used; otherwise the elastic modulus `t_b·H²/6`. The
//! capacity `W·f_y/γ_M0` is checked against the moment at the slab face.

use serde::{Deserialize, Serialize};

use super::combined::fixing_moment;
use super::model::MathematicalModel;
use super::trace::VerificationTrace;
use crate::materials::{MaterialProperties, SafetyFactors};
use crate::units::{nmm_to_knm, round12};

const STAGE: &str = "bracket_design";

/// Class 1 web slenderness limit in multiples of ε
pub const CLASS_1_LIMIT_FACTOR: f64 = 56.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketDesignResults {
    pub bracket_height: f64,
    pub bracket_thickness: f64,
    /// H / t_b
    pub slenderness: f64,
    /// 56ε
    pub class_1_limit: f64,
    pub is_class_1: bool,
    /// W (mm³)
    pub section_modulus: f64,
    /// M_rd (kNm)
    pub moment_resistance: f64,
    /// M_fix (kNm)
    pub applied_moment: f64,
    /// (%)
    pub utilisation: f64,
    pub passes: bool,
}

pub fn calculate(
    model: &MathematicalModel,
    bracket_height: f64,
    bracket_thickness: f64,
    steel: &MaterialProperties,
    factors: &SafetyFactors,
    trace: &mut dyn VerificationTrace,
) -> BracketDesignResults {
    let slenderness = bracket_height / bracket_thickness;
    let class_1_limit = CLASS_1_LIMIT_FACTOR * steel.epsilon();
    let is_class_1 = slenderness <= class_1_limit;
    let divisor = if is_class_1 { 4.0 } else { 6.0 };
    let modulus = bracket_thickness * bracket_height.powi(2) / divisor;
    let resistance = nmm_to_knm(modulus * steel.yield_strength / factors.gamma_m0);
    let applied = fixing_moment(model);
    let utilisation = applied / resistance * 100.0;

    trace.record(STAGE, "slenderness", slenderness);
    trace.record(STAGE, "section_modulus", modulus);
    trace.record(STAGE, "moment_resistance", resistance);

    let resistance = round12(resistance);
    let applied = round12(applied);
    BracketDesignResults {
        bracket_height: round12(bracket_height),
        bracket_thickness: round12(bracket_thickness),
        slenderness: round12(slenderness),
        class_1_limit: round12(class_1_limit),
        is_class_1,
        section_modulus: round12(modulus),
        moment_resistance: resistance,
        applied_moment: applied,
        utilisation: round12(utilisation),
        passes: resistance >= applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::test_support::fixture_model;
    use crate::verification::trace::NoTrace;

    fn run(height: f64, thickness: f64) -> BracketDesignResults {
        calculate(
            &fixture_model(),
            height,
            thickness,
            &MaterialProperties::default(),
            &SafetyFactors::default(),
            &mut NoTrace,
        )
    }

    #[test]
    fn test_fixture_bracket() {
        let r = run(175.0, 4.0);
        assert!(r.is_class_1);
        assert_eq!(r.section_modulus, 30625.0);
        assert!((r.moment_resistance - 5.846590909091).abs() < 1e-9);
        assert!((r.applied_moment - 2.401875).abs() < 1e-12);
        assert!(r.passes);
    }

    #[test]
    fn test_slender_bracket_uses_elastic_modulus() {
        // 250 / 3 = 83 > 57.8
        let r = run(250.0, 3.0);
        assert!(!r.is_class_1);
        assert_eq!(r.section_modulus, 31250.0);
    }

    #[test]
    fn test_short_bracket_fails() {
        let r = run(60.0, 3.0);
        assert!(!r.passes);
    }
}
