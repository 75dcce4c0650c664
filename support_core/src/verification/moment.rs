//! Moment resistance of the angle horizontal leg (ULS).
//!
//! `M_ed = V_ed·L1/1000` against `Mc_rd = (Z/1e6)·(f_y/γ_M0)`.

use serde::{Deserialize, Serialize};

use super::model::MathematicalModel;
use super::trace::VerificationTrace;
use crate::materials::{MaterialProperties, SafetyFactors};
use crate::units::{moment_knm, round12};

const STAGE: &str = "moment";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentResults {
    /// Applied moment M_ed (kNm)
    pub applied_moment: f64,
    /// Moment resistance Mc_rd (kNm)
    pub moment_resistance: f64,
    /// M_ed / Mc_rd (%)
    pub utilisation: f64,
    pub passes: bool,
}

pub fn calculate(
    model: &MathematicalModel,
    steel: &MaterialProperties,
    factors: &SafetyFactors,
    trace: &mut dyn VerificationTrace,
) -> MomentResults {
    let applied = moment_knm(model.shear_force, model.lever_arm);
    let resistance = (model.section_modulus / 1.0e6) * (steel.yield_strength / factors.gamma_m0);
    let utilisation = applied / resistance * 100.0;

    trace.record(STAGE, "applied_moment", applied);
    trace.record(STAGE, "moment_resistance", resistance);
    trace.record(STAGE, "utilisation", utilisation);

    let utilisation = round12(utilisation);
    MomentResults {
        applied_moment: round12(applied),
        moment_resistance: round12(resistance),
        utilisation,
        passes: utilisation <= 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::test_support::fixture_model;
    use crate::verification::trace::NoTrace;

    #[test]
    fn test_fixture_moment() {
        let model = fixture_model();
        let r = calculate(
            &model,
            &MaterialProperties::default(),
            &SafetyFactors::default(),
            &mut NoTrace,
        );
        // 9.45 × 54.1667 / 1000
        assert!((r.applied_moment - 0.511875).abs() < 1e-9);
        // 3000e-6 × 210 / 1.1
        assert!((r.moment_resistance - 0.572727272727).abs() < 1e-9);
        assert!((r.utilisation - 89.375).abs() < 1e-6);
        assert!(r.passes);
    }

    #[test]
    fn test_overloaded_angle_fails() {
        let mut model = fixture_model();
        model.shear_force *= 2.0;
        let r = calculate(
            &model,
            &MaterialProperties::default(),
            &SafetyFactors::default(),
            &mut NoTrace,
        );
        assert!(r.utilisation > 100.0);
        assert!(!r.passes);
    }
}
