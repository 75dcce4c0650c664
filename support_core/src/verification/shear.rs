//! Shear resistance of the angle (ULS).

use serde::{Deserialize, Serialize};

use super::model::MathematicalModel;
use super::trace::VerificationTrace;
use crate::materials::{MaterialProperties, SafetyFactors};
use crate::units::round12;

const STAGE: &str = "shear";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShearResults {
    /// Applied shear V_ed (kN)
    pub shear_force: f64,
    /// Shear area A_v = c·T (mm²)
    pub shear_area: f64,
    /// Plastic shear resistance VR_d (kN)
    pub shear_resistance: f64,
    /// V_ed / VR_d (%)
    pub utilisation: f64,
    pub passes: bool,
}

/// `VR_d = A_v·(f_y/√3)/γ_M0`, passes iff `V_ed ≤ VR_d`.
pub fn calculate(
    model: &MathematicalModel,
    steel: &MaterialProperties,
    factors: &SafetyFactors,
    trace: &mut dyn VerificationTrace,
) -> ShearResults {
    let shear_area = model.bracket_centres * model.angle_thickness;
    let resistance = shear_area * (steel.yield_strength / 3f64.sqrt()) / factors.gamma_m0 / 1000.0;
    let utilisation = model.shear_force / resistance * 100.0;

    trace.record(STAGE, "shear_area", shear_area);
    trace.record(STAGE, "shear_resistance", resistance);
    trace.record(STAGE, "utilisation", utilisation);

    ShearResults {
        shear_force: round12(model.shear_force),
        shear_area: round12(shear_area),
        shear_resistance: round12(resistance),
        utilisation: round12(utilisation),
        passes: model.shear_force <= resistance,
    }
}
