//! Lateral deflection of a bracket that drops below the slab soffit.
//!
//! Only the length below the soffit, P, cantilevers from the slab. With the
//! assembly stiffness `Ixx_2` for the angle thickness:
//!
//! ```text
//!   L_deflection = V_sls·P³ / (3·E·Ixx_2)
//!   D_heel_2     = L1·sin(atan(1.5·L_deflection / P))
//! ```
//!
//! A bracket that stays within the slab (P ≤ 0) passes with zero deflection.

use serde::{Deserialize, Serialize};

use super::model::MathematicalModel;
use super::trace::VerificationTrace;
use crate::materials::MaterialProperties;
use crate::section_tables::ixx_drop;
use crate::units::{kn_to_n, round12};

const STAGE: &str = "dropping_below_slab";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropBelowSlabResults {
    /// Effective drop below the soffit P (mm)
    pub p_eff: f64,
    /// Tabulated Ixx_2 (mm⁴)
    pub second_moment: f64,
    /// Bracket deflection at the soffit level (mm)
    pub l_deflection: f64,
    /// Resulting deflection at the load point (mm)
    pub d_heel_2: f64,
    /// l_deflection + d_heel_2 (mm)
    pub total_deflection: f64,
    pub limit: f64,
    /// total / limit (%)
    pub utilisation: f64,
    pub passes: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl DropBelowSlabResults {
    fn within_slab(limit: f64) -> Self {
        DropBelowSlabResults {
            p_eff: 0.0,
            second_moment: 0.0,
            l_deflection: 0.0,
            d_heel_2: 0.0,
            total_deflection: 0.0,
            limit: round12(limit),
            utilisation: 0.0,
            passes: true,
            notes: Vec::new(),
        }
    }
}

pub fn calculate(
    model: &MathematicalModel,
    drop_below_slab: f64,
    steel: &MaterialProperties,
    limit: f64,
    trace: &mut dyn VerificationTrace,
) -> DropBelowSlabResults {
    let p = drop_below_slab;
    if p <= 0.0 {
        trace.record(STAGE, "p_eff", 0.0);
        return DropBelowSlabResults::within_slab(limit);
    }

    let ixx = match ixx_drop(model.angle_thickness) {
        Ok(ixx) => ixx,
        Err(e) => {
            let reason = e.to_string();
            trace.note(STAGE, &reason);
            return DropBelowSlabResults {
                p_eff: round12(p),
                passes: false,
                notes: vec![reason],
                ..DropBelowSlabResults::within_slab(limit)
            };
        }
    };

    let l_deflection = kn_to_n(model.sls_shear_force) * p.powi(3) / (3.0 * steel.youngs_modulus * ixx);
    let d_heel_2 = model.lever_arm * (1.5 * l_deflection / p).atan().sin();
    let total = l_deflection + d_heel_2;

    trace.record(STAGE, "p_eff", p);
    trace.record(STAGE, "l_deflection", l_deflection);
    trace.record(STAGE, "d_heel_2", d_heel_2);

    let total = round12(total);
    DropBelowSlabResults {
        p_eff: round12(p),
        second_moment: round12(ixx),
        l_deflection: round12(l_deflection),
        d_heel_2: round12(d_heel_2),
        total_deflection: total,
        limit: round12(limit),
        utilisation: round12(total / limit * 100.0),
        passes: total <= limit,
        notes: Vec::new(),
    }
}
