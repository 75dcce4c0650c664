//! Total system deflection (SLS).
//!
//! Angle deflection at the load point, plus the drop-below-slab contribution,
//! plus the angle spanning between brackets as a simply supported beam with
//! the tabulated `Ixx_3`:
//!
//! ```text
//!   δ_span = 5·w·c⁴ / (384·E·Ixx_3)
//! ```

use serde::{Deserialize, Serialize};

use super::deflection::DeflectionResults;
use super::drop_below_slab::DropBelowSlabResults;
use super::model::MathematicalModel;
use super::trace::VerificationTrace;
use crate::materials::MaterialProperties;
use crate::section_tables::ixx_span;
use crate::units::round12;

const STAGE: &str = "total_deflection";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalDeflectionResults {
    /// From the angle deflection check (mm)
    pub angle_deflection: f64,
    /// D_heel_2 from the drop-below-slab check (mm)
    pub drop_deflection: f64,
    /// Tabulated Ixx_3 (mm⁴)
    pub second_moment: f64,
    /// Angle span deflection between brackets (mm)
    pub span_deflection: f64,
    pub total_deflection: f64,
    pub limit: f64,
    /// total / limit (%)
    pub utilisation: f64,
    pub passes: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

pub fn calculate(
    model: &MathematicalModel,
    angle: &DeflectionResults,
    drop: &DropBelowSlabResults,
    steel: &MaterialProperties,
    limit: f64,
    trace: &mut dyn VerificationTrace,
) -> TotalDeflectionResults {
    let mut notes = Vec::new();

    let (ixx, span) = match ixx_span(model.angle_thickness) {
        Ok(ixx) => {
            let w = model.characteristic_load;
            let c = model.bracket_centres;
            (ixx, 5.0 * w * c.powi(4) / (384.0 * steel.youngs_modulus * ixx))
        }
        Err(e) => {
            let reason = e.to_string();
            trace.note(STAGE, &reason);
            notes.push(reason);
            (0.0, 0.0)
        }
    };

    if !angle.converged {
        notes.push("angle deflection unavailable".to_string());
    }

    let total = angle.total_deflection + drop.d_heel_2 + span;
    trace.record(STAGE, "span_deflection", span);
    trace.record(STAGE, "total_deflection", total);

    let total = round12(total);
    TotalDeflectionResults {
        angle_deflection: angle.total_deflection,
        drop_deflection: drop.d_heel_2,
        second_moment: round12(ixx),
        span_deflection: round12(span),
        total_deflection: total,
        limit: round12(limit),
        utilisation: round12(total / limit * 100.0),
        passes: notes.is_empty() && total <= limit,
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::test_support::fixture_model;
    use crate::verification::trace::NoTrace;
    use crate::verification::{deflection, drop_below_slab};

    #[test]
    fn test_fixture_total() {
        let model = fixture_model();
        let steel = MaterialProperties::default();
        let angle = deflection::calculate(&model, &steel, 1.5, &mut NoTrace);
        let drop = drop_below_slab::calculate(&model, -25.0, &steel, 1.5, &mut NoTrace);
        let r = calculate(&model, &angle, &drop, &steel, 2.0, &mut NoTrace);

        // 5 × 14 × 500⁴ / (384 × 200000 × 262602)
        assert!((r.span_deflection - 0.21693).abs() < 1e-4);
        assert!((r.total_deflection - 0.90).abs() < 0.01);
        assert!(r.passes);
    }

    #[test]
    fn test_system_limit_is_separate_from_angle_limit() {
        let model = fixture_model();
        let steel = MaterialProperties::default();
        let angle = deflection::calculate(&model, &steel, 1.5, &mut NoTrace);
        let drop = drop_below_slab::calculate(&model, 0.0, &steel, 1.5, &mut NoTrace);
        let r = calculate(&model, &angle, &drop, &steel, 0.5, &mut NoTrace);
        assert!(angle.passes);
        assert!(!r.passes);
    }
}
