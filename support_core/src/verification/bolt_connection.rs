//! # Angle-to-Bracket Connection
//!
//! One bolt per bracket carries the full design shear and the tension that
//! balances the angle moment about the bracket toe:
//!
//! ```text
//!   M_b = V_ed·(L1 − T/2)/1000         (kNm)
//!   N   = M_b / (rise/1000)            (kN, worst-case slot position)
//!   U   = V_ed/F_v,Rd·100 + N/(1.4·F_t,Rd)·100  ≤ 100
//! ```
//!
//! The bolt also needs an end distance of at least 1.2·d0 below the fixing,
//! expressed as `rise / (1.2·d0) ≥ 1`.

use serde::{Deserialize, Serialize};

use super::model::MathematicalModel;
use super::trace::VerificationTrace;
use crate::geometry::ResolvedGeometry;
use crate::materials::{BoltSize, MaterialProperties, SafetyFactors, BOLT_TENSION_INTERACTION_FACTOR};
use crate::units::{moment_knm, round12};

const STAGE: &str = "angle_to_bracket";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleToBracketResults {
    pub bolt_size: BoltSize,
    /// Bolt moment M_b (kNm)
    pub bolt_moment: f64,
    /// Worst-case rise to bolts used as the lever arm (mm)
    pub rise_to_bolts: f64,
    /// Bolt tension N (kN)
    pub tension_force: f64,
    /// Bolt shear V_ed (kN)
    pub shear_force: f64,
    /// F_v,Rd (kN)
    pub shear_resistance: f64,
    /// F_t,Rd (kN)
    pub tension_resistance: f64,
    /// V_ed / F_v,Rd (%)
    pub shear_utilisation: f64,
    /// N / (1.4·F_t,Rd) (%)
    pub tension_utilisation: f64,
    /// Sum of the two (%)
    pub combined_utilisation: f64,
    /// Minimum end distance 1.2·d0 (mm)
    pub min_edge_distance: f64,
    /// rise / (1.2·d0); below 1.0 fails
    pub edge_distance_ratio: f64,
    pub passes: bool,
}

pub fn calculate(
    model: &MathematicalModel,
    geometry: &ResolvedGeometry,
    bolt: BoltSize,
    steel: &MaterialProperties,
    factors: &SafetyFactors,
    trace: &mut dyn VerificationTrace,
) -> AngleToBracketResults {
    let rise = geometry.rise_to_bolts;
    let bolt_moment = moment_knm(model.shear_force, model.lever_arm - model.angle_thickness / 2.0);
    let tension = bolt_moment / (rise / 1000.0);

    let fv = bolt.shear_resistance_kn(steel, factors);
    let ft = bolt.tension_resistance_kn(steel, factors);
    let shear_util = model.shear_force / fv * 100.0;
    let tension_util = tension / (BOLT_TENSION_INTERACTION_FACTOR * ft) * 100.0;
    let combined = shear_util + tension_util;

    let min_edge = bolt.min_edge_distance();
    let edge_ratio = rise / min_edge;

    trace.record(STAGE, "bolt_moment", bolt_moment);
    trace.record(STAGE, "tension_force", tension);
    trace.record(STAGE, "shear_resistance", fv);
    trace.record(STAGE, "tension_resistance", ft);
    trace.record(STAGE, "combined_utilisation", combined);
    trace.record(STAGE, "edge_distance_ratio", edge_ratio);

    let combined = round12(combined);
    let edge_ratio = round12(edge_ratio);
    AngleToBracketResults {
        bolt_size: bolt,
        bolt_moment: round12(bolt_moment),
        rise_to_bolts: round12(rise),
        tension_force: round12(tension),
        shear_force: round12(model.shear_force),
        shear_resistance: round12(fv),
        tension_resistance: round12(ft),
        shear_utilisation: round12(shear_util),
        tension_utilisation: round12(tension_util),
        combined_utilisation: combined,
        min_edge_distance: round12(min_edge),
        edge_distance_ratio: edge_ratio,
        passes: combined <= 100.0 && edge_ratio >= 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::test_support::{fixture_candidate, fixture_model};
    use crate::verification::trace::NoTrace;

    fn run(geometry: &ResolvedGeometry, bolt: BoltSize) -> AngleToBracketResults {
        calculate(
            &fixture_model(),
            geometry,
            bolt,
            &MaterialProperties::default(),
            &SafetyFactors::default(),
            &mut NoTrace,
        )
    }

    #[test]
    fn test_fixture_connection() {
        let (_, _, geometry) = fixture_candidate();
        let r = run(&geometry, BoltSize::M10);
        // 9.45 × 51.1667 / 1000 / 0.110
        assert!((r.tension_force - 4.3957).abs() < 1e-3);
        assert!((r.shear_utilisation - 48.4914).abs() < 1e-3);
        assert!((r.combined_utilisation - 59.23).abs() < 0.01);
        assert!(r.passes);
    }

    #[test]
    fn test_edge_distance_thresholds() {
        let (_, _, mut geometry) = fixture_candidate();
        for (bolt, min) in [
            (BoltSize::M10, 13.2),
            (BoltSize::M12, 15.6),
            (BoltSize::M16, 21.6),
        ] {
            geometry.rise_to_bolts = min;
            let at_limit = run(&geometry, bolt);
            assert_eq!(at_limit.edge_distance_ratio, 1.0);

            geometry.rise_to_bolts = min - 0.1;
            let short = run(&geometry, bolt);
            assert!(short.edge_distance_ratio < 1.0);
            assert!(!short.passes);
        }
    }

    #[test]
    fn test_larger_bolt_reduces_utilisation() {
        let (_, _, geometry) = fixture_candidate();
        let m10 = run(&geometry, BoltSize::M10);
        let m12 = run(&geometry, BoltSize::M12);
        assert!(m12.combined_utilisation < m10.combined_utilisation);
    }
}
