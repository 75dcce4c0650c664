//! # Mathematical Model
//!
//! Stage 1 of the pipeline. Produces the design loads and the derived lengths
//! and section properties every later stage consumes. It has no pass/fail of
//! its own.
//!
//! ```text
//!   Ecc = facade_thickness × load_position   (or masonry_thickness / 3)
//!   L1  = Ecc + d + T        lever arm from the bracket face to the load
//!   a   = Ecc + d − R        horizontal leg length beyond the bend
//!   b   = V − T − R          vertical leg length beyond the bend
//!   I   = c·T³/12            Z = c·T²/6   (c = bracket centres)
//! ```

use serde::{Deserialize, Serialize};

use super::trace::VerificationTrace;
use crate::geometry::ResolvedGeometry;
use crate::inputs::DesignInputs;
use crate::materials::SafetyFactors;
use crate::params::GeneticParameters;
use crate::units::round12;

const STAGE: &str = "model";

/// Full-precision model carried between stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MathematicalModel {
    /// Characteristic line load (kN/m)
    pub characteristic_load: f64,
    /// ULS line load (kN/m)
    pub design_udl: f64,
    /// ULS shear per bracket V_ed (kN)
    pub shear_force: f64,
    /// SLS shear per bracket (kN)
    pub sls_shear_force: f64,
    pub bracket_centres: f64,
    pub design_cavity: f64,
    pub eccentricity: f64,
    pub heel_gap: f64,
    pub angle_thickness: f64,
    pub bend_radius: f64,
    pub vertical_leg: f64,
    pub lever_arm: f64,
    pub a: f64,
    pub b: f64,
    /// Angle second moment of area over one bracket spacing (mm⁴)
    pub second_moment: f64,
    /// Angle elastic section modulus over one bracket spacing (mm³)
    pub section_modulus: f64,
}

/// Rounded model values reported in the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResults {
    pub design_udl: f64,
    pub shear_force: f64,
    pub sls_shear_force: f64,
    pub design_cavity: f64,
    pub eccentricity: f64,
    pub heel_gap: f64,
    pub bend_radius: f64,
    pub lever_arm: f64,
    pub a: f64,
    pub b: f64,
    pub second_moment: f64,
    pub section_modulus: f64,
}

/// Load eccentricity from the masonry inner face (mm).
///
/// Uses the facade thickness and load position when both are supplied and
/// falls back to a third of the masonry thickness otherwise.
pub fn eccentricity(inputs: &DesignInputs) -> f64 {
    match inputs.facade_load() {
        Some((thickness, position)) => thickness * position,
        None => inputs.masonry_thickness / 3.0,
    }
}

/// Build the model for one resolved candidate.
pub fn calculate(
    inputs: &DesignInputs,
    params: &GeneticParameters,
    geometry: &ResolvedGeometry,
    factors: &SafetyFactors,
    trace: &mut dyn VerificationTrace,
) -> MathematicalModel {
    let centres = params.bracket_centres;
    let t = params.angle_thickness;
    let r = geometry.bend_radius;
    let d = geometry.heel_gap;
    let v = geometry.angle_vertical_leg;

    let design_udl = factors.uls_load_factor * inputs.characteristic_load;
    let shear_force = design_udl * centres / 1000.0;
    let sls_shear_force = inputs.characteristic_load * centres / 1000.0;

    let ecc = eccentricity(inputs);
    let lever_arm = ecc + d + t;
    let a = ecc + d - r;
    let b = v - t - r;

    let model = MathematicalModel {
        characteristic_load: inputs.characteristic_load,
        design_udl,
        shear_force,
        sls_shear_force,
        bracket_centres: centres,
        design_cavity: geometry.design_cavity,
        eccentricity: ecc,
        heel_gap: d,
        angle_thickness: t,
        bend_radius: r,
        vertical_leg: v,
        lever_arm,
        a,
        b,
        second_moment: centres * t.powi(3) / 12.0,
        section_modulus: centres * t.powi(2) / 6.0,
    };

    trace.record(STAGE, "design_udl", model.design_udl);
    trace.record(STAGE, "shear_force", model.shear_force);
    trace.record(STAGE, "eccentricity", model.eccentricity);
    trace.record(STAGE, "lever_arm", model.lever_arm);
    trace.record(STAGE, "a", model.a);
    trace.record(STAGE, "b", model.b);
    trace.record(STAGE, "second_moment", model.second_moment);
    model
}

impl MathematicalModel {
    pub fn results(&self) -> ModelResults {
        ModelResults {
            design_udl: round12(self.design_udl),
            shear_force: round12(self.shear_force),
            sls_shear_force: round12(self.sls_shear_force),
            design_cavity: round12(self.design_cavity),
            eccentricity: round12(self.eccentricity),
            heel_gap: round12(self.heel_gap),
            bend_radius: round12(self.bend_radius),
            lever_arm: round12(self.lever_arm),
            a: round12(self.a),
            b: round12(self.b),
            second_moment: round12(self.second_moment),
            section_modulus: round12(self.section_modulus),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::test_support::fixture_candidate;
    use crate::verification::trace::NoTrace;
    use proptest::prelude::*;

    #[test]
    fn test_fixture_model() {
        let (inputs, params, geometry) = fixture_candidate();
        let model = calculate(&inputs, &params, &geometry, &SafetyFactors::default(), &mut NoTrace);
        let results = model.results();

        assert_eq!(results.design_udl, 18.9);
        assert_eq!(results.shear_force, 9.45);
        assert_eq!(results.design_cavity, 220.0);
        assert_eq!(results.eccentricity, 34.166666666667);
        assert_eq!(results.b, 48.0);
        assert_eq!(results.second_moment, 9000.0);
        assert_eq!(results.section_modulus, 3000.0);
    }

    #[test]
    fn test_facade_eccentricity() {
        let (mut inputs, _, _) = fixture_candidate();
        inputs.facade_thickness = Some(100.0);
        inputs.load_position = Some(0.5);
        assert_eq!(eccentricity(&inputs), 50.0);
    }

    proptest! {
        #[test]
        fn prop_eccentricity_fallback_matches_third_point(x in 50.0f64..300.0) {
            let (mut plain, _, _) = fixture_candidate();
            plain.masonry_thickness = x;

            let mut facade = plain.clone();
            facade.facade_thickness = Some(x);
            facade.load_position = Some(1.0 / 3.0);

            let diff = (eccentricity(&plain) - eccentricity(&facade)).abs();
            prop_assert!(diff < 1e-10);
        }
    }
}
