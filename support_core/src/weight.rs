//! # Weight Model
//!
//! Linear steel mass of a support system:
//!
//! ```text
//!   bracket (kg)   = ρ·t_b·H·(projection + back plate)
//!   angle (kg/m)   = ρ·T·(V + horizontal leg − T)·1000
//!   system (kg/m)  = angle + bracket·1000/centres
//! ```
//!
//! The vertical leg V includes any angle extension, so a capped bracket
//! trades bracket steel for angle steel.

use serde::{Deserialize, Serialize};

use crate::geometry::{ResolvedGeometry, BRACKET_BACK_PLATE_WIDTH};
use crate::materials::MaterialProperties;
use crate::params::GeneticParameters;
use crate::units::round12;

/// Mass breakdown for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightBreakdown {
    /// One bracket (kg)
    pub bracket_mass: f64,
    /// Angle per metre run (kg/m)
    pub angle_mass_per_metre: f64,
    /// Brackets per metre run (kg/m)
    pub bracket_mass_per_metre: f64,
    /// Angle plus brackets per metre run (kg/m)
    pub total_mass_per_metre: f64,
}

pub fn calculate(
    params: &GeneticParameters,
    geometry: &ResolvedGeometry,
    steel: &MaterialProperties,
) -> WeightBreakdown {
    let rho = steel.density_kg_per_mm3;
    let t = params.angle_thickness;

    let bracket = rho
        * params.bracket_thickness
        * geometry.bracket_height
        * (geometry.bracket_projection + BRACKET_BACK_PLATE_WIDTH);
    let angle = rho * t * (geometry.angle_vertical_leg + geometry.angle_horizontal_leg - t) * 1000.0;
    let brackets_per_metre = bracket * 1000.0 / params.bracket_centres;

    WeightBreakdown {
        bracket_mass: round12(bracket),
        angle_mass_per_metre: round12(angle),
        bracket_mass_per_metre: round12(brackets_per_metre),
        total_mass_per_metre: round12(angle + brackets_per_metre),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::test_support::fixture_candidate;

    fn weigh(params: &GeneticParameters, geometry: &ResolvedGeometry) -> WeightBreakdown {
        calculate(params, geometry, &MaterialProperties::default())
    }

    #[test]
    fn test_fixture_weight() {
        let (_, params, geometry) = fixture_candidate();
        let w = weigh(&params, &geometry);
        // 7.93e-6 × 4 × 175 × 256
        assert!((w.bracket_mass - 1.421056).abs() < 1e-9);
        // 7.93e-6 × 6 × 144 × 1000
        assert!((w.angle_mass_per_metre - 6.85152).abs() < 1e-9);
        assert!((w.total_mass_per_metre - (6.85152 + 2.842112)).abs() < 1e-9);
    }

    #[test]
    fn test_wider_centres_are_lighter() {
        let (_, mut params, geometry) = fixture_candidate();
        let close = weigh(&params, &geometry);
        params.bracket_centres = 600.0;
        let wide = weigh(&params, &geometry);
        assert!(wide.total_mass_per_metre < close.total_mass_per_metre);
        assert_eq!(wide.angle_mass_per_metre, close.angle_mass_per_metre);
    }

    #[test]
    fn test_extension_moves_mass_to_angle() {
        let (_, params, mut geometry) = fixture_candidate();
        let base = weigh(&params, &geometry);
        geometry.bracket_height -= 50.0;
        geometry.angle_vertical_leg += 50.0;
        let extended = weigh(&params, &geometry);
        assert!(extended.bracket_mass < base.bracket_mass);
        assert!(extended.angle_mass_per_metre > base.angle_mass_per_metre);
    }

    #[test]
    fn test_bracket_mass_includes_back_plate() {
        let (_, params, geometry) = fixture_candidate();
        let w = weigh(&params, &geometry);
        let plate_only = 7.93e-6 * 4.0 * 175.0 * BRACKET_BACK_PLATE_WIDTH;
        let arm_only = 7.93e-6 * 4.0 * 175.0 * geometry.bracket_projection;
        assert!((w.bracket_mass - (plate_only + arm_only)).abs() < 1e-9);
    }
}
