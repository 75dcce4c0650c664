//! # Combined Tension and Shear at the Fixing
//!
//! The moment at the slab face is resolved into a tension on the fixing over
//! the display rise to bolts. Both interaction formulas must hold:
//!
//! ```text
//!   (N/N_rd)^1.5 + (V/V_rd)^1.5 ≤ 1.0
//!   (N/N_rd + V/V_rd) / 1.2    ≤ 1.0
//! ```
//!
//! Channel fixings take N_rd/V_rd from the capacity table; steel fixings use
//! the bolt resistances.

use serde::{Deserialize, Serialize};

use super::model::MathematicalModel;
use super::trace::VerificationTrace;
use super::Anchorage;
use crate::geometry::ResolvedGeometry;
use crate::materials::{MaterialProperties, SafetyFactors};
use crate::units::{moment_knm, round12};

const STAGE: &str = "combined_tension_shear";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedResults {
    /// Moment at the slab face M_fix = V_ed·(design cavity + Ecc) (kNm)
    pub fixing_moment: f64,
    /// Tension on the fixing (kN)
    pub tension_force: f64,
    /// Shear on the fixing (kN)
    pub shear_force: f64,
    /// N_rd (kN)
    pub tension_capacity: f64,
    /// V_rd (kN)
    pub shear_capacity: f64,
    /// (N/N_rd)^1.5 + (V/V_rd)^1.5
    pub power_interaction: f64,
    /// (N/N_rd + V/V_rd)/1.2
    pub linear_interaction: f64,
    pub passes_power: bool,
    pub passes_linear: bool,
    pub passes: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Moment at the slab face (kNm), shared with the fixing and bracket checks.
pub fn fixing_moment(model: &MathematicalModel) -> f64 {
    moment_knm(model.shear_force, model.design_cavity + model.eccentricity)
}

pub fn calculate(
    model: &MathematicalModel,
    geometry: &ResolvedGeometry,
    anchorage: &Anchorage<'_>,
    steel: &MaterialProperties,
    factors: &SafetyFactors,
    trace: &mut dyn VerificationTrace,
) -> CombinedResults {
    let m_fix = fixing_moment(model);
    let tension = m_fix / (geometry.rise_to_bolts_display / 1000.0);
    let shear = model.shear_force;

    trace.record(STAGE, "fixing_moment", m_fix);
    trace.record(STAGE, "tension_force", tension);

    let (n_rd, v_rd) = match anchorage {
        Anchorage::Channel(matched) => (matched.spec.tension_capacity, matched.spec.shear_capacity),
        Anchorage::SteelBolt(bolt) => (
            bolt.tension_resistance_kn(steel, factors),
            bolt.shear_resistance_kn(steel, factors),
        ),
        Anchorage::Unavailable { reason } => {
            trace.note(STAGE, reason);
            return CombinedResults {
                fixing_moment: round12(m_fix),
                tension_force: round12(tension),
                shear_force: round12(shear),
                tension_capacity: 0.0,
                shear_capacity: 0.0,
                power_interaction: 0.0,
                linear_interaction: 0.0,
                passes_power: false,
                passes_linear: false,
                passes: false,
                notes: vec![reason.clone()],
            };
        }
    };

    let n_ratio = tension / n_rd;
    let v_ratio = shear / v_rd;
    let power = n_ratio.powf(1.5) + v_ratio.powf(1.5);
    let linear = (n_ratio + v_ratio) / 1.2;

    trace.record(STAGE, "power_interaction", power);
    trace.record(STAGE, "linear_interaction", linear);

    let power = round12(power);
    let linear = round12(linear);
    let passes_power = power <= 1.0;
    let passes_linear = linear <= 1.0;
    CombinedResults {
        fixing_moment: round12(m_fix),
        tension_force: round12(tension),
        shear_force: round12(shear),
        tension_capacity: round12(n_rd),
        shear_capacity: round12(v_rd),
        power_interaction: power,
        linear_interaction: linear,
        passes_power,
        passes_linear,
        passes: passes_power && passes_linear,
        notes: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{ChannelSpec, ChannelStore};
    use crate::materials::BoltSize;
    use crate::verification::test_support::{fixture_candidate, fixture_model};
    use crate::verification::trace::NoTrace;

    fn run(anchorage: &Anchorage<'_>) -> CombinedResults {
        let (_, _, geometry) = fixture_candidate();
        calculate(
            &fixture_model(),
            &geometry,
            anchorage,
            &MaterialProperties::default(),
            &SafetyFactors::default(),
            &mut NoTrace,
        )
    }

    #[test]
    fn test_fixture_channel_interaction() {
        let store = ChannelStore::embedded().unwrap();
        let matched = store.lookup("CPRO50", 225.0, 500.0).unwrap();
        let r = run(&Anchorage::Channel(matched));

        assert!((r.fixing_moment - 2.401875).abs() < 1e-9);
        assert!((r.tension_force - 19.215).abs() < 1e-9);
        assert!((r.power_interaction - 0.774).abs() < 1e-3);
        assert!((r.linear_interaction - 0.845).abs() < 1e-3);
        assert!(r.passes);
    }

    #[test]
    fn test_weak_channel_fails_both() {
        let store = ChannelStore::embedded().unwrap();
        // Weakest family at the widest table centres
        let matched = store.lookup("CPRO38", 200.0, 200.0).unwrap();
        let r = run(&Anchorage::Channel(matched));
        assert!(!r.passes_linear || !r.passes_power);
        assert!(!r.passes);
    }

    /// Single-row store with the given capacities, at the fixture slab and centres
    fn single_row(tension_capacity: f64, shear_capacity: f64) -> ChannelStore {
        ChannelStore::from_rows([ChannelSpec {
            channel_type: "TEST".to_string(),
            slab_thickness: 225.0,
            bracket_centres: 500.0,
            top_critical_edge: 75.0,
            bottom_critical_edge: 150.0,
            tension_capacity,
            shear_capacity,
        }])
    }

    #[test]
    fn test_linear_failure_alone_fails() {
        // N/N_rd = V/V_rd = 0.625: power 0.988, linear 1.042
        let store = single_row(19.215 / 0.625, 9.45 / 0.625);
        let matched = store.lookup("TEST", 225.0, 500.0).unwrap();
        let r = run(&Anchorage::Channel(matched));

        assert!((r.power_interaction - 0.988212).abs() < 1e-5);
        assert!((r.linear_interaction - 1.041667).abs() < 1e-5);
        assert!(r.passes_power);
        assert!(!r.passes_linear);
        assert!(!r.passes);
    }

    #[test]
    fn test_power_failure_alone_fails() {
        // N/N_rd = 1.05, V/V_rd = 0.1: power 1.108, linear 0.958
        let store = single_row(19.215 / 1.05, 9.45 / 0.1);
        let matched = store.lookup("TEST", 225.0, 500.0).unwrap();
        let r = run(&Anchorage::Channel(matched));

        assert!(!r.passes_power);
        assert!(r.passes_linear);
        assert!(!r.passes);
    }

    #[test]
    fn test_missing_channel_fails_with_note() {
        let r = run(&Anchorage::Unavailable {
            reason: "Missing reference data in channel_specs: CPRO99".to_string(),
        });
        assert!(!r.passes);
        assert_eq!(r.tension_capacity, 0.0);
        assert!(r.notes[0].contains("CPRO99"));
    }

    #[test]
    fn test_steel_fixing_uses_bolt_capacity() {
        let r = run(&Anchorage::SteelBolt(BoltSize::M16));
        assert!((r.tension_capacity - 79.128).abs() < 1e-9);
        assert!((r.shear_capacity - 52.752).abs() < 1e-9);
    }
}
