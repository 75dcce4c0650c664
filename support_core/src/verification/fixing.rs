//! # Fixing Check
//!
//! The bracket back plate bears on the slab edge below the fixing and the
//! fixing takes the balancing tension. With a rectangular concrete stress
//! block of force `k` per mm of depth, moment equilibrium about the fixing
//! gives a quadratic in the compression zone length `x`:
//!
//! ```text
//!   k·x·(h_c − x/2) = M          h_c = display rise to bolts
//!   x = h_c − √(h_c² − 2M/k)     T = k·x
//! ```
//!
//! A negative discriminant means the stress block cannot balance the moment:
//! the check fails with zeroed tension and compression zone.
//!
//! Channel capacities are reduced by the edge factor
//! `ψ = min(1, f/top_edge, (slab − f)/bottom_edge)`. Steel fixings use the bolt
//! interaction `V/F_v + T/(1.4·F_t) ≤ 1`.

use serde::{Deserialize, Serialize};

use super::combined::fixing_moment;
use super::model::MathematicalModel;
use super::trace::VerificationTrace;
use super::Anchorage;
use crate::geometry::ResolvedGeometry;
use crate::materials::{
    ConcreteProperties, MaterialProperties, SafetyFactors, BOLT_TENSION_INTERACTION_FACTOR,
};
use crate::units::{knm_to_nmm, n_to_kn, round12};

const STAGE: &str = "fixing";

/// Relative tolerance on the moment equilibrium residual
const EQUILIBRIUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixingResults {
    /// Moment at the slab face (kNm)
    pub fixing_moment: f64,
    /// Lever arm h_c (mm)
    pub rise_to_bolts: f64,
    /// Stress block force per mm, k (N/mm)
    pub block_stiffness: f64,
    /// h_c² − 2M/k (mm²)
    pub discriminant: f64,
    /// x (mm)
    pub compression_zone_length: f64,
    /// T = k·x (kN)
    pub tensile_load: f64,
    /// Shear on the fixing (kN)
    pub shear_force: f64,
    pub moment_equilibrium: bool,
    pub force_equilibrium: bool,
    /// ψ applied to channel capacities
    pub edge_factor: f64,
    /// Reduced tension capacity (kN)
    pub tension_capacity: f64,
    /// Reduced shear capacity (kN)
    pub shear_capacity: f64,
    /// T / capacity (%)
    pub tension_utilisation: f64,
    /// V / capacity (%)
    pub shear_utilisation: f64,
    /// V/F_v + T/(1.4·F_t), steel fixings only
    pub steel_interaction: Option<f64>,
    pub passes: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl FixingResults {
    /// Highest of the tension, shear and steel interaction utilisations (%)
    pub fn utilisation(&self) -> f64 {
        let steel = self.steel_interaction.map_or(0.0, |i| i * 100.0);
        self.tension_utilisation.max(self.shear_utilisation).max(steel)
    }
}

/// Edge factor from the fixing position and the channel's critical edges.
pub fn edge_factor(fixing_position: f64, slab_thickness: f64, top_edge: f64, bottom_edge: f64) -> f64 {
    let mut psi: f64 = 1.0;
    if top_edge > 0.0 {
        psi = psi.min(fixing_position / top_edge);
    }
    if bottom_edge > 0.0 {
        psi = psi.min((slab_thickness - fixing_position) / bottom_edge);
    }
    psi.max(0.0)
}

#[allow(clippy::too_many_arguments)]
pub fn calculate(
    model: &MathematicalModel,
    geometry: &ResolvedGeometry,
    fixing_position: f64,
    slab_thickness: f64,
    anchorage: &Anchorage<'_>,
    steel: &MaterialProperties,
    concrete: &ConcreteProperties,
    factors: &SafetyFactors,
    trace: &mut dyn VerificationTrace,
) -> FixingResults {
    let m_fix = fixing_moment(model);
    let moment = knm_to_nmm(m_fix);
    let h_c = geometry.rise_to_bolts_display;
    let k = concrete.block_stiffness();
    let shear = model.shear_force;
    let discriminant = h_c * h_c - 2.0 * moment / k;

    trace.record(STAGE, "fixing_moment", m_fix);
    trace.record(STAGE, "discriminant", discriminant);

    let mut notes = Vec::new();

    if discriminant < 0.0 {
        let reason = format!(
            "stress block cannot balance {:.3} kNm over a {} mm rise",
            m_fix, h_c
        );
        trace.note(STAGE, &reason);
        notes.push(reason);
        return FixingResults {
            fixing_moment: round12(m_fix),
            rise_to_bolts: round12(h_c),
            block_stiffness: round12(k),
            discriminant: round12(discriminant),
            compression_zone_length: 0.0,
            tensile_load: 0.0,
            shear_force: round12(shear),
            moment_equilibrium: false,
            force_equilibrium: false,
            edge_factor: 0.0,
            tension_capacity: 0.0,
            shear_capacity: 0.0,
            tension_utilisation: 0.0,
            shear_utilisation: 0.0,
            steel_interaction: None,
            passes: false,
            notes,
        };
    }

    let x = h_c - discriminant.sqrt();
    let tensile_load = n_to_kn(k * x);
    let residual = (k * x * (h_c - x / 2.0) - moment).abs();
    let moment_equilibrium = residual <= EQUILIBRIUM_TOLERANCE * moment.abs().max(1.0);
    let force_equilibrium = (0.0..=h_c).contains(&x);

    trace.record(STAGE, "compression_zone_length", x);
    trace.record(STAGE, "tensile_load", tensile_load);

    let (psi, tension_capacity, shear_capacity, steel_interaction, capacity_ok) = match anchorage {
        Anchorage::Channel(matched) => {
            let spec = matched.spec;
            if !matched.exact {
                notes.push(format!(
                    "{} capacities taken from the slab {} mm / centres {} mm row",
                    spec.channel_type, spec.slab_thickness, spec.bracket_centres
                ));
            }
            let psi = edge_factor(
                fixing_position,
                slab_thickness,
                spec.top_critical_edge,
                spec.bottom_critical_edge,
            );
            let n_rd = psi * spec.tension_capacity;
            let v_rd = psi * spec.shear_capacity;
            let ok = tensile_load <= n_rd && shear <= v_rd;
            (psi, n_rd, v_rd, None, ok)
        }
        Anchorage::SteelBolt(bolt) => {
            let fv = bolt.shear_resistance_kn(steel, factors);
            let ft = bolt.tension_resistance_kn(steel, factors);
            let interaction = shear / fv + tensile_load / (BOLT_TENSION_INTERACTION_FACTOR * ft);
            let interaction = round12(interaction);
            (1.0, ft, fv, Some(interaction), interaction <= 1.0)
        }
        Anchorage::Unavailable { reason } => {
            trace.note(STAGE, reason);
            notes.push(reason.clone());
            (0.0, 0.0, 0.0, None, false)
        }
    };

    let utilisation = |demand: f64, capacity: f64| {
        if capacity > 0.0 {
            round12(demand / capacity * 100.0)
        } else {
            0.0
        }
    };

    trace.record(STAGE, "edge_factor", psi);
    trace.record(STAGE, "tension_capacity", tension_capacity);

    FixingResults {
        fixing_moment: round12(m_fix),
        rise_to_bolts: round12(h_c),
        block_stiffness: round12(k),
        discriminant: round12(discriminant),
        compression_zone_length: round12(x),
        tensile_load: round12(tensile_load),
        shear_force: round12(shear),
        moment_equilibrium,
        force_equilibrium,
        edge_factor: round12(psi),
        tension_capacity: round12(tension_capacity),
        shear_capacity: round12(shear_capacity),
        tension_utilisation: utilisation(tensile_load, tension_capacity),
        shear_utilisation: utilisation(shear, shear_capacity),
        steel_interaction,
        passes: moment_equilibrium && force_equilibrium && capacity_ok,
        notes,
    }
}
