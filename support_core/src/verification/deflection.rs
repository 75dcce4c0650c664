//! # Angle Deflection (SLS)
//!
//! Stainless steel softens well below its proof strength, so the angle is
//! analysed with the Ramberg-Osgood secant modulus rather than E:
//!
//! ```text
//!   E_s = E / (1 + 0.002·(E/σ)·(σ/f_y)^n)
//! ```
//!
//! The stress depends on the heel deflection (the load moves outwards as the
//! vertical leg rotates), so moment, stress, secant modulus and heel
//! deflection are iterated until the heel deflection settles.
//!
//! ```text
//!   M      = V_sls·(L1 + δ_heel)
//!   δ_tip  = V_sls·a³ / (3·E_s·I)
//!   θ      = atan(M·b / (E_s·I))
//!   δ_rot  = L1·sin θ
//!   δ_heel = M·b² / (2·E_s·I)
//!   total  = δ_tip + δ_rot
//! ```

use serde::{Deserialize, Serialize};

use super::model::MathematicalModel;
use super::trace::VerificationTrace;
use crate::materials::MaterialProperties;
use crate::units::{kn_to_n, nmm_to_knm, round12};

const STAGE: &str = "angle_deflection";

/// Iteration cap for the stress-stiffness loop
pub const MAX_ITERATIONS: usize = 50;

/// Heel deflection change treated as converged (mm)
const CONVERGENCE_TOLERANCE: f64 = 1e-9;

/// Stress beyond which the iteration is treated as divergent
const DIVERGENCE_STRESS_RATIO: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeflectionResults {
    /// SLS moment at the heel including the P-δ term (kNm)
    pub sls_moment: f64,
    /// Bending stress σ (N/mm²)
    pub stress: f64,
    /// Secant modulus E_s (N/mm²)
    pub secant_modulus: f64,
    /// Horizontal leg tip deflection (mm)
    pub tip_deflection: f64,
    /// Heel rotation θ (rad)
    pub rotation: f64,
    /// Deflection at the load from heel rotation (mm)
    pub rotational_deflection: f64,
    /// Horizontal heel movement (mm)
    pub heel_deflection: f64,
    /// δ_tip + δ_rot (mm)
    pub total_deflection: f64,
    /// Angle deflection limit (mm)
    pub limit: f64,
    /// total / limit (%)
    pub utilisation: f64,
    pub iterations: usize,
    pub converged: bool,
    pub passes: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Ramberg-Osgood secant modulus at stress `sigma`.
pub fn secant_modulus(steel: &MaterialProperties, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return steel.youngs_modulus;
    }
    let e = steel.youngs_modulus;
    e / (1.0 + 0.002 * (e / sigma) * (sigma / steel.yield_strength).powf(steel.ramberg_osgood_n))
}

struct Iterate {
    moment: f64,
    stress: f64,
    secant: f64,
    heel: f64,
}

pub fn calculate(
    model: &MathematicalModel,
    steel: &MaterialProperties,
    limit: f64,
    trace: &mut dyn VerificationTrace,
) -> DeflectionResults {
    let load_n = kn_to_n(model.sls_shear_force);
    let ei_factor = model.second_moment;

    let mut heel = 0.0;
    let mut state = None;
    let mut iterations = 0;
    let mut converged = false;

    for i in 1..=MAX_ITERATIONS {
        iterations = i;
        let moment = load_n * (model.lever_arm + heel);
        let stress = moment / model.section_modulus;
        if !stress.is_finite() || stress > DIVERGENCE_STRESS_RATIO * steel.yield_strength {
            state = None;
            break;
        }
        let secant = secant_modulus(steel, stress);
        let next_heel = moment * model.b.powi(2) / (2.0 * secant * ei_factor);
        if !next_heel.is_finite() {
            state = None;
            break;
        }
        let settled = (next_heel - heel).abs() < CONVERGENCE_TOLERANCE;
        heel = next_heel;
        state = Some(Iterate {
            moment,
            stress,
            secant,
            heel,
        });
        if settled {
            converged = true;
            break;
        }
    }

    trace.record(STAGE, "iterations", iterations as f64);

    let Some(state) = state.filter(|_| converged) else {
        let reason = format!(
            "stress-stiffness iteration did not converge after {} iterations",
            iterations
        );
        trace.note(STAGE, &reason);
        return DeflectionResults {
            sls_moment: 0.0,
            stress: 0.0,
            secant_modulus: 0.0,
            tip_deflection: 0.0,
            rotation: 0.0,
            rotational_deflection: 0.0,
            heel_deflection: 0.0,
            total_deflection: 0.0,
            limit: round12(limit),
            utilisation: 0.0,
            iterations,
            converged: false,
            passes: false,
            notes: vec![reason],
        };
    };

    let ei = state.secant * ei_factor;
    let tip = load_n * model.a.powi(3) / (3.0 * ei);
    let rotation = (state.moment * model.b / ei).atan();
    let rotational = model.lever_arm * rotation.sin();
    let total = tip + rotational;
    let utilisation = total / limit * 100.0;

    trace.record(STAGE, "stress", state.stress);
    trace.record(STAGE, "secant_modulus", state.secant);
    trace.record(STAGE, "tip_deflection", tip);
    trace.record(STAGE, "rotation", rotation);
    trace.record(STAGE, "rotational_deflection", rotational);
    trace.record(STAGE, "heel_deflection", state.heel);
    trace.record(STAGE, "total_deflection", total);

    let total = round12(total);
    DeflectionResults {
        sls_moment: round12(nmm_to_knm(state.moment)),
        stress: round12(state.stress),
        secant_modulus: round12(state.secant),
        tip_deflection: round12(tip),
        rotation: round12(rotation),
        rotational_deflection: round12(rotational),
        heel_deflection: round12(state.heel),
        total_deflection: total,
        limit: round12(limit),
        utilisation: round12(utilisation),
        iterations,
        converged: true,
        passes: total <= limit,
        notes: Vec::new(),
    }
}
