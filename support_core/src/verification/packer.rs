//! Packer reduction of the angle bolt shear resistance.
//!
//! A packer of thickness t_p between angle and bracket reduces the bolt shear
//! resistance by `β = min(9d/(8d + 3t_p), 1)`. Without a packer the
//! connection results pass through unchanged with β = 1.

use serde::{Deserialize, Serialize};

use super::bolt_connection::AngleToBracketResults;
use super::trace::VerificationTrace;
use crate::units::round12;

const STAGE: &str = "packer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackerResults {
    /// Packer thickness t_p (mm), zero when absent
    pub packer_thickness: f64,
    /// Reduction factor β
    pub beta: f64,
    /// β·F_v,Rd (kN)
    pub shear_resistance: f64,
    /// (%)
    pub shear_utilisation: f64,
    /// (%)
    pub tension_utilisation: f64,
    /// (%)
    pub combined_utilisation: f64,
    pub passes: bool,
}

/// β for a bolt of diameter `d` through a packer of thickness `t_p`
pub fn reduction_factor(bolt_diameter: f64, packer_thickness: f64) -> f64 {
    (9.0 * bolt_diameter / (8.0 * bolt_diameter + 3.0 * packer_thickness)).min(1.0)
}

pub fn calculate(
    connection: &AngleToBracketResults,
    packer_thickness: Option<f64>,
    trace: &mut dyn VerificationTrace,
) -> PackerResults {
    let Some(tp) = packer_thickness.filter(|t| *t > 0.0) else {
        trace.record(STAGE, "beta", 1.0);
        return PackerResults {
            packer_thickness: 0.0,
            beta: 1.0,
            shear_resistance: connection.shear_resistance,
            shear_utilisation: connection.shear_utilisation,
            tension_utilisation: connection.tension_utilisation,
            combined_utilisation: connection.combined_utilisation,
            passes: connection.passes,
        };
    };

    let beta = reduction_factor(connection.bolt_size.diameter(), tp);
    let fv = beta * connection.shear_resistance;
    let shear_util = connection.shear_force / fv * 100.0;
    let combined = shear_util + connection.tension_utilisation;

    trace.record(STAGE, "beta", beta);
    trace.record(STAGE, "combined_utilisation", combined);

    let combined = round12(combined);
    PackerResults {
        packer_thickness: round12(tp),
        beta: round12(beta),
        shear_resistance: round12(fv),
        shear_utilisation: round12(shear_util),
        tension_utilisation: connection.tension_utilisation,
        combined_utilisation: combined,
        passes: combined <= 100.0 && connection.edge_distance_ratio >= 1.0,
    }
}
