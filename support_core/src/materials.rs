//! # Materials and Safety Factors
//!
//! All material constants the verification pipeline needs, gathered into
//! immutable values that are passed explicitly into every stage.
//!
//! - [`MaterialProperties`] - austenitic stainless steel for brackets, angles and bolts
//! - [`ConcreteProperties`] - slab concrete for the fixing compression block
//! - [`SafetyFactors`] - partial factors and the ULS load factor
//! - [`BoltSize`] - metric bolt sizes with stress area and hole diameter
//!
//! ## Example
//!
//! ```rust
//! use support_core::materials::{BoltSize, MaterialProperties, SafetyFactors};
//!
//! let steel = MaterialProperties::default();
//! let factors = SafetyFactors::default();
//! assert_eq!(steel.yield_strength, 210.0);
//!
//! // Shear resistance of one M10 bolt (kN)
//! let fv = BoltSize::M10.shear_resistance_kn(&steel, &factors);
//! assert!((fv - 19.488).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Steel properties for brackets, angles and bolts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialProperties {
    /// 0.2% proof strength f_y (N/mm²)
    pub yield_strength: f64,

    /// Young's modulus E (N/mm²)
    pub youngs_modulus: f64,

    /// Ramberg-Osgood non-linearity index n
    pub ramberg_osgood_n: f64,

    /// Bolt ultimate tensile strength f_ub (N/mm²), property class 70
    pub bolt_ultimate_strength: f64,

    /// Steel density (kg/mm³)
    pub density_kg_per_mm3: f64,
}

impl Default for MaterialProperties {
    fn default() -> Self {
        MaterialProperties {
            yield_strength: 210.0,
            youngs_modulus: 200_000.0,
            ramberg_osgood_n: 8.0,
            bolt_ultimate_strength: 700.0,
            density_kg_per_mm3: 7.93e-6,
        }
    }
}

impl MaterialProperties {
    /// Material factor ε = √(235/f_y · E/210000) used for section classification
    pub fn epsilon(&self) -> f64 {
        ((235.0 / self.yield_strength) * (self.youngs_modulus / 210_000.0)).sqrt()
    }

    /// Validate that every property is physically meaningful
    pub fn validate(&self) -> CalcResult<()> {
        let checks = [
            ("yield_strength", self.yield_strength),
            ("youngs_modulus", self.youngs_modulus),
            ("ramberg_osgood_n", self.ramberg_osgood_n),
            ("bolt_ultimate_strength", self.bolt_ultimate_strength),
            ("density_kg_per_mm3", self.density_kg_per_mm3),
        ];
        for (field, value) in checks {
            if !(value.is_finite() && value > 0.0) {
                return Err(CalcError::config(format!(
                    "material property '{}' must be positive, got {}",
                    field, value
                )));
            }
        }
        Ok(())
    }
}

/// Slab concrete used in the fixing equilibrium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcreteProperties {
    /// Characteristic cylinder strength f_ck (N/mm²)
    pub characteristic_strength: f64,

    /// Long-term coefficient α_cc
    pub alpha_cc: f64,

    /// Partial factor for concrete γ_c
    pub gamma_c: f64,

    /// Width of the bracket back plate bearing on the slab edge (mm)
    pub bearing_width: f64,
}

impl Default for ConcreteProperties {
    fn default() -> Self {
        ConcreteProperties {
            characteristic_strength: 30.0,
            alpha_cc: 0.85,
            gamma_c: 1.5,
            bearing_width: 56.0,
        }
    }
}

impl ConcreteProperties {
    /// Design compressive strength f_cd = α_cc·f_ck/γ_c (N/mm²)
    pub fn design_strength(&self) -> f64 {
        self.alpha_cc * self.characteristic_strength / self.gamma_c
    }

    /// Compression block force per mm of block length (N/mm)
    pub fn block_stiffness(&self) -> f64 {
        self.design_strength() * self.bearing_width
    }
}

/// Partial safety factors and the ULS load factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyFactors {
    /// Resistance of cross-sections γ_M0
    pub gamma_m0: f64,

    /// Resistance of bolts γ_M2
    pub gamma_m2: f64,

    /// Factor applied to the characteristic line load for ULS
    pub uls_load_factor: f64,
}

impl Default for SafetyFactors {
    fn default() -> Self {
        SafetyFactors {
            gamma_m0: 1.1,
            gamma_m2: 1.25,
            uls_load_factor: 1.35,
        }
    }
}

/// Bolt tension reduction used in every combined shear/tension interaction
pub const BOLT_TENSION_INTERACTION_FACTOR: f64 = 1.4;

/// Metric bolt sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BoltSize {
    M10,
    M12,
    M16,
}

impl BoltSize {
    /// Sizes the optimizer enumerates
    pub const SEARCHED: [BoltSize; 2] = [BoltSize::M10, BoltSize::M12];

    /// Nominal diameter d (mm)
    pub fn diameter(&self) -> f64 {
        match self {
            BoltSize::M10 => 10.0,
            BoltSize::M12 => 12.0,
            BoltSize::M16 => 16.0,
        }
    }

    /// Tensile stress area A_s (mm²)
    pub fn stress_area(&self) -> f64 {
        match self {
            BoltSize::M10 => 58.0,
            BoltSize::M12 => 84.3,
            BoltSize::M16 => 157.0,
        }
    }

    /// Clearance hole diameter d0 (mm)
    pub fn hole_diameter(&self) -> f64 {
        match self {
            BoltSize::M10 => 11.0,
            BoltSize::M12 => 13.0,
            BoltSize::M16 => 18.0,
        }
    }

    /// Minimum end distance e1 = 1.2·d0 (mm)
    pub fn min_edge_distance(&self) -> f64 {
        1.2 * self.hole_diameter()
    }

    /// Shear resistance per shear plane F_v,Rd = 0.6·f_ub·A_s/γ_M2 (kN)
    pub fn shear_resistance_kn(&self, steel: &MaterialProperties, factors: &SafetyFactors) -> f64 {
        0.6 * steel.bolt_ultimate_strength * self.stress_area() / factors.gamma_m2 / 1000.0
    }

    /// Tension resistance F_t,Rd = 0.9·f_ub·A_s/γ_M2 (kN)
    pub fn tension_resistance_kn(&self, steel: &MaterialProperties, factors: &SafetyFactors) -> f64 {
        0.9 * steel.bolt_ultimate_strength * self.stress_area() / factors.gamma_m2 / 1000.0
    }
}

impl std::fmt::Display for BoltSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BoltSize::M10 => "M10",
            BoltSize::M12 => "M12",
            BoltSize::M16 => "M16",
        };
        write!(f, "{}", name)
    }
}
