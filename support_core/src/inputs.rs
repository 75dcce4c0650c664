//! # Design Inputs
//!
//! The load case and site geometry for one optimization run. Created once,
//! never mutated. The form layer that collects these values is responsible for
//! range and increment validation; [`DesignInputs::validate`] is provided for
//! adapters (such as the CLI) that have no form layer of their own.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "slab_thickness": 225.0,
//!   "cavity_width": 200.0,
//!   "support_level": -200.0,
//!   "characteristic_load": 14.0,
//!   "masonry_thickness": 102.5,
//!   "fixing_position": "Auto",
//!   "fixing_method": "Channel"
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Default angle vertical leg (mm)
pub const DEFAULT_VERTICAL_LEG: f64 = 60.0;

/// How the fixing position on the slab edge is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum FixingPositionMode {
    /// Search every 5 mm position inside the safe range
    #[default]
    Auto,
    /// Use this single position (mm below slab top), even outside the safe range
    Custom(f64),
}

/// How brackets are fixed to the structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FixingMethod {
    /// Cast-in anchor channel in a concrete slab
    #[default]
    Channel,
    /// Bolted directly to a steel edge beam
    Steel,
}

/// Notch cut into the bottom course of masonry to receive the angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Notch {
    /// Notch height (mm); the angle's horizontal leg must fit inside it
    pub height: f64,
    /// Notch depth into the masonry (mm)
    pub depth: f64,
}

/// Angle-extension configuration (exclusion zone below the slab).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AngleExtension {
    /// Lengthen the angle instead of rejecting over-height brackets
    pub enabled: bool,
    /// Maximum allowable bracket height (mm)
    pub max_bracket_height: Option<f64>,
}

impl AngleExtension {
    /// The active bracket height limit, if any
    pub fn limit(&self) -> Option<f64> {
        self.max_bracket_height
    }
}

/// Inputs for one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignInputs {
    /// Slab thickness (mm)
    pub slab_thickness: f64,

    /// Cavity between slab edge and masonry inner face (mm)
    pub cavity_width: f64,

    /// Angle bearing level relative to structural slab level (mm, negative below)
    pub support_level: f64,

    /// Characteristic masonry line load (kN/m)
    pub characteristic_load: f64,

    /// Masonry leaf thickness (mm)
    pub masonry_thickness: f64,

    /// Facade thickness used with `load_position` for the eccentricity (mm)
    #[serde(default)]
    pub facade_thickness: Option<f64>,

    /// Load position as a fraction of the facade thickness (0-1)
    #[serde(default)]
    pub load_position: Option<f64>,

    /// Optional masonry notch
    #[serde(default)]
    pub notch: Option<Notch>,

    #[serde(default)]
    pub fixing_position: FixingPositionMode,

    #[serde(default)]
    pub angle_extension: AngleExtension,

    #[serde(default)]
    pub fixing_method: FixingMethod,

    /// Packer (shim) thickness behind the angle bolt (mm)
    #[serde(default)]
    pub packer_thickness: Option<f64>,

    /// Angle vertical leg before any extension (mm)
    #[serde(default = "default_vertical_leg")]
    pub angle_vertical_leg: f64,

    /// Restrict the search to these channel families (default: all)
    #[serde(default)]
    pub channel_types: Option<Vec<String>>,

    /// Restrict the search to these bracket centres (default: 200-600 step 50)
    #[serde(default)]
    pub bracket_centres: Option<Vec<f64>>,
}

fn default_vertical_leg() -> f64 {
    DEFAULT_VERTICAL_LEG
}

impl DesignInputs {
    /// Minimal inputs with every optional setting at its default
    pub fn new(
        slab_thickness: f64,
        cavity_width: f64,
        support_level: f64,
        characteristic_load: f64,
        masonry_thickness: f64,
    ) -> Self {
        DesignInputs {
            slab_thickness,
            cavity_width,
            support_level,
            characteristic_load,
            masonry_thickness,
            facade_thickness: None,
            load_position: None,
            notch: None,
            fixing_position: FixingPositionMode::Auto,
            angle_extension: AngleExtension::default(),
            fixing_method: FixingMethod::Channel,
            packer_thickness: None,
            angle_vertical_leg: DEFAULT_VERTICAL_LEG,
            channel_types: None,
            bracket_centres: None,
        }
    }

    /// Facade thickness and load position, when both are supplied
    pub fn facade_load(&self) -> Option<(f64, f64)> {
        match (self.facade_thickness, self.load_position) {
            (Some(thickness), Some(position)) => Some((thickness, position)),
            _ => None,
        }
    }

    /// Boundary validation for adapters without a form layer.
    pub fn validate(&self) -> CalcResult<()> {
        let positive = [
            ("slab_thickness", self.slab_thickness),
            ("cavity_width", self.cavity_width),
            ("characteristic_load", self.characteristic_load),
            ("masonry_thickness", self.masonry_thickness),
            ("angle_vertical_leg", self.angle_vertical_leg),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Must be a positive number",
                ));
            }
        }

        if !self.support_level.is_finite() {
            return Err(CalcError::invalid_input(
                "support_level",
                self.support_level.to_string(),
                "Must be a finite number",
            ));
        }

        if self.slab_thickness < 150.0 || self.slab_thickness > 500.0 {
            return Err(CalcError::invalid_input(
                "slab_thickness",
                self.slab_thickness.to_string(),
                "Slab thickness must be between 150 and 500 mm",
            ));
        }

        if self.facade_thickness.is_some() != self.load_position.is_some() {
            return Err(CalcError::invalid_input(
                "load_position",
                format!("{:?}", self.load_position),
                "Facade thickness and load position must be given together",
            ));
        }
        if let Some(position) = self.load_position {
            if !(0.0..=1.0).contains(&position) {
                return Err(CalcError::invalid_input(
                    "load_position",
                    position.to_string(),
                    "Load position is a fraction between 0 and 1",
                ));
            }
        }

        if let Some(notch) = self.notch {
            if notch.height <= 0.0 || notch.depth < 0.0 {
                return Err(CalcError::invalid_input(
                    "notch",
                    format!("{}x{}", notch.height, notch.depth),
                    "Notch height must be positive and depth non-negative",
                ));
            }
        }

        if let FixingPositionMode::Custom(position) = self.fixing_position {
            if !(position > 0.0 && position < self.slab_thickness) {
                return Err(CalcError::invalid_input(
                    "fixing_position",
                    position.to_string(),
                    "Custom fixing position must lie within the slab",
                ));
            }
        }

        if let Some(limit) = self.angle_extension.max_bracket_height {
            if !(limit.is_finite() && limit > 0.0) {
                return Err(CalcError::invalid_input(
                    "angle_extension.max_bracket_height",
                    limit.to_string(),
                    "Bracket height limit must be positive",
                ));
            }
        }

        if let Some(packer) = self.packer_thickness {
            if packer < 0.0 {
                return Err(CalcError::invalid_input(
                    "packer_thickness",
                    packer.to_string(),
                    "Packer thickness cannot be negative",
                ));
            }
        }

        if let Some(centres) = &self.bracket_centres {
            if centres.is_empty() || centres.iter().any(|c| !(*c > 0.0)) {
                return Err(CalcError::invalid_input(
                    "bracket_centres",
                    format!("{:?}", centres),
                    "Bracket centres must be a non-empty list of positive values",
                ));
            }
        }

        if let Some(types) = &self.channel_types {
            if types.is_empty() {
                return Err(CalcError::invalid_input(
                    "channel_types",
                    "[]",
                    "Give at least one channel type or omit the filter",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> DesignInputs {
        DesignInputs::new(225.0, 200.0, -200.0, 14.0, 102.5)
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{
            "slab_thickness": 225.0,
            "cavity_width": 200.0,
            "support_level": -200.0,
            "characteristic_load": 14.0,
            "masonry_thickness": 102.5
        }"#;
        let inputs: DesignInputs = serde_json::from_str(json).unwrap();
        assert_eq!(inputs, fixture());
        assert_eq!(inputs.angle_vertical_leg, 60.0);
    }

    #[test]
    fn test_custom_fixing_json() {
        let json = r#"{
            "slab_thickness": 225.0,
            "cavity_width": 200.0,
            "support_level": -200.0,
            "characteristic_load": 14.0,
            "masonry_thickness": 102.5,
            "fixing_position": { "Custom": 60.0 }
        }"#;
        let inputs: DesignInputs = serde_json::from_str(json).unwrap();
        assert_eq!(inputs.fixing_position, FixingPositionMode::Custom(60.0));
    }

    #[test]
    fn test_validate_fixture() {
        assert!(fixture().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_half_facade_pair() {
        let mut inputs = fixture();
        inputs.facade_thickness = Some(102.5);
        let err = inputs.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_validate_rejects_negative_load() {
        let mut inputs = fixture();
        inputs.characteristic_load = -1.0;
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn test_facade_load_pair() {
        let mut inputs = fixture();
        assert_eq!(inputs.facade_load(), None);
        inputs.facade_thickness = Some(100.0);
        inputs.load_position = Some(0.5);
        assert_eq!(inputs.facade_load(), Some((100.0, 0.5)));
    }
}
