//! # Engine Settings
//!
//! Every tunable constant of the engine in one serializable value. Settings
//! files (TOML or JSON) may be partial: any omitted field keeps its default.
//!
//! ```toml
//! [material]
//! yield_strength = 210.0
//!
//! [limits]
//! angle_deflection = 1.5
//! system_deflection = 2.0
//!
//! [search]
//! max_alternatives = 5
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::materials::{ConcreteProperties, MaterialProperties, SafetyFactors};

/// Upper bound on `search.max_alternatives`
pub const MAX_ALTERNATIVES_LIMIT: usize = 1000;

/// Serviceability deflection limits (mm).
///
/// The angle-level and system-level limits are deliberately separate values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeflectionLimits {
    /// Angle deflection at the masonry load point
    pub angle_deflection: f64,

    /// Total system deflection (angle + drop + span)
    pub system_deflection: f64,

    /// Lateral deflection of a bracket dropping below the slab soffit
    pub drop_below_slab: f64,
}

impl Default for DeflectionLimits {
    fn default() -> Self {
        DeflectionLimits {
            angle_deflection: 1.5,
            system_deflection: 2.0,
            drop_below_slab: 1.5,
        }
    }
}

/// Search behaviour of the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Number of runner-up designs reported alongside the optimum
    pub max_alternatives: usize,

    /// Candidates evaluated between progress reports
    pub chunk_size: usize,

    /// Evaluate each chunk on the rayon pool (ignored without the `parallel` feature)
    pub parallel: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            max_alternatives: 10,
            chunk_size: 2048,
            parallel: true,
        }
    }
}

/// All engine constants.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub material: MaterialProperties,
    pub concrete: ConcreteProperties,
    pub factors: SafetyFactors,
    pub limits: DeflectionLimits,
    pub search: SearchSettings,
}

impl EngineSettings {
    /// Parse settings from TOML text and validate them
    pub fn from_toml_str(text: &str) -> CalcResult<Self> {
        let settings: EngineSettings =
            toml::from_str(text).map_err(|e| CalcError::config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from JSON text and validate them
    pub fn from_json_str(text: &str) -> CalcResult<Self> {
        let settings: EngineSettings =
            serde_json::from_str(text).map_err(|e| CalcError::config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Render settings as TOML
    pub fn to_toml_string(&self) -> CalcResult<String> {
        toml::to_string_pretty(self).map_err(|e| CalcError::SerializationError {
            reason: e.to_string(),
        })
    }

    /// Check that every constant is usable
    pub fn validate(&self) -> CalcResult<()> {
        self.material.validate()?;

        let positive = [
            ("concrete.characteristic_strength", self.concrete.characteristic_strength),
            ("concrete.alpha_cc", self.concrete.alpha_cc),
            ("concrete.gamma_c", self.concrete.gamma_c),
            ("concrete.bearing_width", self.concrete.bearing_width),
            ("factors.gamma_m0", self.factors.gamma_m0),
            ("factors.gamma_m2", self.factors.gamma_m2),
            ("factors.uls_load_factor", self.factors.uls_load_factor),
            ("limits.angle_deflection", self.limits.angle_deflection),
            ("limits.system_deflection", self.limits.system_deflection),
            ("limits.drop_below_slab", self.limits.drop_below_slab),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CalcError::config(format!(
                    "'{}' must be positive, got {}",
                    field, value
                )));
            }
        }

        if self.search.chunk_size == 0 {
            return Err(CalcError::config("'search.chunk_size' must be at least 1"));
        }
        if self.search.max_alternatives > MAX_ALTERNATIVES_LIMIT {
            return Err(CalcError::config(format!(
                "'search.max_alternatives' must be at most {}, got {}",
                MAX_ALTERNATIVES_LIMIT, self.search.max_alternatives
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(EngineSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let settings = EngineSettings::from_toml_str(
            r#"
            [limits]
            system_deflection = 3.0

            [search]
            max_alternatives = 3
            "#,
        )
        .unwrap();
        assert_eq!(settings.limits.system_deflection, 3.0);
        assert_eq!(settings.limits.angle_deflection, 1.5);
        assert_eq!(settings.search.max_alternatives, 3);
        assert_eq!(settings.material.yield_strength, 210.0);
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = EngineSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed = EngineSettings::from_json_str(&json).unwrap();
        assert_eq!(settings, parsed);
    }

    #[test]
    fn test_toml_roundtrip() {
        let settings = EngineSettings::default();
        let text = settings.to_toml_string().unwrap();
        let parsed = EngineSettings::from_toml_str(&text).unwrap();
        assert_eq!(settings, parsed);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = EngineSettings::from_toml_str("[factors]\ngamma_m0 = -1.0").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");

        let err = EngineSettings::from_toml_str("[search]\nchunk_size = 0").unwrap_err();
        assert!(err.to_string().contains("chunk_size"));
    }

    #[test]
    fn test_rejects_huge_alternative_count() {
        let err = EngineSettings::from_json_str(
            r#"{"search":{"max_alternatives":18446744073709551615}}"#,
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("max_alternatives"));

        let mut settings = EngineSettings::default();
        settings.search.max_alternatives = MAX_ALTERNATIVES_LIMIT;
        assert!(settings.validate().is_ok());
        settings.search.max_alternatives = MAX_ALTERNATIVES_LIMIT + 1;
        assert!(settings.validate().is_err());
    }
}
