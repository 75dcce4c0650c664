//! # Verification Engine
//!
//! Ten structural checks run in a fixed order over one resolved candidate.
//! Each stage is a pure function of the inputs, the mathematical model and
//! the results of earlier stages; nothing is shared between candidates.
//!
//! | # | stage | module |
//! |---|-------|--------|
//! | 1 | mathematical model (no pass/fail) | [`model`] |
//! | 2 | moment resistance | [`moment`] |
//! | 3 | shear resistance | [`shear`] |
//! | 4 | angle deflection | [`deflection`] |
//! | 5 | angle-to-bracket connection | [`bolt_connection`] |
//! | 6 | combined tension/shear at the fixing | [`combined`] |
//! | 7 | fixing | [`fixing`] |
//! | 8 | dropping below slab | [`drop_below_slab`] |
//! | 9 | total deflection | [`total_deflection`] |
//! | 10 | packer | [`packer`] |
//! | 11 | bracket design | [`bracket_design`] |
//!
//! A failing check is data (`passes: false`), never an error.
//!
//! ## Example
//!
//! ```rust
//! use support_core::channels::ChannelStore;
//! use support_core::geometry::resolve;
//! use support_core::inputs::DesignInputs;
//! use support_core::materials::BoltSize;
//! use support_core::params::{AngleOrientation, BracketType, GeneticParameters};
//! use support_core::settings::EngineSettings;
//! use support_core::verification::{verify, trace::RecordingTrace};
//!
//! let inputs = DesignInputs::new(225.0, 200.0, -200.0, 14.0, 102.5);
//! let params = GeneticParameters {
//!     bracket_centres: 500.0,
//!     bracket_thickness: 4.0,
//!     angle_thickness: 6.0,
//!     bolt_size: BoltSize::M10,
//!     bracket_type: BracketType::Standard,
//!     angle_orientation: AngleOrientation::Standard,
//!     fixing_position: 75.0,
//!     dim_d: None,
//!     channel_type: Some("CPRO50".to_string()),
//! };
//! let geometry = resolve(&inputs, &params).unwrap();
//! let channels = ChannelStore::embedded().unwrap();
//!
//! let mut trace = RecordingTrace::new();
//! let result = verify(&inputs, &params, &geometry, &EngineSettings::default(), channels, &mut trace);
//! assert!(result.passes);
//! assert_eq!(result.model.design_udl, 18.9);
//! ```

pub mod bolt_connection;
pub mod bracket_design;
pub mod combined;
pub mod deflection;
pub mod drop_below_slab;
pub mod fixing;
pub mod model;
pub mod moment;
pub mod packer;
pub mod shear;
pub mod total_deflection;
pub mod trace;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::channels::{ChannelMatch, ChannelStore};
use crate::geometry::ResolvedGeometry;
use crate::inputs::{DesignInputs, FixingMethod};
use crate::materials::BoltSize;
use crate::params::GeneticParameters;
use crate::settings::EngineSettings;
use crate::units::round12;

pub use bolt_connection::AngleToBracketResults;
pub use bracket_design::BracketDesignResults;
pub use combined::CombinedResults;
pub use deflection::DeflectionResults;
pub use drop_below_slab::DropBelowSlabResults;
pub use fixing::FixingResults;
pub use model::{MathematicalModel, ModelResults};
pub use moment::MomentResults;
pub use packer::PackerResults;
pub use shear::ShearResults;
pub use total_deflection::TotalDeflectionResults;
pub use trace::{LogTrace, NoTrace, RecordingTrace, VerificationTrace};

/// Names of the ten checks, in pipeline order
pub const CHECK_NAMES: [&str; 10] = [
    "moment",
    "shear",
    "angle_deflection",
    "angle_to_bracket",
    "combined_tension_shear",
    "fixing",
    "dropping_below_slab",
    "total_deflection",
    "packer",
    "bracket_design",
];

/// Capacities the slab fixing is checked against.
#[derive(Debug, Clone)]
pub enum Anchorage<'a> {
    /// Cast-in channel row from the capacity table
    Channel(ChannelMatch<'a>),
    /// Bolt into a steel edge beam
    SteelBolt(BoltSize),
    /// No capacity data; dependent checks fail
    Unavailable { reason: String },
}

/// Pick the fixing capacities for a candidate.
pub fn resolve_anchorage<'a>(
    inputs: &DesignInputs,
    params: &GeneticParameters,
    channels: &'a ChannelStore,
) -> Anchorage<'a> {
    if inputs.fixing_method == FixingMethod::Steel {
        return Anchorage::SteelBolt(params.bolt_size);
    }
    let Some(channel_type) = params.channel_type.as_deref() else {
        return Anchorage::Unavailable {
            reason: "channel fixing requires a channel type".to_string(),
        };
    };
    match channels.lookup(channel_type, inputs.slab_thickness, params.bracket_centres) {
        Ok(matched) => Anchorage::Channel(matched),
        Err(e) => Anchorage::Unavailable {
            reason: e.to_string(),
        },
    }
}

/// One line of the check summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckSummary {
    pub name: &'static str,
    /// Demand over capacity (%)
    pub utilisation: f64,
    pub passes: bool,
}

/// Results of all ten checks for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub model: ModelResults,
    pub moment: MomentResults,
    pub shear: ShearResults,
    pub angle_deflection: DeflectionResults,
    pub angle_to_bracket: AngleToBracketResults,
    pub combined_tension_shear: CombinedResults,
    pub fixing: FixingResults,
    pub dropping_below_slab: DropBelowSlabResults,
    pub total_deflection: TotalDeflectionResults,
    pub packer: PackerResults,
    pub bracket_design: BracketDesignResults,
    /// AND of the ten checks
    pub passes: bool,
}

impl VerificationResult {
    /// Every check with its utilisation, in pipeline order
    pub fn summaries(&self) -> Vec<CheckSummary> {
        let combined = &self.combined_tension_shear;
        let utilisations = [
            (self.moment.utilisation, self.moment.passes),
            (self.shear.utilisation, self.shear.passes),
            (self.angle_deflection.utilisation, self.angle_deflection.passes),
            (
                self.angle_to_bracket.combined_utilisation,
                self.angle_to_bracket.passes,
            ),
            (
                combined.power_interaction.max(combined.linear_interaction) * 100.0,
                combined.passes,
            ),
            (self.fixing.utilisation(), self.fixing.passes),
            (
                self.dropping_below_slab.utilisation,
                self.dropping_below_slab.passes,
            ),
            (self.total_deflection.utilisation, self.total_deflection.passes),
            (self.packer.combined_utilisation, self.packer.passes),
            (self.bracket_design.utilisation, self.bracket_design.passes),
        ];
        CHECK_NAMES
            .iter()
            .zip(utilisations)
            .map(|(&name, (utilisation, passes))| CheckSummary {
                name,
                utilisation: round12(utilisation),
                passes,
            })
            .collect()
    }

    /// Names of the checks that failed, in pipeline order
    pub fn failed_checks(&self) -> Vec<&'static str> {
        self.summaries()
            .into_iter()
            .filter(|s| !s.passes)
            .map(|s| s.name)
            .collect()
    }

    /// The check with the highest utilisation
    pub fn governing_check(&self) -> Option<CheckSummary> {
        self.summaries()
            .into_iter()
            .max_by(|a, b| a.utilisation.total_cmp(&b.utilisation))
    }
}

/// Run the full pipeline over one resolved candidate.
pub fn verify(
    inputs: &DesignInputs,
    params: &GeneticParameters,
    geometry: &ResolvedGeometry,
    settings: &EngineSettings,
    channels: &ChannelStore,
    trace: &mut dyn VerificationTrace,
) -> VerificationResult {
    let steel = &settings.material;
    let factors = &settings.factors;
    let limits = &settings.limits;

    let model = model::calculate(inputs, params, geometry, factors, trace);
    let anchorage = resolve_anchorage(inputs, params, channels);

    let moment = moment::calculate(&model, steel, factors, trace);
    let shear = shear::calculate(&model, steel, factors, trace);
    let angle_deflection = deflection::calculate(&model, steel, limits.angle_deflection, trace);
    let angle_to_bracket =
        bolt_connection::calculate(&model, geometry, params.bolt_size, steel, factors, trace);
    let combined_tension_shear =
        combined::calculate(&model, geometry, &anchorage, steel, factors, trace);
    let fixing = fixing::calculate(
        &model,
        geometry,
        params.fixing_position,
        inputs.slab_thickness,
        &anchorage,
        steel,
        &settings.concrete,
        factors,
        trace,
    );
    let dropping_below_slab = drop_below_slab::calculate(
        &model,
        geometry.drop_below_slab,
        steel,
        limits.drop_below_slab,
        trace,
    );
    let total_deflection = total_deflection::calculate(
        &model,
        &angle_deflection,
        &dropping_below_slab,
        steel,
        limits.system_deflection,
        trace,
    );
    let packer = packer::calculate(&angle_to_bracket, inputs.packer_thickness, trace);
    let bracket_design = bracket_design::calculate(
        &model,
        geometry.bracket_height,
        params.bracket_thickness,
        steel,
        factors,
        trace,
    );

    let passes = moment.passes
        && shear.passes
        && angle_deflection.passes
        && angle_to_bracket.passes
        && combined_tension_shear.passes
        && fixing.passes
        && dropping_below_slab.passes
        && total_deflection.passes
        && packer.passes
        && bracket_design.passes;

    let result = VerificationResult {
        model: model.results(),
        moment,
        shear,
        angle_deflection,
        angle_to_bracket,
        combined_tension_shear,
        fixing,
        dropping_below_slab,
        total_deflection,
        packer,
        bracket_design,
        passes,
    };

    if !passes {
        debug!(failed = ?result.failed_checks(), "candidate failed verification");
    }
    result
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::model::{self, MathematicalModel};
    use crate::geometry::{resolve, ResolvedGeometry};
    use crate::inputs::DesignInputs;
    use crate::materials::{BoltSize, SafetyFactors};
    use crate::params::{AngleOrientation, BracketType, GeneticParameters};
    use crate::verification::trace::NoTrace;

    /// Reference load case: 225 slab, SSL −200, 200 cavity, 14 kN/m, 102.5 brick
    pub fn fixture_inputs() -> DesignInputs {
        DesignInputs::new(225.0, 200.0, -200.0, 14.0, 102.5)
    }

    pub fn fixture_params() -> GeneticParameters {
        GeneticParameters {
            bracket_centres: 500.0,
            bracket_thickness: 4.0,
            angle_thickness: 6.0,
            bolt_size: BoltSize::M10,
            bracket_type: BracketType::Standard,
            angle_orientation: AngleOrientation::Standard,
            fixing_position: 75.0,
            dim_d: None,
            channel_type: Some("CPRO50".to_string()),
        }
    }

    pub fn fixture_candidate() -> (DesignInputs, GeneticParameters, ResolvedGeometry) {
        let inputs = fixture_inputs();
        let params = fixture_params();
        let geometry = resolve(&inputs, &params).unwrap();
        (inputs, params, geometry)
    }

    pub fn fixture_model() -> MathematicalModel {
        let (inputs, params, geometry) = fixture_candidate();
        model::calculate(&inputs, &params, &geometry, &SafetyFactors::default(), &mut NoTrace)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::geometry::resolve;
    use crate::units::has_at_most_12_decimals;
    use proptest::prelude::*;

    fn run(inputs: &DesignInputs, params: &GeneticParameters) -> VerificationResult {
        let geometry = resolve(inputs, params).unwrap();
        let channels = ChannelStore::embedded().unwrap();
        verify(
            inputs,
            params,
            &geometry,
            &EngineSettings::default(),
            channels,
            &mut NoTrace,
        )
    }

    fn all_numbers_rounded(value: &serde_json::Value) -> bool {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map_or(true, has_at_most_12_decimals),
            serde_json::Value::Array(items) => items.iter().all(all_numbers_rounded),
            serde_json::Value::Object(map) => map.values().all(all_numbers_rounded),
            _ => true,
        }
    }

    #[test]
    fn test_fixture_passes_every_check() {
        let result = run(&fixture_inputs(), &fixture_params());
        assert_eq!(result.model.design_udl, 18.9);
        assert_eq!(result.model.shear_force, 9.45);
        assert_eq!(result.model.design_cavity, 220.0);
        assert_eq!(result.model.eccentricity, 34.166666666667);
        assert!(result.failed_checks().is_empty(), "{:?}", result.failed_checks());
        assert!(result.passes);
    }

    #[test]
    fn test_governing_check_is_moment() {
        let result = run(&fixture_inputs(), &fixture_params());
        let governing = result.governing_check().unwrap();
        assert_eq!(governing.name, "moment");
        assert_eq!(result.summaries().len(), CHECK_NAMES.len());
    }

    #[test]
    fn test_unknown_channel_fails_dependent_checks() {
        let mut params = fixture_params();
        params.channel_type = Some("CPRO99".to_string());
        let result = run(&fixture_inputs(), &params);
        assert!(!result.passes);
        let failed = result.failed_checks();
        assert!(failed.contains(&"combined_tension_shear"));
        assert!(failed.contains(&"fixing"));
        assert!(result.fixing.notes[0].contains("CPRO99"));
    }

    #[test]
    fn test_steel_fixing_needs_no_channel() {
        let mut inputs = fixture_inputs();
        inputs.fixing_method = FixingMethod::Steel;
        let mut params = fixture_params();
        params.channel_type = None;
        params.bolt_size = BoltSize::M12;
        let result = run(&inputs, &params);
        assert!(result.fixing.steel_interaction.is_some());
        assert!(result.combined_tension_shear.notes.is_empty());
    }

    #[test]
    fn test_recording_trace_captures_every_stage() {
        let inputs = fixture_inputs();
        let params = fixture_params();
        let geometry = resolve(&inputs, &params).unwrap();
        let mut trace = RecordingTrace::new();
        verify(
            &inputs,
            &params,
            &geometry,
            &EngineSettings::default(),
            ChannelStore::embedded().unwrap(),
            &mut trace,
        );
        for stage in ["model", "moment", "shear", "fixing", "bracket_design"] {
            assert!(trace.stage(stage).next().is_some(), "no entries for {}", stage);
        }
        assert_eq!(trace.value("model", "design_udl"), Some(14.0 * 1.35));
    }

    #[test]
    fn test_heavier_load_fails_fixture_candidate() {
        let mut inputs = fixture_inputs();
        inputs.characteristic_load = 20.0;
        let result = run(&inputs, &fixture_params());
        assert!(!result.passes);
        assert!(result.failed_checks().contains(&"moment"));
    }

    proptest! {
        #[test]
        fn prop_every_returned_number_has_12_decimals(
            load in 2.0f64..20.0,
            cavity in 100.0f64..250.0,
            masonry in 90.0f64..140.0,
            support in -300.0f64..-150.0,
            packer in proptest::option::of(1.0f64..12.0),
        ) {
            let mut inputs = DesignInputs::new(225.0, cavity, support, load, masonry);
            inputs.packer_thickness = packer;
            let params = fixture_params();
            if let Ok(geometry) = resolve(&inputs, &params) {
                let result = verify(
                    &inputs,
                    &params,
                    &geometry,
                    &EngineSettings::default(),
                    ChannelStore::embedded().unwrap(),
                    &mut NoTrace,
                );
                let json = serde_json::to_value(&result).unwrap();
                prop_assert!(all_numbers_rounded(&json));
            }
        }

        #[test]
        fn prop_moment_utilisation_grows_with_load(load in 1.0f64..20.0, extra in 0.1f64..5.0) {
            let mut light = fixture_inputs();
            light.characteristic_load = load;
            let mut heavy = light.clone();
            heavy.characteristic_load = load + extra;

            let a = run(&light, &fixture_params());
            let b = run(&heavy, &fixture_params());
            prop_assert!(b.moment.utilisation >= a.moment.utilisation);
            prop_assert!(b.angle_to_bracket.combined_utilisation >= a.angle_to_bracket.combined_utilisation);
        }
    }
}
