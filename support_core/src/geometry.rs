//! # Geometry Resolver
//!
//! Derives the physical geometry of one candidate: bracket height and
//! projection, rise to bolts, Dim D, drop below the slab soffit, angle legs,
//! and any angle-extension compensation.
//!
//! ## Orientation table
//!
//! Bracket height depends on the (bracket type, angle orientation) pair. The
//! four combinations live in [`GEOMETRY_TABLE`], each entry pointing at a pure
//! height function and a pure rise-reference function:
//!
//! | bracket  | angle    | bracket height                    | rise reference |
//! |----------|----------|-----------------------------------|----------------|
//! | Standard | Standard | −SL − f + head                    | H − head       |
//! | Standard | Inverted | −SL − f + head + (leg − T)        | H − head       |
//! | Inverted | Inverted | SL − T + f + Dim D                | Dim D          |
//! | Inverted | Standard | SL + leg + f + Dim D              | Dim D          |
//!
//! where SL is the support level, f the fixing position, T the angle
//! thickness and head the bracket length above the fixing centre.
//!
//! ## Critical edges
//!
//! A cast-in channel cannot sit closer to the slab top than its tabulated top
//! critical edge, so [`resolve_with_edges`] rejects a fixing position above it.
//! That bounds f from above and so bounds every bracket height in the table.
//! The bottom critical edge is not a hard limit; the fixing check reduces the
//! channel capacity by the edge factor instead.
//!
//! ## Example
//!
//! ```rust
//! use support_core::geometry::resolve;
//! use support_core::inputs::DesignInputs;
//! use support_core::materials::BoltSize;
//! use support_core::params::{AngleOrientation, BracketType, GeneticParameters};
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
//! assert_eq!(geometry.bracket_height, 175.0);
//! assert_eq!(geometry.rise_to_bolts, 110.0);
//! assert_eq!(geometry.rise_to_bolts_display, 125.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::channels::ChannelSpec;
use crate::errors::{CalcError, CalcResult};
use crate::inputs::DesignInputs;
use crate::params::{AngleOrientation, BracketType, GeneticParameters};
use crate::units::{ceil_to_step, floor_to_step, round12};

/// Bracket length above the fixing centre on a standard bracket (mm)
pub const FIXING_HEAD: f64 = 50.0;

/// Half the fixing slot length: worst-case to mid-slot offset (mm)
pub const SLOT_TOLERANCE: f64 = 15.0;

/// Dim D bounds for inverted brackets (mm)
pub const DIM_D_MIN: f64 = 130.0;
pub const DIM_D_MAX: f64 = 450.0;

/// Construction tolerance added to the nominal cavity (mm)
pub const DESIGN_CAVITY_ALLOWANCE: f64 = 20.0;

/// Minimum gap between the angle heel and the masonry (mm)
pub const MIN_HEEL_GAP: f64 = 10.0;

/// Manufacturing increment for brackets and angle legs (mm)
pub const MANUFACTURING_STEP: f64 = 5.0;

/// Shortest angle horizontal leg produced (mm)
pub const MIN_HORIZONTAL_LEG: f64 = 90.0;

/// Width of the bracket back plate against the slab face (mm)
pub const BRACKET_BACK_PLATE_WIDTH: f64 = 56.0;

/// Critical edge distances of the anchor the bracket is fixed to (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalEdges {
    /// Minimum depth of the fixing below the slab top
    pub top: f64,
    /// Slab below the fixing for full capacity
    pub bottom: f64,
}

impl From<&ChannelSpec> for CriticalEdges {
    fn from(spec: &ChannelSpec) -> Self {
        CriticalEdges {
            top: spec.top_critical_edge,
            bottom: spec.bottom_critical_edge,
        }
    }
}

/// Values the orientation table works from.
#[derive(Debug, Clone, Copy)]
pub struct HeightInputs {
    pub support_level: f64,
    pub fixing_position: f64,
    pub angle_thickness: f64,
    pub vertical_leg: f64,
    /// Zero for standard brackets
    pub dim_d: f64,
}

/// One entry of the orientation decision table.
pub struct GeometryRule {
    pub bracket_type: BracketType,
    pub angle_orientation: AngleOrientation,
    /// Natural bracket height
    pub height: fn(&HeightInputs) -> f64,
    /// Rise-to-bolts reference (mid-slot) for a given final bracket height
    pub rise_reference: fn(&HeightInputs, f64) -> f64,
}

fn height_standard_standard(h: &HeightInputs) -> f64 {
    -h.support_level - h.fixing_position + FIXING_HEAD
}

fn height_standard_inverted(h: &HeightInputs) -> f64 {
    -h.support_level - h.fixing_position + FIXING_HEAD + (h.vertical_leg - h.angle_thickness)
}

fn height_inverted_inverted(h: &HeightInputs) -> f64 {
    h.support_level - h.angle_thickness + h.fixing_position + h.dim_d
}

fn height_inverted_standard(h: &HeightInputs) -> f64 {
    h.support_level + h.vertical_leg + h.fixing_position + h.dim_d
}

fn rise_below_fixing(_h: &HeightInputs, bracket_height: f64) -> f64 {
    bracket_height - FIXING_HEAD
}

fn rise_dim_d(h: &HeightInputs, _bracket_height: f64) -> f64 {
    h.dim_d
}

/// The four orientation combinations.
pub const GEOMETRY_TABLE: [GeometryRule; 4] = [
    GeometryRule {
        bracket_type: BracketType::Standard,
        angle_orientation: AngleOrientation::Standard,
        height: height_standard_standard,
        rise_reference: rise_below_fixing,
    },
    GeometryRule {
        bracket_type: BracketType::Standard,
        angle_orientation: AngleOrientation::Inverted,
        height: height_standard_inverted,
        rise_reference: rise_below_fixing,
    },
    GeometryRule {
        bracket_type: BracketType::Inverted,
        angle_orientation: AngleOrientation::Inverted,
        height: height_inverted_inverted,
        rise_reference: rise_dim_d,
    },
    GeometryRule {
        bracket_type: BracketType::Inverted,
        angle_orientation: AngleOrientation::Standard,
        height: height_inverted_standard,
        rise_reference: rise_dim_d,
    },
];

/// Table entry for an orientation pair
pub fn rule_for(bracket_type: BracketType, angle_orientation: AngleOrientation) -> &'static GeometryRule {
    match (bracket_type, angle_orientation) {
        (BracketType::Standard, AngleOrientation::Standard) => &GEOMETRY_TABLE[0],
        (BracketType::Standard, AngleOrientation::Inverted) => &GEOMETRY_TABLE[1],
        (BracketType::Inverted, AngleOrientation::Inverted) => &GEOMETRY_TABLE[2],
        (BracketType::Inverted, AngleOrientation::Standard) => &GEOMETRY_TABLE[3],
    }
}

/// Record of an angle extension applied to a capped bracket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleExtensionResult {
    pub applied: bool,
    /// Bracket height before the cap (mm)
    pub original_bracket_height: f64,
    /// Bracket height after the cap (mm)
    pub limited_bracket_height: f64,
    /// Amount the angle vertical leg was lengthened (mm)
    pub extension: f64,
    pub original_vertical_leg: f64,
    pub extended_vertical_leg: f64,
}

/// Fully derived geometry of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedGeometry {
    /// Bracket height after any extension cap (mm)
    pub bracket_height: f64,

    /// Horizontal reach of the bracket from the slab face (mm)
    pub bracket_projection: f64,

    /// Rise to bolts at the worst-case slot position (mm)
    pub rise_to_bolts: f64,

    /// Rise to bolts at mid-slot, for display (mm)
    pub rise_to_bolts_display: f64,

    /// Bracket bottom to fixing, inverted brackets only (mm)
    pub dim_d: Option<f64>,

    /// How far the bracket extends below the slab soffit; ≤ 0 means it does not (mm)
    pub drop_below_slab: f64,

    /// Cavity plus construction tolerance (mm)
    pub design_cavity: f64,

    /// Gap between angle heel and masonry, d (mm)
    pub heel_gap: f64,

    /// Angle vertical leg including any extension (mm)
    pub angle_vertical_leg: f64,

    /// Angle horizontal leg (mm)
    pub angle_horizontal_leg: f64,

    /// Inside bend radius of the angle (mm)
    pub bend_radius: f64,

    pub angle_extension: Option<AngleExtensionResult>,

    /// Edges the fixing position was checked against, channel fixings only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_edges: Option<CriticalEdges>,
}

fn height_inputs(inputs: &DesignInputs, params: &GeneticParameters, dim_d: f64) -> HeightInputs {
    HeightInputs {
        support_level: inputs.support_level,
        fixing_position: params.fixing_position,
        angle_thickness: params.angle_thickness,
        vertical_leg: inputs.angle_vertical_leg,
        dim_d,
    }
}

/// Bracket height before any extension cap. Cheap enough for pre-filtering.
pub fn natural_bracket_height(inputs: &DesignInputs, params: &GeneticParameters) -> f64 {
    let rule = rule_for(params.bracket_type, params.angle_orientation);
    (rule.height)(&height_inputs(inputs, params, params.dim_d.unwrap_or(0.0)))
}

/// Resolve the geometry of one candidate without anchor edge limits.
pub fn resolve(inputs: &DesignInputs, params: &GeneticParameters) -> CalcResult<ResolvedGeometry> {
    resolve_with_edges(inputs, params, None)
}

/// Resolve the geometry of one candidate, or reject it as infeasible.
///
/// With `edges`, a fixing position above the top critical edge is infeasible.
pub fn resolve_with_edges(
    inputs: &DesignInputs,
    params: &GeneticParameters,
    edges: Option<CriticalEdges>,
) -> CalcResult<ResolvedGeometry> {
    let t = params.angle_thickness;

    if let Some(edges) = edges {
        if params.fixing_position < edges.top {
            return Err(CalcError::infeasible_geometry(format!(
                "fixing at {} mm is above the {} mm top critical edge",
                params.fixing_position, edges.top
            )));
        }
    }

    if let Some(notch) = inputs.notch {
        if notch.height < t {
            return Err(CalcError::infeasible_geometry(format!(
                "angle thickness {} mm does not fit a {} mm notch",
                t, notch.height
            )));
        }
    }

    let dim_d = match params.bracket_type {
        BracketType::Standard => None,
        BracketType::Inverted => Some(resolve_dim_d(inputs, params)?),
    };

    let rule = rule_for(params.bracket_type, params.angle_orientation);
    let hi = height_inputs(inputs, params, dim_d.unwrap_or(0.0));
    let natural_height = (rule.height)(&hi);
    if natural_height <= 0.0 {
        return Err(CalcError::infeasible_geometry(format!(
            "bracket height {} mm is not positive",
            natural_height
        )));
    }

    let mut bracket_height = natural_height;
    let mut vertical_leg = inputs.angle_vertical_leg;
    let mut angle_extension = None;
    if let Some(limit) = inputs.angle_extension.limit() {
        if natural_height > limit {
            if !inputs.angle_extension.enabled {
                return Err(CalcError::infeasible_geometry(format!(
                    "bracket height {} mm exceeds the {} mm limit",
                    natural_height, limit
                )));
            }
            let extension = natural_height - limit;
            bracket_height = limit;
            vertical_leg += extension;
            angle_extension = Some(AngleExtensionResult {
                applied: true,
                original_bracket_height: round12(natural_height),
                limited_bracket_height: round12(limit),
                extension: round12(extension),
                original_vertical_leg: round12(inputs.angle_vertical_leg),
                extended_vertical_leg: round12(vertical_leg),
            });
        }
    }

    let rise_display = (rule.rise_reference)(&hi, bracket_height);
    let rise_worst = rise_display - SLOT_TOLERANCE;
    if rise_worst <= 0.0 {
        return Err(CalcError::infeasible_geometry(format!(
            "rise to bolts {} mm leaves no room for the fixing slot",
            rise_worst
        )));
    }

    let bracket_bottom_depth = match params.bracket_type {
        BracketType::Standard => params.fixing_position - FIXING_HEAD + bracket_height,
        BracketType::Inverted => params.fixing_position + dim_d.unwrap_or(0.0),
    };
    let drop_below_slab = bracket_bottom_depth - inputs.slab_thickness;

    let design_cavity = inputs.cavity_width + DESIGN_CAVITY_ALLOWANCE;
    let bracket_projection = floor_to_step(design_cavity - t - MIN_HEEL_GAP, MANUFACTURING_STEP);
    if bracket_projection <= 0.0 {
        return Err(CalcError::infeasible_geometry(format!(
            "cavity {} mm is too small for a {} mm angle",
            inputs.cavity_width, t
        )));
    }
    let heel_gap = design_cavity - bracket_projection - t;

    let notch_depth = inputs.notch.map_or(0.0, |n| n.depth);
    let bearing = 2.0 * inputs.masonry_thickness / 3.0;
    let angle_horizontal_leg = ceil_to_step(heel_gap + t + bearing + notch_depth, MANUFACTURING_STEP)
        .max(MIN_HORIZONTAL_LEG);

    Ok(ResolvedGeometry {
        bracket_height: round12(bracket_height),
        bracket_projection: round12(bracket_projection),
        rise_to_bolts: round12(rise_worst),
        rise_to_bolts_display: round12(rise_display),
        dim_d: dim_d.map(round12),
        drop_below_slab: round12(drop_below_slab),
        design_cavity: round12(design_cavity),
        heel_gap: round12(heel_gap),
        angle_vertical_leg: round12(vertical_leg),
        angle_horizontal_leg: round12(angle_horizontal_leg),
        bend_radius: round12(t),
        angle_extension,
        critical_edges: edges,
    })
}

/// Dim D for an inverted bracket, clamped to [130, 450].
///
/// Generated candidates are already inside the bounds; the clamp applies to
/// candidates supplied by adapters. A value that does not fit the slab below
/// the fixing rejects the candidate.
fn resolve_dim_d(inputs: &DesignInputs, params: &GeneticParameters) -> CalcResult<f64> {
    let requested = params.dim_d.ok_or_else(|| {
        CalcError::infeasible_geometry("inverted bracket candidate has no Dim D")
    })?;
    let available = inputs.slab_thickness - params.fixing_position;

    if requested > available {
        return Err(CalcError::infeasible_geometry(format!(
            "Dim D {} mm exceeds the {} mm of slab below the fixing",
            requested, available
        )));
    }

    let clamped = requested.clamp(DIM_D_MIN, DIM_D_MAX);
    if clamped > available {
        return Err(CalcError::infeasible_geometry(format!(
            "minimum Dim D {} mm exceeds the {} mm of slab below the fixing",
            clamped, available
        )));
    }
    Ok(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::Notch;
    use crate::materials::BoltSize;

    fn standard_params(fixing: f64) -> GeneticParameters {
        GeneticParameters {
            bracket_centres: 500.0,
            bracket_thickness: 4.0,
            angle_thickness: 6.0,
            bolt_size: BoltSize::M10,
            bracket_type: BracketType::Standard,
            angle_orientation: AngleOrientation::Standard,
            fixing_position: fixing,
            dim_d: None,
            channel_type: Some("CPRO50".to_string()),
        }
    }

    fn inverted_params(fixing: f64, dim_d: f64) -> GeneticParameters {
        GeneticParameters {
            bracket_type: BracketType::Inverted,
            angle_orientation: AngleOrientation::Inverted,
            dim_d: Some(dim_d),
            ..standard_params(fixing)
        }
    }

    fn fixture() -> DesignInputs {
        DesignInputs::new(225.0, 200.0, -200.0, 14.0, 102.5)
    }

    #[test]
    fn test_table_covers_every_pair() {
        for bracket in [BracketType::Standard, BracketType::Inverted] {
            for angle in [AngleOrientation::Standard, AngleOrientation::Inverted] {
                let rule = rule_for(bracket, angle);
                assert_eq!(rule.bracket_type, bracket);
                assert_eq!(rule.angle_orientation, angle);
            }
        }
    }

    #[test]
    fn test_fixture_geometry() {
        let g = resolve(&fixture(), &standard_params(75.0)).unwrap();
        assert_eq!(g.bracket_height, 175.0);
        assert_eq!(g.rise_to_bolts, 110.0);
        assert_eq!(g.rise_to_bolts_display, 125.0);
        assert_eq!(g.design_cavity, 220.0);
        assert_eq!(g.bracket_projection, 200.0);
        assert_eq!(g.heel_gap, 14.0);
        assert_eq!(g.angle_horizontal_leg, 90.0);
        assert_eq!(g.angle_vertical_leg, 60.0);
        assert_eq!(g.drop_below_slab, -25.0);
        assert!(g.dim_d.is_none());
        assert!(g.angle_extension.is_none());
    }

    #[test]
    fn test_inverted_angle_lengthens_standard_bracket() {
        let mut params = standard_params(75.0);
        params.angle_orientation = AngleOrientation::Inverted;
        let g = resolve(&fixture(), &params).unwrap();
        // 175 + (60 - 6)
        assert_eq!(g.bracket_height, 229.0);
        assert_eq!(g.rise_to_bolts_display, 179.0);
    }

    #[test]
    fn test_display_rise_is_worst_case_plus_slot() {
        let g = resolve(&fixture(), &standard_params(100.0)).unwrap();
        assert_eq!(g.rise_to_bolts_display - g.rise_to_bolts, SLOT_TOLERANCE);
    }

    #[test]
    fn test_inverted_bracket_geometry() {
        let mut inputs = fixture();
        inputs.slab_thickness = 300.0;
        inputs.support_level = 50.0;
        let g = resolve(&inputs, &inverted_params(75.0, 140.0)).unwrap();
        // 50 - 6 + 75 + 140
        assert_eq!(g.bracket_height, 259.0);
        assert_eq!(g.dim_d, Some(140.0));
        assert_eq!(g.rise_to_bolts, 125.0);
        assert!(g.drop_below_slab <= 0.0);
    }

    #[test]
    fn test_dim_d_outside_slab_is_infeasible() {
        let mut inputs = fixture();
        inputs.support_level = 50.0;
        // 225 - 100 = 125 mm available, 140 requested
        let err = resolve(&inputs, &inverted_params(100.0, 140.0)).unwrap_err();
        assert_eq!(err.error_code(), "INFEASIBLE_GEOMETRY");
    }

    #[test]
    fn test_dim_d_clamped_up_to_minimum() {
        let mut inputs = fixture();
        inputs.slab_thickness = 300.0;
        inputs.support_level = 0.0;
        let g = resolve(&inputs, &inverted_params(75.0, 100.0)).unwrap();
        assert_eq!(g.dim_d, Some(DIM_D_MIN));
        assert_eq!(g.rise_to_bolts, DIM_D_MIN - SLOT_TOLERANCE);
    }

    #[test]
    fn test_fixing_above_top_edge_is_infeasible() {
        let edges = CriticalEdges {
            top: 85.0,
            bottom: 125.0,
        };
        let err = resolve_with_edges(&fixture(), &standard_params(75.0), Some(edges)).unwrap_err();
        assert_eq!(err.error_code(), "INFEASIBLE_GEOMETRY");
        assert!(err.to_string().contains("85"));

        // Without edge limits the same candidate resolves
        assert!(resolve(&fixture(), &standard_params(75.0)).is_ok());
    }

    #[test]
    fn test_top_edge_bounds_bracket_height() {
        let edges = CriticalEdges {
            top: 85.0,
            bottom: 125.0,
        };
        let g = resolve_with_edges(&fixture(), &standard_params(85.0), Some(edges)).unwrap();
        // 200 - 85 + 50: the shallowest allowed fixing gives the tallest bracket
        assert_eq!(g.bracket_height, 165.0);
        assert_eq!(g.critical_edges, Some(edges));

        // The bottom edge is left to the fixing check: 225 - 150 = 75 < 125 still resolves
        assert!(resolve_with_edges(&fixture(), &standard_params(150.0), Some(edges)).is_ok());
    }

    #[test]
    fn test_edges_from_channel_row() {
        let store = crate::channels::ChannelStore::embedded().unwrap();
        let matched = store.lookup("CPRO52", 225.0, 500.0).unwrap();
        let edges = CriticalEdges::from(matched.spec);
        assert_eq!(edges.top, 85.0);
        assert_eq!(edges.bottom, 125.0);
    }

    #[test]
    fn test_angle_extension_caps_bracket() {
        let mut inputs = fixture();
        inputs.support_level = -300.0;
        inputs.slab_thickness = 250.0;
        inputs.angle_extension.enabled = true;
        inputs.angle_extension.max_bracket_height = Some(200.0);

        let g = resolve(&inputs, &standard_params(75.0)).unwrap();
        let ext = g.angle_extension.unwrap();
        // natural 300 - 75 + 50 = 275
        assert!(ext.applied);
        assert_eq!(ext.original_bracket_height, 275.0);
        assert_eq!(ext.limited_bracket_height, 200.0);
        assert_eq!(ext.extension, 75.0);
        assert_eq!(g.bracket_height, 200.0);
        assert_eq!(g.angle_vertical_leg, 135.0);
        // bracket height + leg extension preserves the total support height
        assert_eq!(
            g.bracket_height + ext.extension,
            ext.original_bracket_height
        );
    }

    #[test]
    fn test_limit_without_extension_rejects() {
        let mut inputs = fixture();
        inputs.angle_extension.max_bracket_height = Some(150.0);
        let err = resolve(&inputs, &standard_params(75.0)).unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_notch_too_small_for_angle() {
        let mut inputs = fixture();
        inputs.notch = Some(Notch { height: 5.0, depth: 10.0 });
        assert!(resolve(&inputs, &standard_params(75.0)).is_err());

        inputs.notch = Some(Notch { height: 10.0, depth: 30.0 });
        let g = resolve(&inputs, &standard_params(75.0)).unwrap();
        // 14 + 6 + 68.33 + 30 = 118.3 -> 120
        assert_eq!(g.angle_horizontal_leg, 120.0);
    }

    #[test]
    fn test_rise_must_leave_room_for_slot() {
        let mut inputs = fixture();
        inputs.support_level = -80.0;
        // H = 80 - 75 + 50 = 55, display rise 5, worst case negative
        assert!(resolve(&inputs, &standard_params(75.0)).is_err());
    }

    #[test]
    fn test_drop_below_slab() {
        let mut inputs = fixture();
        inputs.support_level = -300.0;
        let g = resolve(&inputs, &standard_params(75.0)).unwrap();
        // bottom at 300 mm depth, slab 225
        assert_eq!(g.drop_below_slab, 75.0);
    }
}
