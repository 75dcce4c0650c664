//! # Parameter Space Generator
//!
//! Enumerates the discrete candidate space for one set of inputs and applies
//! the cheap pre-filters that run before geometry and verification.
//!
//! The space is the Cartesian product
//!
//! ```text
//!   centres × bracket thickness × angle thickness × bolt
//!     × arrangement (bracket type, angle orientation, fixing, Dim D)
//!     × channel type
//! ```
//!
//! indexed in that order, which is also [`GeneticParameters::canonical_cmp`]
//! order. Candidates are produced on demand from an index, so large spaces
//! are never materialized and any index range can be evaluated independently.
//!
//! ## Example
//!
//! ```rust
//! use support_core::channels::ChannelStore;
//! use support_core::generator::ParameterSpace;
//! use support_core::inputs::DesignInputs;
//!
//! let inputs = DesignInputs::new(225.0, 200.0, -200.0, 14.0, 102.5);
//! let space = ParameterSpace::new(&inputs, ChannelStore::embedded().unwrap());
//!
//! // 9 centres × 2 × 5 × 2 bolts × (2 orientations × 16 fixings) × 3 channels
//! assert_eq!(space.len(), 17_280);
//! ```

use serde::{Deserialize, Serialize};

use crate::channels::ChannelStore;
use crate::geometry::{natural_bracket_height, DIM_D_MAX, DIM_D_MIN, MANUFACTURING_STEP};
use crate::inputs::{DesignInputs, FixingMethod, FixingPositionMode};
use crate::materials::BoltSize;
use crate::params::{AngleOrientation, BracketType, GeneticParameters};

/// Bracket centres searched when no filter is given (mm)
pub const DEFAULT_CENTRES: [f64; 9] = [200.0, 250.0, 300.0, 350.0, 400.0, 450.0, 500.0, 550.0, 600.0];

/// Bracket plate thicknesses (mm)
pub const BRACKET_THICKNESSES: [f64; 2] = [3.0, 4.0];

/// Angle thicknesses (mm)
pub const ANGLE_THICKNESSES: [f64; 5] = [3.0, 4.0, 5.0, 6.0, 8.0];

/// Closest fixing to either slab face (mm)
pub const FIXING_EDGE_DISTANCE: f64 = 75.0;

/// Slabs this thin only offer the single edge-distance fixing (mm)
pub const THIN_SLAB: f64 = 150.0;

/// Why a candidate was dropped before geometry resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefilterReason {
    /// Over the bracket height limit with angle extension disabled
    ExceedsHeightLimit,
    /// The angle does not fit the masonry notch
    NotchTooSmall,
    /// The orientation pair yields no bracket at this support level
    NonPositiveHeight,
}

/// Bracket type, angle orientation, fixing position and Dim D of one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Arrangement {
    bracket_type: BracketType,
    angle_orientation: AngleOrientation,
    fixing_position: f64,
    dim_d: Option<f64>,
}

/// The enumerated candidate space for one set of inputs.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    centres: Vec<f64>,
    arrangements: Vec<Arrangement>,
    channel_types: Vec<Option<String>>,
}

/// Bracket type legal at this support level.
///
/// Supports at or above the slab top need an inverted bracket, supports
/// below it a standard one.
pub fn bracket_type_for(support_level: f64) -> BracketType {
    if support_level >= 0.0 {
        BracketType::Inverted
    } else {
        BracketType::Standard
    }
}

/// Fixing positions searched for these inputs (mm below slab top).
pub fn fixing_positions(inputs: &DesignInputs) -> Vec<f64> {
    if let FixingPositionMode::Custom(position) = inputs.fixing_position {
        return vec![position];
    }
    if inputs.slab_thickness <= THIN_SLAB {
        return vec![FIXING_EDGE_DISTANCE];
    }
    let span = inputs.slab_thickness - 2.0 * FIXING_EDGE_DISTANCE;
    let steps = (span / MANUFACTURING_STEP).floor() as usize;
    (0..=steps)
        .map(|i| FIXING_EDGE_DISTANCE + MANUFACTURING_STEP * i as f64)
        .collect()
}

/// Dim D values for an inverted bracket fixed at `fixing_position` (mm).
///
/// Empty when the slab below the fixing is shorter than the minimum Dim D.
pub fn dim_d_values(slab_thickness: f64, fixing_position: f64) -> Vec<f64> {
    let upper = DIM_D_MAX.min(slab_thickness - fixing_position);
    if upper < DIM_D_MIN {
        return Vec::new();
    }
    let steps = ((upper - DIM_D_MIN) / MANUFACTURING_STEP).floor() as usize;
    (0..=steps)
        .map(|i| DIM_D_MIN + MANUFACTURING_STEP * i as f64)
        .collect()
}

impl ParameterSpace {
    pub fn new(inputs: &DesignInputs, channels: &ChannelStore) -> Self {
        let centres = inputs
            .bracket_centres
            .clone()
            .unwrap_or_else(|| DEFAULT_CENTRES.to_vec());

        let bracket_type = bracket_type_for(inputs.support_level);
        let mut arrangements = Vec::new();
        for angle_orientation in [AngleOrientation::Standard, AngleOrientation::Inverted] {
            for fixing_position in fixing_positions(inputs) {
                match bracket_type {
                    BracketType::Standard => arrangements.push(Arrangement {
                        bracket_type,
                        angle_orientation,
                        fixing_position,
                        dim_d: None,
                    }),
                    BracketType::Inverted => {
                        for dim_d in dim_d_values(inputs.slab_thickness, fixing_position) {
                            arrangements.push(Arrangement {
                                bracket_type,
                                angle_orientation,
                                fixing_position,
                                dim_d: Some(dim_d),
                            });
                        }
                    }
                }
            }
        }

        let channel_types = match inputs.fixing_method {
            FixingMethod::Steel => vec![None],
            FixingMethod::Channel => match &inputs.channel_types {
                Some(filter) => filter.iter().cloned().map(Some).collect(),
                None => channels
                    .families()
                    .into_iter()
                    .map(|f| Some(f.to_string()))
                    .collect(),
            },
        };

        ParameterSpace {
            centres,
            arrangements,
            channel_types,
        }
    }

    /// Number of candidates in the space
    pub fn len(&self) -> usize {
        self.centres.len()
            * BRACKET_THICKNESSES.len()
            * ANGLE_THICKNESSES.len()
            * BoltSize::SEARCHED.len()
            * self.arrangements.len()
            * self.channel_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The candidate at `index` (mixed-radix decomposition, last field fastest).
    ///
    /// Returns `None` past the end of the space.
    pub fn candidate(&self, index: usize) -> Option<GeneticParameters> {
        if index >= self.len() {
            return None;
        }
        let mut rest = index;
        let mut digit = |radix: usize| {
            let d = rest % radix;
            rest /= radix;
            d
        };
        let channel = digit(self.channel_types.len());
        let arrangement = digit(self.arrangements.len());
        let bolt = digit(BoltSize::SEARCHED.len());
        let angle = digit(ANGLE_THICKNESSES.len());
        let bracket = digit(BRACKET_THICKNESSES.len());
        let centres = digit(self.centres.len());

        let arrangement = self.arrangements[arrangement];
        Some(GeneticParameters {
            bracket_centres: self.centres[centres],
            bracket_thickness: BRACKET_THICKNESSES[bracket],
            angle_thickness: ANGLE_THICKNESSES[angle],
            bolt_size: BoltSize::SEARCHED[bolt],
            bracket_type: arrangement.bracket_type,
            angle_orientation: arrangement.angle_orientation,
            fixing_position: arrangement.fixing_position,
            dim_d: arrangement.dim_d,
            channel_type: self.channel_types[channel].clone(),
        })
    }

    /// All candidates in canonical order
    pub fn iter(&self) -> impl Iterator<Item = GeneticParameters> + '_ {
        (0..self.len()).filter_map(move |i| self.candidate(i))
    }
}

/// Cheap rejection before geometry resolution.
///
/// Over-height candidates are kept when angle extension is enabled; the
/// geometry resolver caps them instead.
pub fn prefilter(inputs: &DesignInputs, params: &GeneticParameters) -> Option<PrefilterReason> {
    if let Some(notch) = inputs.notch {
        if notch.height < params.angle_thickness {
            return Some(PrefilterReason::NotchTooSmall);
        }
    }

    let height = natural_bracket_height(inputs, params);
    if height <= 0.0 {
        return Some(PrefilterReason::NonPositiveHeight);
    }

    if let Some(limit) = inputs.angle_extension.limit() {
        if height > limit && !inputs.angle_extension.enabled {
            return Some(PrefilterReason::ExceedsHeightLimit);
        }
    }
    None
}
