//! # Optimizer
//!
//! Runs geometry → verification → weight over every candidate in the
//! parameter space, keeps the lightest passing design and ranks the next
//! lightest as alternatives.
//!
//! Candidates are evaluated in fixed-size chunks. With the `parallel` feature
//! each chunk is mapped on the rayon pool; results are then folded in index
//! order into a bounded list ordered by (mass, canonical parameter order), so
//! the outcome is identical whether the search runs serially or in parallel.
//!
//! ## Example
//!
//! ```rust,no_run
//! use support_core::channels::ChannelStore;
//! use support_core::inputs::DesignInputs;
//! use support_core::optimizer::optimize;
//! use support_core::settings::EngineSettings;
//!
//! let inputs = DesignInputs::new(225.0, 200.0, -200.0, 14.0, 102.5);
//! let channels = ChannelStore::embedded().unwrap();
//! let result = optimize(&inputs, &EngineSettings::default(), channels).unwrap();
//!
//! println!(
//!     "{} kg/m with {} alternatives",
//!     result.best.weight.total_mass_per_metre,
//!     result.alternatives.len()
//! );
//! ```

use std::cmp::Ordering;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::channels::ChannelStore;
use crate::errors::{CalcError, CalcResult};
use crate::generator::{prefilter, ParameterSpace, PrefilterReason};
use crate::geometry::{self, CriticalEdges, ResolvedGeometry};
use crate::inputs::DesignInputs;
use crate::params::GeneticParameters;
use crate::settings::EngineSettings;
use crate::units::round12;
use crate::verification::{self, Anchorage, NoTrace, VerificationResult, VerificationTrace};
use crate::weight::{self, WeightBreakdown};

/// A fully evaluated candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedDesign {
    pub parameters: GeneticParameters,
    pub geometry: ResolvedGeometry,
    pub verification: VerificationResult,
    pub weight: WeightBreakdown,
}

impl EvaluatedDesign {
    /// System mass per metre used for ranking (kg/m)
    pub fn mass(&self) -> f64 {
        self.weight.total_mass_per_metre
    }

    /// Ranking order: lighter first, ties broken by parameter order
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.mass()
            .total_cmp(&other.mass())
            .then_with(|| self.parameters.canonical_cmp(&other.parameters))
    }
}

/// Why a candidate was excluded from selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum CandidateRejection {
    /// Dropped by a cheap pre-filter
    Prefiltered(PrefilterReason),
    /// Geometry resolution failed
    Geometry { reason: String },
    /// Resolved but at least one check failed
    Verification { failed_checks: Vec<String> },
}

/// A runner-up design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub design: EvaluatedDesign,
    /// Extra mass relative to the optimum (%)
    pub weight_delta_percent: f64,
    /// Parameters that differ from the optimum, `field: optimum -> alternative`
    pub differences: Vec<String>,
}

/// Candidate counts for one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStatistics {
    pub enumerated: usize,
    pub prefiltered: usize,
    pub rejected_geometry: usize,
    pub failed_verification: usize,
    pub passing: usize,
}

/// Optimum plus ranked alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub best: EvaluatedDesign,
    pub alternatives: Vec<Alternative>,
    pub statistics: SearchStatistics,
}

/// Progress report passed to the optimizer callback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchProgress {
    pub evaluated: usize,
    pub total: usize,
    /// Lightest passing mass so far (kg/m)
    pub best_mass: Option<f64>,
}

/// Resolve, verify and weigh one candidate whether or not it passes.
///
/// Only geometry failures are errors; check failures are reported in the
/// returned verification result. Channel fixings are resolved against the
/// matched row's critical edges.
pub fn assess_candidate(
    inputs: &DesignInputs,
    params: &GeneticParameters,
    settings: &EngineSettings,
    channels: &ChannelStore,
    trace: &mut dyn VerificationTrace,
) -> CalcResult<EvaluatedDesign> {
    let edges = match verification::resolve_anchorage(inputs, params, channels) {
        Anchorage::Channel(matched) => Some(CriticalEdges::from(matched.spec)),
        Anchorage::SteelBolt(_) | Anchorage::Unavailable { .. } => None,
    };
    let geometry = geometry::resolve_with_edges(inputs, params, edges)?;
    let verification = verification::verify(inputs, params, &geometry, settings, channels, trace);
    let weight = weight::calculate(params, &geometry, &settings.material);
    Ok(EvaluatedDesign {
        parameters: params.clone(),
        geometry,
        verification,
        weight,
    })
}

/// Evaluate one candidate for selection.
///
/// Stateless: safe to call from any number of threads over a shared channel store.
pub fn evaluate_candidate(
    inputs: &DesignInputs,
    params: &GeneticParameters,
    settings: &EngineSettings,
    channels: &ChannelStore,
) -> Result<EvaluatedDesign, CandidateRejection> {
    if let Some(reason) = prefilter(inputs, params) {
        return Err(CandidateRejection::Prefiltered(reason));
    }
    let design = assess_candidate(inputs, params, settings, channels, &mut NoTrace).map_err(|e| {
        CandidateRejection::Geometry {
            reason: e.to_string(),
        }
    })?;
    if !design.verification.passes {
        return Err(CandidateRejection::Verification {
            failed_checks: design
                .verification
                .failed_checks()
                .into_iter()
                .map(str::to_string)
                .collect(),
        });
    }
    Ok(design)
}

/// Lightest designs seen so far, kept sorted by [`EvaluatedDesign::rank_cmp`].
struct BestList {
    capacity: usize,
    designs: Vec<EvaluatedDesign>,
}

impl BestList {
    fn new(capacity: usize) -> Self {
        BestList {
            capacity,
            designs: Vec::new(),
        }
    }

    fn offer(&mut self, design: EvaluatedDesign) {
        if self.designs.len() == self.capacity {
            match self.designs.last() {
                Some(worst) if design.rank_cmp(worst) != Ordering::Less => return,
                _ => {}
            }
        }
        let position = self
            .designs
            .binary_search_by(|probe| probe.rank_cmp(&design))
            .unwrap_or_else(|p| p);
        self.designs.insert(position, design);
        self.designs.truncate(self.capacity);
    }

    fn best_mass(&self) -> Option<f64> {
        self.designs.first().map(EvaluatedDesign::mass)
    }
}

fn evaluate_range(
    space: &ParameterSpace,
    range: Range<usize>,
    inputs: &DesignInputs,
    settings: &EngineSettings,
    channels: &ChannelStore,
) -> Vec<Result<EvaluatedDesign, CandidateRejection>> {
    #[cfg(feature = "parallel")]
    if settings.search.parallel {
        use rayon::prelude::*;
        return range
            .into_par_iter()
            .filter_map(|i| space.candidate(i))
            .map(|params| evaluate_candidate(inputs, &params, settings, channels))
            .collect();
    }

    range
        .filter_map(|i| space.candidate(i))
        .map(|params| evaluate_candidate(inputs, &params, settings, channels))
        .collect()
}

/// Search the full space and return the optimum and alternatives.
pub fn optimize(
    inputs: &DesignInputs,
    settings: &EngineSettings,
    channels: &ChannelStore,
) -> CalcResult<OptimizationResult> {
    optimize_with_progress(inputs, settings, channels, &mut |_| {})
}

/// [`optimize`] with a callback invoked after every chunk.
pub fn optimize_with_progress(
    inputs: &DesignInputs,
    settings: &EngineSettings,
    channels: &ChannelStore,
    progress: &mut dyn FnMut(SearchProgress),
) -> CalcResult<OptimizationResult> {
    inputs.validate()?;
    settings.validate()?;

    let space = ParameterSpace::new(inputs, channels);
    let total = space.len();
    let chunk_size = settings.search.chunk_size;
    info!(
        candidates = total,
        chunk_size,
        parallel = settings.search.parallel,
        "starting design search"
    );

    let mut stats = SearchStatistics {
        enumerated: total,
        ..SearchStatistics::default()
    };
    let mut best = BestList::new(settings.search.max_alternatives.saturating_add(1));

    let mut start = 0;
    while start < total {
        let end = (start + chunk_size).min(total);
        for outcome in evaluate_range(&space, start..end, inputs, settings, channels) {
            match outcome {
                Ok(design) => {
                    stats.passing += 1;
                    best.offer(design);
                }
                Err(CandidateRejection::Prefiltered(_)) => stats.prefiltered += 1,
                Err(CandidateRejection::Geometry { .. }) => stats.rejected_geometry += 1,
                Err(CandidateRejection::Verification { .. }) => stats.failed_verification += 1,
            }
        }
        start = end;
        progress(SearchProgress {
            evaluated: end,
            total,
            best_mass: best.best_mass(),
        });
    }

    debug!(
        prefiltered = stats.prefiltered,
        rejected_geometry = stats.rejected_geometry,
        failed_verification = stats.failed_verification,
        passing = stats.passing,
        "search finished"
    );

    let mut ranked = best.designs.into_iter();
    let Some(best) = ranked.next() else {
        info!(candidates = total, "no feasible design");
        return Err(CalcError::NoFeasibleDesign {
            candidates_evaluated: total,
            rejected_geometry: stats.prefiltered + stats.rejected_geometry,
            failed_verification: stats.failed_verification,
        });
    };

    let best_mass = best.mass();
    let alternatives = ranked
        .map(|design| Alternative {
            weight_delta_percent: round12((design.mass() - best_mass) / best_mass * 100.0),
            differences: design.parameters.differences_from(&best.parameters),
            design,
        })
        .collect();

    info!(
        best_mass,
        passing = stats.passing,
        candidates = total,
        "selected optimum design"
    );

    Ok(OptimizationResult {
        best,
        alternatives,
        statistics: stats,
    })
}
