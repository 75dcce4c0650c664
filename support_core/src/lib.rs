//! # support_core - Masonry Support Design Engine
//!
//! `support_core` selects the lightest stainless steel bracket and angle
//! system that carries a masonry facade off a concrete slab edge (or steel
//! edge beam), and verifies it against ten structural checks. All inputs and
//! outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: the engine is a pure function of its inputs and settings
//! - **JSON-First**: all types implement Serialize/Deserialize
//! - **Failures are data**: a failing check is `passes: false`; only a search
//!   with no passing design, or unusable inputs, returns `Err`
//! - **Deterministic**: identical inputs give byte-identical results, serial
//!   or parallel
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use support_core::{optimize, ChannelStore, DesignInputs, EngineSettings};
//!
//! let inputs = DesignInputs::new(225.0, 200.0, -200.0, 14.0, 102.5);
//! let channels = ChannelStore::embedded().unwrap();
//! let result = optimize(&inputs, &EngineSettings::default(), channels).unwrap();
//!
//! let json = serde_json::to_string_pretty(&result).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`inputs`] - Load case and site geometry
//! - [`params`] - Free variables of one candidate
//! - [`channels`] - Anchor channel capacity table
//! - [`geometry`] - Bracket height, rise to bolts, Dim D, angle extension
//! - [`verification`] - The ten-check pipeline and trace observers
//! - [`weight`] - Steel mass per metre
//! - [`generator`] - Candidate space and pre-filters
//! - [`optimizer`] - Search, selection and alternatives
//! - [`materials`] / [`settings`] - Material constants and engine settings
//! - [`section_tables`] - Tabulated second moments of area
//! - [`units`] - Unit conventions and 12-decimal rounding
//! - [`errors`] - Structured error types

pub mod channels;
pub mod errors;
pub mod generator;
pub mod geometry;
pub mod inputs;
pub mod materials;
pub mod optimizer;
pub mod params;
pub mod section_tables;
pub mod settings;
pub mod units;
pub mod verification;
pub mod weight;

// Re-export commonly used types at crate root for convenience
pub use channels::{ChannelSpec, ChannelStore};
pub use errors::{CalcError, CalcResult};
pub use geometry::ResolvedGeometry;
pub use inputs::DesignInputs;
pub use optimizer::{
    assess_candidate, evaluate_candidate, optimize, optimize_with_progress, OptimizationResult,
};
pub use params::GeneticParameters;
pub use settings::EngineSettings;
pub use verification::VerificationResult;
pub use weight::WeightBreakdown;
