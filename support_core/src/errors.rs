//! # Error Types
//!
//! Structured error types for support_core. Only a handful of conditions ever
//! leave the engine as an `Err`: inputs that fail validation, unreadable
//! settings, and a search that finds no passing design. Everything that can go
//! wrong with a single candidate (infeasible geometry, a failing check,
//! missing reference data, a degenerate equation) is recorded in that
//! candidate's result instead.
//!
//! ## Example
//!
//! ```rust
//! use support_core::errors::{CalcError, CalcResult};
//!
//! fn validate_cavity(cavity_mm: f64) -> CalcResult<()> {
//!     if cavity_mm <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "cavity_width",
//!             cavity_mm.to_string(),
//!             "Cavity must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_cavity(-5.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for support_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for engine operations.
///
/// Each variant carries enough context for an adapter (form layer, CLI,
/// assistant) to explain the problem without parsing the message text.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, wrong increment, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A candidate's derived geometry violates a hard constraint
    #[error("Infeasible geometry: {reason}")]
    InfeasibleGeometry { reason: String },

    /// A reference table has no entry for the requested key
    #[error("Missing reference data in {table}: {key}")]
    MissingReferenceData { table: String, key: String },

    /// The search finished without a single passing candidate
    #[error(
        "No feasible design: {candidates_evaluated} candidates evaluated, \
         {rejected_geometry} rejected on geometry, {failed_verification} failed verification"
    )]
    NoFeasibleDesign {
        candidates_evaluated: usize,
        rejected_geometry: usize,
        failed_verification: usize,
    },

    /// Engine settings could not be parsed or are out of range
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// File I/O error (adapters only, the engine never touches files)
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InfeasibleGeometry error
    pub fn infeasible_geometry(reason: impl Into<String>) -> Self {
        CalcError::InfeasibleGeometry {
            reason: reason.into(),
        }
    }

    /// Create a MissingReferenceData error
    pub fn missing_reference_data(table: impl Into<String>, key: impl Into<String>) -> Self {
        CalcError::MissingReferenceData {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Create a ConfigError
    pub fn config(reason: impl Into<String>) -> Self {
        CalcError::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::InfeasibleGeometry { .. } => "INFEASIBLE_GEOMETRY",
            CalcError::MissingReferenceData { .. } => "MISSING_REFERENCE_DATA",
            CalcError::NoFeasibleDesign { .. } => "NO_FEASIBLE_DESIGN",
            CalcError::ConfigError { .. } => "CONFIG_ERROR",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("slab_thickness", "-5", "Slab must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CalcError::infeasible_geometry("dim d").error_code(),
            "INFEASIBLE_GEOMETRY"
        );
        assert_eq!(
            CalcError::missing_reference_data("channels", "X").error_code(),
            "MISSING_REFERENCE_DATA"
        );
        let none = CalcError::NoFeasibleDesign {
            candidates_evaluated: 10,
            rejected_geometry: 4,
            failed_verification: 6,
        };
        assert_eq!(none.error_code(), "NO_FEASIBLE_DESIGN");
        assert!(none.to_string().contains("10 candidates evaluated"));
    }
}
