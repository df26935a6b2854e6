//! # Error Types
//!
//! Structured error types for tank_core. Every failure the engine can produce
//! is a value of [`CalcError`]; nothing in the calculation path panics.
//!
//! Standard-applicability violations (Annex A over-thickness, Fixed-Point
//! diameter, Variable-Point slenderness) are *not* errors: they are reported
//! as a [`TankAlert`](crate::calculations::TankAlert) on a partial outcome.
//!
//! ## Example
//!
//! ```rust
//! use tank_core::errors::{CalcError, CalcResult};
//!
//! fn check_height(height_m: f64) -> CalcResult<()> {
//!     if height_m <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "height",
//!             height_m.to_string(),
//!             "Height must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_height(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for tank_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// A ring whose material could not be resolved to allowable stresses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnresolvedMaterial {
    /// Zero-based ring index (0 = bottom ring)
    pub ring_index: usize,
    /// Material identifier as supplied
    pub material: String,
    /// Why the lookup failed
    pub reason: String,
}

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A single input value is invalid
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// One or more validation rules failed. Every violated rule is listed.
    #[error("Invalid values. Check the supplied data.\n{}", violations.join("\n"))]
    ValidationFailed { violations: Vec<String> },

    /// Allowable stresses could not be obtained for one or more rings
    #[error("Could not obtain Sd/St for {}", format_unresolved(rings))]
    UnresolvedMaterials { rings: Vec<UnresolvedMaterial> },

    /// Material not found in a reference table
    #[error("Material not found: {material_name}")]
    MaterialNotFound { material_name: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn format_unresolved(rings: &[UnresolvedMaterial]) -> String {
    rings
        .iter()
        .map(|r| format!("ring {} ({}): {}", r.ring_index + 1, r.material, r.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_name: impl Into<String>) -> Self {
        CalcError::MaterialNotFound {
            material_name: material_name.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's input (as opposed to I/O or internal faults).
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidInput { .. }
                | CalcError::ValidationFailed { .. }
                | CalcError::UnresolvedMaterials { .. }
                | CalcError::MaterialNotFound { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::ValidationFailed { .. } => "VALIDATION_FAILED",
            CalcError::UnresolvedMaterials { .. } => "UNRESOLVED_MATERIALS",
            CalcError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::ValidationFailed {
            violations: vec!["Height must be greater than 0 and a valid number.".to_string()],
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"ValidationFailed\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_validation_message_lists_every_rule() {
        let error = CalcError::ValidationFailed {
            violations: vec!["first rule".to_string(), "second rule".to_string()],
        };
        let msg = error.to_string();
        assert!(msg.starts_with("Invalid values."));
        assert!(msg.contains("first rule"));
        assert!(msg.contains("second rule"));
    }

    #[test]
    fn test_unresolved_message_is_one_based() {
        let error = CalcError::UnresolvedMaterials {
            rings: vec![UnresolvedMaterial {
                ring_index: 2,
                material: "A999".to_string(),
                reason: "not found in material table".to_string(),
            }],
        };
        assert!(error.to_string().contains("ring 3 (A999)"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::material_not_found("A36").error_code(), "MATERIAL_NOT_FOUND");
        assert_eq!(
            CalcError::ValidationFailed { violations: vec![] }.error_code(),
            "VALIDATION_FAILED"
        );
        assert!(CalcError::material_not_found("A36").is_rejected_input());
        assert!(!CalcError::file_error("read", "x.json", "missing").is_rejected_input());
    }
}
