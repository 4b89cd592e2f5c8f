//! # Error Types
//!
//! Structured error types for rebar_core. Every error carries enough context
//! (which field, which beam, which file) for a caller to report it without
//! re-deriving what went wrong.
//!
//! Errors fall into two groups:
//!
//! - **Beam-local**: [`RebarError::DegenerateGeometry`] and
//!   [`RebarError::InsufficientSection`] affect one beam only. A batch records
//!   them and moves on to the next beam.
//! - **Request-level**: invalid parameters and file problems reject the whole
//!   request before any beam is computed.
//!
//! ## Example
//!
//! ```rust
//! use rebar_core::errors::{RebarError, RebarResult};
//!
//! fn validate_spacing(spacing_mm: f64) -> RebarResult<()> {
//!     if spacing_mm <= 0.0 {
//!         return Err(RebarError::invalid_parameter(
//!             "stirrup_spacing_mm",
//!             spacing_mm.to_string(),
//!             "Stirrup spacing must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_spacing(0.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for rebar_core operations
pub type RebarResult<T> = Result<T, RebarError>;

/// Structured error type for layout operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum RebarError {
    /// A count or dimension is negative, non-numeric or otherwise unusable
    #[error("Invalid parameter '{field}': {value} - {reason}")]
    InvalidParameter {
        field: String,
        value: String,
        reason: String,
    },

    /// The beam's local frame cannot be built (zero-length span, or the
    /// up-vector is parallel to the beam axis)
    #[error("Degenerate geometry for beam '{beam}': {reason}")]
    DegenerateGeometry { beam: String, reason: String },

    /// Cover plus stirrup diameter leave no room for a stirrup loop
    #[error(
        "Insufficient section for stirrups on beam '{beam}': half-width {half_width_mm:.3} mm, half-depth {half_depth_mm:.3} mm"
    )]
    InsufficientSection {
        beam: String,
        half_width_mm: f64,
        half_depth_mm: f64,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Job file is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Job file schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl RebarError {
    /// Create an InvalidParameter error
    pub fn invalid_parameter(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        RebarError::InvalidParameter {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a DegenerateGeometry error
    pub fn degenerate_geometry(beam: impl Into<String>, reason: impl Into<String>) -> Self {
        RebarError::DegenerateGeometry {
            beam: beam.into(),
            reason: reason.into(),
        }
    }

    /// Create an InsufficientSection error
    pub fn insufficient_section(beam: impl Into<String>, half_width_mm: f64, half_depth_mm: f64) -> Self {
        RebarError::InsufficientSection {
            beam: beam.into(),
            half_width_mm,
            half_depth_mm,
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        RebarError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        RebarError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        RebarError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (retry later, or skip and continue)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RebarError::FileLocked { .. } | RebarError::InsufficientSection { .. }
        )
    }

    /// True for errors that concern a single beam and must not abort a batch
    pub fn is_beam_local(&self) -> bool {
        matches!(
            self,
            RebarError::DegenerateGeometry { .. } | RebarError::InsufficientSection { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            RebarError::InvalidParameter { .. } => "INVALID_PARAMETER",
            RebarError::DegenerateGeometry { .. } => "DEGENERATE_GEOMETRY",
            RebarError::InsufficientSection { .. } => "INSUFFICIENT_SECTION",
            RebarError::FileError { .. } => "FILE_ERROR",
            RebarError::FileLocked { .. } => "FILE_LOCKED",
            RebarError::SerializationError { .. } => "SERIALIZATION_ERROR",
            RebarError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = RebarError::invalid_parameter("cover_mm", "-5", "Cover must be non-negative");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidParameter\""));
        let roundtrip: RebarError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            RebarError::degenerate_geometry("B-1", "zero length").error_code(),
            "DEGENERATE_GEOMETRY"
        );
        assert_eq!(
            RebarError::insufficient_section("B-1", -2.0, 10.0).error_code(),
            "INSUFFICIENT_SECTION"
        );
    }

    #[test]
    fn test_unknown_error_type_rejected() {
        let json = r#"{"type":"Internal","details":{"message":"boom"}}"#;
        assert!(serde_json::from_str::<RebarError>(json).is_err());
    }

    #[test]
    fn test_beam_local_classification() {
        assert!(RebarError::degenerate_geometry("B-1", "parallel").is_beam_local());
        assert!(RebarError::insufficient_section("B-1", 0.0, 0.0).is_beam_local());
        assert!(!RebarError::invalid_parameter("top", "x", "not a number").is_beam_local());
        assert!(!RebarError::serialization("bad json").is_beam_local());
    }

    #[test]
    fn test_display_names_field() {
        let error = RebarError::invalid_parameter("top", "two", "Count must be a whole number");
        assert_eq!(
            error.to_string(),
            "Invalid parameter 'top': two - Count must be a whole number"
        );
    }
}
