//! # Layout Settings
//!
//! Job-wide configuration. Every field has a default, so a job file only
//! needs to state what differs.
//!
//! ```rust
//! use rebar_core::settings::{FailurePolicy, LayoutSettings};
//!
//! let settings: LayoutSettings = serde_json::from_str(r#"{ "geometry_unit": "ft" }"#).unwrap();
//! assert_eq!(settings.end_clearance_mm, 50.0);
//! assert_eq!(settings.failure_policy, FailurePolicy::ContinueOnError);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{RebarError, RebarResult};
use crate::geometry::Vector3;
use crate::units::LengthUnit;

/// Clearance between the beam end face and the first stirrup, beyond cover
pub const DEFAULT_END_CLEARANCE_MM: f64 = 50.0;

/// Stirrup half-dimensions at or below this are treated as no room
pub const DEFAULT_SECTION_TOLERANCE_MM: f64 = 1.0e-3;

/// What a batch does when one beam fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Record the failure and keep going
    #[default]
    ContinueOnError,
    /// Abort the whole batch on the first failure
    AllOrNothing,
}

/// Whether the results are only shown or handed to the host for creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutMode {
    #[default]
    Preview,
    Apply,
}

/// Job-wide calculation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Unit of beam coordinates and section sizes in the job file
    pub geometry_unit: LengthUnit,

    /// Unit of cover, diameters and spacing in the job file
    pub parameter_unit: LengthUnit,

    /// Global up direction used to orient every beam's section
    pub up_vector: Vector3,

    /// Extra stirrup end margin beyond cover and stirrup radius (mm)
    pub end_clearance_mm: f64,

    /// Minimum stirrup half-width/half-depth (mm)
    pub section_tolerance_mm: f64,

    pub failure_policy: FailurePolicy,

    pub mode: LayoutMode,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        LayoutSettings {
            geometry_unit: LengthUnit::Millimeters,
            parameter_unit: LengthUnit::Millimeters,
            up_vector: Vector3::z(),
            end_clearance_mm: DEFAULT_END_CLEARANCE_MM,
            section_tolerance_mm: DEFAULT_SECTION_TOLERANCE_MM,
            failure_policy: FailurePolicy::ContinueOnError,
            mode: LayoutMode::Preview,
        }
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> RebarResult<()> {
        if self.up_vector.iter().any(|c| !c.is_finite()) || self.up_vector.norm() == 0.0 {
            return Err(RebarError::invalid_parameter(
                "up_vector",
                format!("{:?}", self.up_vector.as_slice()),
                "Up vector must be finite and non-zero",
            ));
        }
        if !(self.end_clearance_mm.is_finite() && self.end_clearance_mm >= 0.0) {
            return Err(RebarError::invalid_parameter(
                "end_clearance_mm",
                self.end_clearance_mm.to_string(),
                "End clearance must be non-negative",
            ));
        }
        if !(self.section_tolerance_mm.is_finite() && self.section_tolerance_mm >= 0.0) {
            return Err(RebarError::invalid_parameter(
                "section_tolerance_mm",
                self.section_tolerance_mm.to_string(),
                "Section tolerance must be non-negative",
            ));
        }
        Ok(())
    }
}
