//! # Local Frame Builder
//!
//! Orthonormal coordinate system aligned with a beam:
//!
//! - **axial**: along the beam, `normalize(end - start)`
//! - **lateral**: horizontal across the section, `normalize(up × axial)`
//! - **vertical**: `normalize(axial × lateral)`, recomputed so the frame stays
//!   orthogonal even when `up` is not exactly perpendicular to the beam
//!
//! ## Example
//!
//! ```rust
//! use rebar_core::frame::LocalFrame;
//! use rebar_core::geometry::{Point3, Vector3};
//!
//! let frame = LocalFrame::from_points(
//!     "B-1",
//!     &Point3::origin(),
//!     &Point3::new(4000.0, 0.0, 0.0),
//!     &Vector3::z(),
//! ).unwrap();
//!
//! assert_eq!(frame.axial, Vector3::x());
//! assert_eq!(frame.lateral, Vector3::y());
//! assert_eq!(frame.vertical, Vector3::z());
//! ```

use serde::{Deserialize, Serialize};

use crate::beam::BeamSpan;
use crate::errors::{RebarError, RebarResult};
use crate::geometry::{Point3, Vector3, EPSILON};

/// Cross products shorter than this mean `up` is parallel to the beam axis
pub const PARALLEL_TOLERANCE: f64 = 1.0e-9;

/// Beam-aligned orthonormal frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalFrame {
    pub axial: Vector3,
    pub lateral: Vector3,
    pub vertical: Vector3,
}

impl LocalFrame {
    /// Build the frame for a beam span.
    ///
    /// Fails with `DegenerateGeometry` for a zero-length span or an up-vector
    /// parallel (or antiparallel) to the beam axis.
    pub fn from_span(span: &BeamSpan, up: &Vector3) -> RebarResult<Self> {
        Self::from_points(&span.label, &span.start, &span.end, up)
    }

    /// Build the frame from raw end points. `beam` names the beam in errors.
    pub fn from_points(beam: &str, start: &Point3, end: &Point3, up: &Vector3) -> RebarResult<Self> {
        let axial = (*end - *start)
            .try_normalize(EPSILON)
            .ok_or_else(|| RebarError::degenerate_geometry(beam, "Beam span has zero length"))?;

        let up = up
            .try_normalize(EPSILON)
            .ok_or_else(|| RebarError::degenerate_geometry(beam, "Up vector has zero length"))?;

        let lateral = up.cross(&axial).try_normalize(PARALLEL_TOLERANCE).ok_or_else(|| {
            RebarError::degenerate_geometry(beam, "Up vector is parallel to the beam axis")
        })?;

        // Unit by construction, normalized again to absorb rounding
        let vertical = axial.cross(&lateral).normalize();

        Ok(LocalFrame {
            axial,
            lateral,
            vertical,
        })
    }

    /// World-space offset for a (lateral, vertical) position in the section plane
    pub fn section_offset(&self, lateral: f64, vertical: f64) -> Vector3 {
        self.lateral * lateral + self.vertical * vertical
    }

    /// True when every axis coincides with a global axis (either sign)
    pub fn is_axis_aligned(&self, tolerance: f64) -> bool {
        [self.axial, self.lateral, self.vertical]
            .iter()
            .all(|axis| axis.iter().filter(|c| c.abs() > tolerance).count() == 1)
    }
}
