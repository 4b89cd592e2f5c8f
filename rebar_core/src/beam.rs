//! # Beam Span Input
//!
//! A beam as the calculator sees it: two centerline end points and a
//! rectangular bounding section, all in millimetres.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "label": "B-1",
//!   "type_name": "Concrete-Rectangular 400x600",
//!   "start": [0.0, 0.0, 3000.0],
//!   "end": [4000.0, 0.0, 3000.0],
//!   "width_mm": 400.0,
//!   "depth_mm": 600.0
//! }
//! ```
//!
//! `id` may be omitted; a fresh UUID is assigned on load.

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::errors::{RebarError, RebarResult};
use crate::frame::LocalFrame;
use crate::geometry::{Point3, Segment, Vector3, EPSILON};

/// Input geometry for one beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamSpan {
    /// Stable identity used to tag output shapes
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// User label (e.g., "B-1", "Beam at Grid A")
    pub label: String,

    /// Host family/type name, used for batch-by-type selection
    #[serde(default)]
    pub type_name: Option<String>,

    /// Centerline start point
    pub start: Point3,

    /// Centerline end point
    pub end: Point3,

    /// Cross-section width (lateral extent)
    pub width_mm: f64,

    /// Cross-section depth (vertical extent)
    pub depth_mm: f64,
}

impl BeamSpan {
    /// Create a beam span with a fresh id.
    pub fn new(label: impl Into<String>, start: Point3, end: Point3, width_mm: f64, depth_mm: f64) -> Self {
        BeamSpan {
            id: Uuid::new_v4(),
            label: label.into(),
            type_name: None,
            start,
            end,
            width_mm,
            depth_mm,
        }
    }

    /// Builder-style type name
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Validate input geometry.
    pub fn validate(&self) -> RebarResult<()> {
        for (field, point) in [("start", &self.start), ("end", &self.end)] {
            if point.iter().any(|c| !c.is_finite()) {
                return Err(RebarError::invalid_parameter(
                    field,
                    format!("{:?}", point.coords.as_slice()),
                    "Coordinates must be finite",
                ));
            }
        }
        if !(self.width_mm.is_finite() && self.width_mm > 0.0) {
            return Err(RebarError::invalid_parameter(
                "width_mm",
                self.width_mm.to_string(),
                "Width must be positive",
            ));
        }
        if !(self.depth_mm.is_finite() && self.depth_mm > 0.0) {
            return Err(RebarError::invalid_parameter(
                "depth_mm",
                self.depth_mm.to_string(),
                "Depth must be positive",
            ));
        }
        if self.length_mm() <= EPSILON {
            return Err(RebarError::degenerate_geometry(&self.label, "Beam span has zero length"));
        }
        Ok(())
    }

    /// Centerline length
    pub fn length_mm(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Centerline as a segment
    pub fn centerline(&self) -> Segment {
        Segment::new(self.start, self.end)
    }

    /// Point on the centerline `distance_mm` from the start.
    pub fn point_at_distance(&self, distance_mm: f64) -> Point3 {
        self.centerline().point_at_parameter(distance_mm / self.length_mm())
    }
}

/// Cross-section size inferred from an element's axis-aligned bounding box.
///
/// The width is the box's extent along the frame's lateral axis and the depth
/// its extent along the vertical axis. For beams whose local frame matches the
/// global axes this is the true section. For skewed or sloped beams the
/// box also contains part of the beam's length, so the estimate overstates
/// the section; `skewed` records that the value is a heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionEstimate {
    pub width_mm: f64,
    pub depth_mm: f64,
    pub skewed: bool,
}

impl SectionEstimate {
    /// Project the bounding box `min..max` onto the frame's section axes.
    pub fn from_bounding_box(min: &Point3, max: &Point3, frame: &LocalFrame) -> Self {
        let size = *max - *min;
        let extent = |axis: &Vector3| -> f64 { axis.abs().dot(&size.abs()) };

        let skewed = !frame.is_axis_aligned(1.0e-6);
        let estimate = SectionEstimate {
            width_mm: extent(&frame.lateral),
            depth_mm: extent(&frame.vertical),
            skewed,
        };
        if skewed {
            warn!(
                width_mm = estimate.width_mm,
                depth_mm = estimate.depth_mm,
                "Section estimated from bounding box of a non axis-aligned beam; values overstate the true section"
            );
        }
        estimate
    }
}
