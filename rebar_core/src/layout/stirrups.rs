//! # Stirrup Placement & Shape
//!
//! Stirrups are closed rectangles in the beam's lateral-vertical plane,
//! repeated along the span at a uniform spacing.
//!
//! ## Placement
//!
//! ```text
//! margin        = cover + stirrup_radius + end_clearance
//! usable_length = max(0, length - 2 * margin)
//! count         = floor(usable_length / spacing) + 1   (0 if usable_length = 0)
//! position[i]   = margin + min(i * spacing, usable_length)
//! ```
//!
//! With a 4000 mm beam, 30 mm cover, 8 mm stirrups, 150 mm spacing and the
//! default 50 mm clearance: margin = 84, usable length = 3832, 26 stirrups.

use serde::{Deserialize, Serialize};

use crate::beam::BeamSpan;
use crate::errors::{RebarError, RebarResult};
use crate::frame::LocalFrame;
use crate::geometry::{is_closed_loop, Point3, Segment};
use crate::params::ReinforcementParameters;

/// Where stirrups go along a beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StirrupPlacement {
    /// Distance from each beam end to the first/last possible stirrup
    pub margin_mm: f64,
    /// Length between the two margins (never negative)
    pub usable_length_mm: f64,
    /// Distances along the beam from its start
    pub positions_mm: Vec<f64>,
}

/// Upper bound on stirrups along a single beam
pub const MAX_STIRRUPS_PER_BEAM: usize = 100_000;

/// Compute stirrup positions along a beam of `length_mm`.
///
/// Fails with `InvalidParameter` on `stirrup_spacing_mm` when the spacing
/// would put more than [`MAX_STIRRUPS_PER_BEAM`] stirrups on the beam.
pub fn stirrup_placement(
    length_mm: f64,
    cover_mm: f64,
    stirrup_diameter_mm: f64,
    spacing_mm: f64,
    end_clearance_mm: f64,
) -> RebarResult<StirrupPlacement> {
    let margin_mm = cover_mm + stirrup_diameter_mm / 2.0 + end_clearance_mm;
    let usable_length_mm = (length_mm - 2.0 * margin_mm).max(0.0);

    let positions_mm = if usable_length_mm > 0.0 && spacing_mm > 0.0 {
        let count = (usable_length_mm / spacing_mm).floor() + 1.0;
        if !count.is_finite() || count > MAX_STIRRUPS_PER_BEAM as f64 {
            return Err(RebarError::invalid_parameter(
                "stirrup_spacing_mm",
                spacing_mm.to_string(),
                format!(
                    "Spacing gives more than {} stirrups over {:.1} mm",
                    MAX_STIRRUPS_PER_BEAM, usable_length_mm
                ),
            ));
        }
        (0..count as usize)
            .map(|i| margin_mm + (i as f64 * spacing_mm).min(usable_length_mm))
            .collect()
    } else {
        Vec::new()
    };

    Ok(StirrupPlacement {
        margin_mm,
        usable_length_mm,
        positions_mm,
    })
}

/// One closed stirrup: four segments, corner to corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StirrupLoop {
    /// Distance along the beam from its start
    pub position_mm: f64,
    pub segments: [Segment; 4],
}

impl StirrupLoop {
    /// Rectangle centered on `center`, spanning `±half_width` laterally and
    /// `±half_depth` vertically.
    ///
    /// Corners run bottom-left, bottom-right, top-right, top-left (looking
    /// along the beam axis), and the last segment ends on the first corner.
    pub fn rectangle(
        position_mm: f64,
        center: &Point3,
        frame: &LocalFrame,
        half_width: f64,
        half_depth: f64,
    ) -> StirrupLoop {
        let corner = |u: f64, v: f64| *center + frame.section_offset(u, v);
        let c0 = corner(-half_width, -half_depth);
        let c1 = corner(half_width, -half_depth);
        let c2 = corner(half_width, half_depth);
        let c3 = corner(-half_width, half_depth);

        StirrupLoop {
            position_mm,
            segments: [
                Segment::new(c0, c1),
                Segment::new(c1, c2),
                Segment::new(c2, c3),
                Segment::new(c3, c0),
            ],
        }
    }

    pub fn corners(&self) -> [Point3; 4] {
        [
            self.segments[0].start,
            self.segments[1].start,
            self.segments[2].start,
            self.segments[3].start,
        ]
    }

    pub fn is_closed(&self, tolerance: f64) -> bool {
        is_closed_loop(&self.segments, tolerance)
    }
}

/// Half-width and half-depth of the stirrup centerline rectangle.
pub fn stirrup_half_dimensions(span: &BeamSpan, params: &ReinforcementParameters) -> (f64, f64) {
    let inset = params.cover_mm + params.stirrup_radius_mm();
    (span.width_mm / 2.0 - inset, span.depth_mm / 2.0 - inset)
}

/// Stirrup loops for one beam.
///
/// Fails with `InsufficientSection` when either half-dimension is at or
/// below `section_tolerance_mm`, and with `InvalidParameter` when the spacing
/// is too fine for the beam. An empty result means the beam is too short
/// for any stirrup between the end margins.
pub fn generate_stirrups(
    span: &BeamSpan,
    frame: &LocalFrame,
    params: &ReinforcementParameters,
    end_clearance_mm: f64,
    section_tolerance_mm: f64,
) -> RebarResult<(StirrupPlacement, Vec<StirrupLoop>)> {
    let (half_width, half_depth) = stirrup_half_dimensions(span, params);
    if half_width <= section_tolerance_mm || half_depth <= section_tolerance_mm {
        return Err(RebarError::insufficient_section(&span.label, half_width, half_depth));
    }

    let placement = stirrup_placement(
        span.length_mm(),
        params.cover_mm,
        params.stirrup_diameter_mm,
        params.stirrup_spacing_mm,
        end_clearance_mm,
    )?;

    let loops = placement
        .positions_mm
        .iter()
        .map(|&distance| {
            let center = span.point_at_distance(distance);
            StirrupLoop::rectangle(distance, &center, frame, half_width, half_depth)
        })
        .collect();

    Ok((placement, loops))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector3;
    use approx::assert_relative_eq;

    fn beam(width: f64, depth: f64) -> BeamSpan {
        BeamSpan::new("B-1", Point3::origin(), Point3::new(4000.0, 0.0, 0.0), width, depth)
    }

    #[test]
    fn test_placement_reference_case() {
        let placement = stirrup_placement(4000.0, 30.0, 8.0, 150.0, 50.0).unwrap();
        assert_relative_eq!(placement.margin_mm, 84.0);
        assert_relative_eq!(placement.usable_length_mm, 3832.0);
        assert_eq!(placement.positions_mm.len(), 26);
        assert_relative_eq!(placement.positions_mm[0], 84.0);
        assert_relative_eq!(placement.positions_mm[1], 234.0);
        assert_relative_eq!(placement.positions_mm[25], 84.0 + 3750.0);
    }

    #[test]
    fn test_placement_exact_fit_ends_on_margin() {
        // usable = 1000 - 2 * 100 = 800, spacing 200 -> 5 stirrups, last at 900
        let placement = stirrup_placement(1000.0, 46.0, 8.0, 200.0, 50.0).unwrap();
        assert_eq!(placement.positions_mm.len(), 5);
        assert_relative_eq!(*placement.positions_mm.last().unwrap(), 900.0);
    }

    #[test]
    fn test_placement_short_beam() {
        let placement = stirrup_placement(150.0, 30.0, 8.0, 150.0, 50.0).unwrap();
        assert_eq!(placement.usable_length_mm, 0.0);
        assert!(placement.positions_mm.is_empty());
    }

    #[test]
    fn test_placement_rejects_runaway_count() {
        for spacing in [1e-300, 1e-3] {
            let err = stirrup_placement(4000.0, 30.0, 8.0, spacing, 50.0).unwrap_err();
            assert!(matches!(err, RebarError::InvalidParameter { ref field, .. } if field == "stirrup_spacing_mm"));
        }
        // 3832 / 0.5 + 1 stays under the cap
        let placement = stirrup_placement(4000.0, 30.0, 8.0, 0.5, 50.0).unwrap();
        assert_eq!(placement.positions_mm.len(), 7665);
    }

    #[test]
    fn test_loops_are_closed_rectangles() {
        let span = beam(400.0, 600.0);
        let frame = LocalFrame::from_span(&span, &Vector3::z()).unwrap();
        let (_, loops) = generate_stirrups(&span, &frame, &ReinforcementParameters::default(), 50.0, 1e-3).unwrap();

        assert_eq!(loops.len(), 26);
        for stirrup in &loops {
            // Exact closure by construction
            assert_eq!(stirrup.segments[3].end, stirrup.segments[0].start);
            assert!(stirrup.is_closed(0.0));

            // 2 * 166 wide, 2 * 266 deep
            assert_relative_eq!(stirrup.segments[0].length(), 332.0, epsilon = 1e-9);
            assert_relative_eq!(stirrup.segments[1].length(), 532.0, epsilon = 1e-9);

            // Every corner lies in the plane x = position
            for corner in stirrup.corners() {
                assert_relative_eq!(corner.x, stirrup.position_mm, epsilon = 1e-9);
            }
        }
        let first = loops[0].corners();
        assert_relative_eq!(first[0], Point3::new(84.0, -166.0, -266.0), epsilon = 1e-9);
        assert_relative_eq!(first[2], Point3::new(84.0, 166.0, 266.0), epsilon = 1e-9);
    }

    #[test]
    fn test_insufficient_section() {
        let span = beam(400.0, 60.0);
        let frame = LocalFrame::from_span(&span, &Vector3::z()).unwrap();
        let err = generate_stirrups(&span, &frame, &ReinforcementParameters::default(), 50.0, 1e-3).unwrap_err();
        match err {
            RebarError::InsufficientSection {
                half_width_mm,
                half_depth_mm,
                ..
            } => {
                assert_relative_eq!(half_width_mm, 166.0);
                assert_relative_eq!(half_depth_mm, -4.0);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_half_dimension_at_tolerance_is_insufficient() {
        // 2 * (30 + 4) = 68 -> half-width exactly 0
        let span = beam(68.0, 600.0);
        let frame = LocalFrame::from_span(&span, &Vector3::z()).unwrap();
        assert!(generate_stirrups(&span, &frame, &ReinforcementParameters::default(), 50.0, 1e-3).is_err());
    }
}
