//! # Longitudinal Bars
//!
//! Top and bottom bar centerlines: the beam centerline shifted across the
//! section by each bar's lateral offset and the layer's vertical offset.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::beam::BeamSpan;
use crate::frame::LocalFrame;
use crate::geometry::Segment;
use crate::params::ReinforcementParameters;

use super::offsets::{compute_offsets, usable_width};

/// Which layer a longitudinal bar belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarRole {
    Top,
    Bottom,
}

impl fmt::Display for BarRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarRole::Top => f.write_str("top"),
            BarRole::Bottom => f.write_str("bottom"),
        }
    }
}

/// One longitudinal bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarCenterline {
    pub role: BarRole,
    pub lateral_offset_mm: f64,
    pub vertical_offset_mm: f64,
    pub segment: Segment,
}

/// Vertical offset of a bar layer from the beam centerline.
///
/// Top bars sit at `+(depth/2 - cover - bar_radius)`, bottom bars at the
/// negation.
pub fn layer_vertical_offset(role: BarRole, depth_mm: f64, params: &ReinforcementParameters) -> f64 {
    let magnitude = depth_mm / 2.0 - params.cover_mm - params.bar_radius_mm();
    match role {
        BarRole::Top => magnitude,
        BarRole::Bottom => -magnitude,
    }
}

/// Usable width for the longitudinal bars of `span`.
pub fn bar_usable_width(span: &BeamSpan, params: &ReinforcementParameters) -> f64 {
    usable_width(span.width_mm, params.cover_mm, params.bar_diameter_mm)
}

/// All top bars followed by all bottom bars, each layer ordered from the
/// most negative lateral offset to the most positive.
pub fn generate_bars(span: &BeamSpan, frame: &LocalFrame, params: &ReinforcementParameters) -> Vec<BarCenterline> {
    let width = bar_usable_width(span, params);
    let centerline = span.centerline();

    [(BarRole::Top, params.top_count), (BarRole::Bottom, params.bottom_count)]
        .into_iter()
        .flat_map(|(role, count)| {
            let vertical = layer_vertical_offset(role, span.depth_mm, params);
            compute_offsets(count, width)
                .into_iter()
                .map(move |lateral| BarCenterline {
                    role,
                    lateral_offset_mm: lateral,
                    vertical_offset_mm: vertical,
                    segment: centerline.translated(&frame.section_offset(lateral, vertical)),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point3, Vector3};
    use approx::assert_relative_eq;

    fn beam() -> BeamSpan {
        BeamSpan::new(
            "B-1",
            Point3::new(0.0, 0.0, 3000.0),
            Point3::new(4000.0, 0.0, 3000.0),
            400.0,
            600.0,
        )
    }

    fn params(top: u32, bottom: u32) -> ReinforcementParameters {
        ReinforcementParameters {
            top_count: top,
            bottom_count: bottom,
            ..Default::default()
        }
    }

    #[test]
    fn test_vertical_offsets() {
        let p = params(2, 2);
        // 600/2 - 30 - 8 = 262
        assert_relative_eq!(layer_vertical_offset(BarRole::Top, 600.0, &p), 262.0);
        assert_relative_eq!(layer_vertical_offset(BarRole::Bottom, 600.0, &p), -262.0);
    }

    #[test]
    fn test_top_bar_positions() {
        let span = beam();
        let frame = LocalFrame::from_span(&span, &Vector3::z()).unwrap();
        let bars = generate_bars(&span, &frame, &params(2, 0));

        assert_eq!(bars.len(), 2);
        assert!(bars.iter().all(|b| b.role == BarRole::Top));
        assert_eq!(bars[0].lateral_offset_mm, -162.0);
        assert_eq!(bars[1].lateral_offset_mm, 162.0);

        // Lateral axis is +Y for a beam along +X with Z up
        assert_eq!(bars[0].segment.start, Point3::new(0.0, -162.0, 3262.0));
        assert_eq!(bars[0].segment.end, Point3::new(4000.0, -162.0, 3262.0));
        assert_eq!(bars[1].segment.start, Point3::new(0.0, 162.0, 3262.0));
    }

    #[test]
    fn test_layers_and_order() {
        let span = beam();
        let frame = LocalFrame::from_span(&span, &Vector3::z()).unwrap();
        let bars = generate_bars(&span, &frame, &params(2, 3));

        assert_eq!(bars.len(), 5);
        assert_eq!(bars.iter().filter(|b| b.role == BarRole::Top).count(), 2);
        let bottom: Vec<_> = bars.iter().filter(|b| b.role == BarRole::Bottom).collect();
        assert_eq!(bottom.len(), 3);
        assert_eq!(bottom[1].lateral_offset_mm, 0.0);
        assert_relative_eq!(bottom[1].segment.start.z, 3000.0 - 262.0);
    }

    #[test]
    fn test_bars_parallel_to_skewed_beam() {
        let span = BeamSpan::new("B-2", Point3::origin(), Point3::new(3000.0, 4000.0, 0.0), 300.0, 500.0);
        let frame = LocalFrame::from_span(&span, &Vector3::z()).unwrap();
        for bar in generate_bars(&span, &frame, &params(3, 3)) {
            assert_relative_eq!(bar.segment.length(), 5000.0, epsilon = 1e-9);
            let dir = bar.segment.direction().unwrap();
            assert_relative_eq!(dir.dot(&frame.axial), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_no_bars() {
        let span = beam();
        let frame = LocalFrame::from_span(&span, &Vector3::z()).unwrap();
        assert!(generate_bars(&span, &frame, &params(0, 0)).is_empty());
    }
}
