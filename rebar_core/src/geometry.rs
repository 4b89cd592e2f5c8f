//! # Geometry Primitives
//!
//! Points, vectors and bounded line segments, plus the small set of curve
//! helpers the layout code needs (translation, parametric evaluation,
//! division, loop closure). Coordinates are millimetres.

use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::errors::{RebarError, RebarResult};

/// 3D point (mm)
pub type Point3 = na::Point3<f64>;

/// 3D vector (mm)
pub type Vector3 = na::Vector3<f64>;

/// Lengths at or below this are treated as zero
pub const EPSILON: f64 = 1.0e-9;

/// Bounded straight line segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point3,
    pub end: Point3,
}

impl Segment {
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Segment length
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Unit direction from start to end, `None` for a zero-length segment
    pub fn direction(&self) -> Option<Vector3> {
        (self.end - self.start).try_normalize(EPSILON)
    }

    /// Evaluate at normalized parameter `t` (0 = start, 1 = end). Not clamped.
    pub fn point_at_parameter(&self, t: f64) -> Point3 {
        self.start + (self.end - self.start) * t
    }

    /// Copy of this segment moved by `offset`
    pub fn translated(&self, offset: &Vector3) -> Segment {
        Segment::new(self.start + *offset, self.end + *offset)
    }

    /// Midpoint
    pub fn midpoint(&self) -> Point3 {
        na::center(&self.start, &self.end)
    }
}

/// Move `point` by `distance` along `direction` (normalized first).
pub fn translate_point(point: &Point3, direction: &Vector3, distance: f64) -> RebarResult<Point3> {
    let unit = direction
        .try_normalize(EPSILON)
        .ok_or_else(|| RebarError::degenerate_geometry("<point>", "Translation direction has zero length"))?;
    Ok(*point + unit * distance)
}

/// Segment starting at `start`, running `length` along `direction`.
pub fn segment_from_vector(start: &Point3, direction: &Vector3, length: f64) -> RebarResult<Segment> {
    let end = translate_point(start, direction, length)?;
    Ok(Segment::new(*start, end))
}

/// Points on `segment` at each normalized parameter.
pub fn points_at_parameters(segment: &Segment, params: &[f64]) -> Vec<Point3> {
    params.iter().map(|&t| segment.point_at_parameter(t)).collect()
}

/// Split `segment` at the given normalized parameters.
///
/// Parameters are sorted first; at least two are required. `[0.0, 0.5, 1.0]`
/// yields the two halves of the segment.
pub fn divide_segment(segment: &Segment, params: &[f64]) -> RebarResult<Vec<Segment>> {
    if params.len() < 2 {
        return Err(RebarError::invalid_parameter(
            "params",
            params.len().to_string(),
            "At least two parameters are required to divide a segment",
        ));
    }
    if let Some(bad) = params.iter().find(|t| !t.is_finite()) {
        return Err(RebarError::invalid_parameter(
            "params",
            bad.to_string(),
            "Division parameters must be finite",
        ));
    }

    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let points = points_at_parameters(segment, &sorted);
    Ok(points
        .windows(2)
        .map(|pair| Segment::new(pair[0], pair[1]))
        .collect())
}

/// True when every segment ends where the next one (cyclically) starts.
pub fn is_closed_loop(segments: &[Segment], tolerance: f64) -> bool {
    if segments.is_empty() {
        return false;
    }
    segments.iter().enumerate().all(|(i, seg)| {
        let next = &segments[(i + 1) % segments.len()];
        (seg.end - next.start).norm() <= tolerance
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn x_segment() -> Segment {
        Segment::new(Point3::origin(), Point3::new(1000.0, 0.0, 0.0))
    }

    #[test]
    fn test_segment_basics() {
        let seg = x_segment();
        assert_relative_eq!(seg.length(), 1000.0);
        assert_eq!(seg.direction(), Some(Vector3::x()));
        assert_eq!(seg.midpoint(), Point3::new(500.0, 0.0, 0.0));
        assert_eq!(seg.point_at_parameter(0.25), Point3::new(250.0, 0.0, 0.0));
    }

    #[test]
    fn test_zero_length_direction() {
        let seg = Segment::new(Point3::new(1.0, 2.0, 3.0), Point3::new(1.0, 2.0, 3.0));
        assert!(seg.direction().is_none());
    }

    #[test]
    fn test_translate_point_normalizes_direction() {
        let p = translate_point(&Point3::origin(), &Vector3::new(0.0, 0.0, 10.0), 25.0).unwrap();
        assert_relative_eq!(p.z, 25.0);

        let err = translate_point(&Point3::origin(), &Vector3::zeros(), 1.0).unwrap_err();
        assert_eq!(err.error_code(), "DEGENERATE_GEOMETRY");
    }

    #[test]
    fn test_segment_from_vector() {
        let seg = segment_from_vector(&Point3::new(0.0, 100.0, 0.0), &Vector3::new(3.0, 4.0, 0.0), 50.0).unwrap();
        assert_relative_eq!(seg.length(), 50.0, epsilon = 1e-12);
        assert_relative_eq!(seg.end.x, 30.0, epsilon = 1e-12);
        assert_relative_eq!(seg.end.y, 140.0, epsilon = 1e-12);
    }

    #[test]
    fn test_divide_segment_sorts_params() {
        let parts = divide_segment(&x_segment(), &[1.0, 0.0, 0.5]).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].end, Point3::new(500.0, 0.0, 0.0));
        assert_eq!(parts[1].start, parts[0].end);
        assert_eq!(parts[1].end, Point3::new(1000.0, 0.0, 0.0));
    }

    #[test]
    fn test_divide_segment_needs_two_params() {
        assert!(divide_segment(&x_segment(), &[0.5]).is_err());
        assert!(divide_segment(&x_segment(), &[0.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_closed_loop_detection() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(1.0, 1.0, 0.0);
        let triangle = [Segment::new(a, b), Segment::new(b, c), Segment::new(c, a)];
        assert!(is_closed_loop(&triangle, 1e-9));

        let open = [Segment::new(a, b), Segment::new(b, c)];
        assert!(!is_closed_loop(&open, 1e-9));
        assert!(!is_closed_loop(&[], 1e-9));
    }
}
