//! # Offset Distribution
//!
//! Centered, evenly spaced lateral positions for a layer of bars.

/// Usable width for bar centers: section width minus cover and one bar
/// radius on each side.
///
/// May be negative when cover and bar size exceed the section; callers decide
/// whether to report that.
pub fn usable_width(width_mm: f64, cover_mm: f64, bar_diameter_mm: f64) -> f64 {
    width_mm - 2.0 * cover_mm - bar_diameter_mm
}

/// Lateral offsets for `count` bars spread across `usable_width`.
///
/// - 0 bars: empty
/// - 1 bar: on the centerline
/// - 2+ bars: first and last exactly at `∓usable_width / 2`, the rest evenly
///   between, symmetric about zero
///
/// A negative width is not rejected; the offsets then simply run from
/// `+|w|/2` to `-|w|/2`.
pub fn compute_offsets(count: u32, usable_width: f64) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        n => {
            let half = usable_width / 2.0;
            let intervals = f64::from(n - 1);
            (0..n)
                .map(|i| {
                    if i == 0 {
                        -half
                    } else if i == n - 1 {
                        half
                    } else {
                        // (2i - (n-1)) negates exactly for mirrored indices
                        let k = 2.0 * f64::from(i) - intervals;
                        k * usable_width / (2.0 * intervals)
                    }
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_and_one_bar() {
        assert!(compute_offsets(0, 324.0).is_empty());
        assert_eq!(compute_offsets(1, 324.0), vec![0.0]);
    }

    #[test]
    fn test_two_bars_at_edges() {
        // 400 wide, 30 cover, 16 bars: 400 - 60 - 16 = 324
        let w = usable_width(400.0, 30.0, 16.0);
        assert_relative_eq!(w, 324.0);
        assert_eq!(compute_offsets(2, w), vec![-162.0, 162.0]);
    }

    #[test]
    fn test_even_spacing() {
        let offsets = compute_offsets(5, 400.0);
        assert_eq!(offsets.len(), 5);
        for pair in offsets.windows(2) {
            assert_relative_eq!(pair[1] - pair[0], 100.0, epsilon = 1e-12);
        }
        assert_eq!(offsets[2], 0.0);
    }

    #[test]
    fn test_symmetry_and_extent() {
        for n in 2..12u32 {
            let w = 287.3;
            let offsets = compute_offsets(n, w);
            let max = offsets.iter().cloned().fold(f64::MIN, f64::max);
            let min = offsets.iter().cloned().fold(f64::MAX, f64::min);
            assert_relative_eq!(max - min, w, epsilon = 1e-12);
            for (a, b) in offsets.iter().zip(offsets.iter().rev()) {
                assert_eq!(*a, -*b);
            }
        }
    }

    #[test]
    fn test_negative_width_is_passed_through() {
        let offsets = compute_offsets(2, -20.0);
        assert_eq!(offsets, vec![10.0, -10.0]);
    }
}
