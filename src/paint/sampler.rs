use crate::map::convert::ScaleProvider;

/// Minimum points to use for a circle
pub const CIRCLE_MIN_POINTS: usize = 16;
/// Maximum points to use for a circle
pub const CIRCLE_MAX_POINTS: usize = 72;

/// Number of points approximating a circle of `radius_nm` at the current zoom.
/// Grows with the on-screen radius, fast mode uses a tenth of the density.
pub fn circle_point_count(scale: &dyn ScaleProvider, radius_nm: f64, fast: bool) -> usize {
    let pixel = scale.pixel_for_nm(radius_nm);
    let pixel = if pixel.is_nan() { 0.0 } else { pixel.max(0.0) };
    let divisor = if fast { 20.0 } else { 2.0 };
    ((pixel / divisor) as usize).clamp(CIRCLE_MIN_POINTS, CIRCLE_MAX_POINTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Viewport;

    #[test]
    fn test_bounds_for_all_radii() {
        for zoom in [0.5, 1.0, 10.0, 100.0, 1000.0] {
            let vp = Viewport::new(10.0, 50.0, zoom, 800, 600);
            let mut last = 0;
            for radius in [0.0, 0.1, 1.0, 5.0, 20.0, 100.0, 500.0, 5000.0] {
                let count = circle_point_count(&vp, radius, false);
                let fast = circle_point_count(&vp, radius, true);
                assert!((CIRCLE_MIN_POINTS..=CIRCLE_MAX_POINTS).contains(&count));
                assert!((CIRCLE_MIN_POINTS..=CIRCLE_MAX_POINTS).contains(&fast));
                assert!(fast <= count);
                assert!(count >= last, "not monotonic at zoom {zoom} radius {radius}");
                last = count;
            }
        }
    }

    #[test]
    fn test_density_follows_screen_radius() {
        let vp = Viewport::new(0.0, 0.0, 200.0, 800, 600);
        // ~74 px radius
        let pixel = vp.pixel_for_nm(10.0);
        assert_eq!(circle_point_count(&vp, 10.0, false), (pixel / 2.0) as usize);
        assert_eq!(circle_point_count(&vp, 10.0, true), CIRCLE_MIN_POINTS);
    }

    #[test]
    fn test_degenerate_input() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 800, 600);
        assert_eq!(circle_point_count(&vp, -5.0, false), CIRCLE_MIN_POINTS);
        assert_eq!(circle_point_count(&vp, f64::NAN, false), CIRCLE_MIN_POINTS);
        assert_eq!(circle_point_count(&vp, f64::INFINITY, false), CIRCLE_MAX_POINTS);
    }
}
