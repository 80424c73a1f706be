//! Label placement along great circle and rhumb line segments.
//!
//! The search starts at the segment midpoint and walks outward in steps of
//! [`FIND_TEXT_POS_STEP`] until the label box fits the screen. Nothing is
//! extrapolated: if no station fits the caller draws the line without label.

use glam::DVec2;

use crate::geo::GeoPoint;
use crate::map::convert::{CoordinateConverter, ScreenPoint};

/// Evaluate 50 text placement positions along line
pub const FIND_TEXT_POS_STEP: f64 = 0.02;

/// Segments shorter than this have no usable label position
const MIN_SEGMENT_METER: f64 = 1.0;

/// Result of a successful great circle label search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    /// Label center
    pub pos: ScreenPoint,
    /// Compass bearing of the path at the label
    pub bearing: f64,
    /// Screen rotation in degrees (clockwise from the x axis) keeping text upright
    pub rotation: f64,
}

/// Fractions of the path to try: midpoint first, then alternating outward,
/// never the endpoints themselves.
fn stations() -> impl Iterator<Item = f64> {
    let steps = (0.5 / FIND_TEXT_POS_STEP).round() as i32;
    std::iter::once(0.5).chain((1..steps).flat_map(|k| {
        let offset = k as f64 * FIND_TEXT_POS_STEP;
        [0.5 - offset, 0.5 + offset]
    }))
}

/// True if a `width` x `height` box centered at `center` and rotated by
/// `angle` radians lies fully inside the screen
fn box_fits(
    converter: &dyn CoordinateConverter,
    center: ScreenPoint,
    angle: f64,
    width: f64,
    height: f64,
) -> bool {
    let rect = converter.screen_rect();
    let (sin, cos) = angle.sin_cos();
    let axis_x = DVec2::new(cos, sin) * (width / 2.0);
    let axis_y = DVec2::new(-sin, cos) * (height / 2.0);
    [
        center + axis_x + axis_y,
        center + axis_x - axis_y,
        center - axis_x + axis_y,
        center - axis_x - axis_y,
    ]
    .into_iter()
    .all(|corner| rect.contains(corner))
}

/// Station is not usable if it lands on top of a projected endpoint
fn near_endpoint(pos: ScreenPoint, ends: &[Option<ScreenPoint>; 2]) -> bool {
    ends.iter()
        .flatten()
        .any(|end| end.distance_squared(pos) < 0.25)
}

/// Keep text readable: rotations outside (-90, 90] are flipped by 180°
fn upright(rotation_deg: f64) -> f64 {
    let r = (rotation_deg + 180.0).rem_euclid(360.0) - 180.0;
    if r > 90.0 {
        r - 180.0
    } else if r <= -90.0 {
        r + 180.0
    } else {
        r
    }
}

/// Find text position along a great circle route
pub fn find_text_pos(
    converter: &dyn CoordinateConverter,
    pos1: &GeoPoint,
    pos2: &GeoPoint,
    text_width: f64,
    text_height: f64,
) -> Option<TextPlacement> {
    let distance = pos1.distance_meter_to(pos2);
    find_text_pos_dist(converter, pos1, pos2, distance, text_width, text_height)
}

/// Find text position along a great circle route with a precomputed distance in meters
pub fn find_text_pos_dist(
    converter: &dyn CoordinateConverter,
    pos1: &GeoPoint,
    pos2: &GeoPoint,
    distance_meter: f64,
    text_width: f64,
    text_height: f64,
) -> Option<TextPlacement> {
    if !(distance_meter >= MIN_SEGMENT_METER) || pos1.almost_equal(pos2, 1e-9) {
        return None;
    }

    let ends = [converter.project(pos1), converter.project(pos2)];
    // Short probe used to get the local screen direction of the path
    let probe = (distance_meter * FIND_TEXT_POS_STEP / 2.0).max(MIN_SEGMENT_METER);

    for fraction in stations() {
        let pos = pos1.interpolate(pos2, distance_meter, fraction);
        let Some(screen) = converter.project(&pos) else {
            continue;
        };
        if near_endpoint(screen, &ends) {
            continue;
        }

        let bearing = pos.bearing_to(pos2);
        let Some(ahead) = converter.project(&pos.endpoint(probe, bearing)) else {
            continue;
        };
        let dir = ahead - screen;
        if dir.length_squared() < f64::EPSILON {
            continue;
        }
        let angle = dir.y.atan2(dir.x);

        if box_fits(converter, screen, angle, text_width, text_height) {
            return Some(TextPlacement {
                pos: screen,
                bearing,
                rotation: upright(angle.to_degrees()),
            });
        }
    }
    None
}

/// Find text position along a rhumb line route.
///
/// A rhumb line keeps one course, so the label box stays axis aligned and
/// only the screen position is returned.
pub fn find_text_pos_rhumb(
    converter: &dyn CoordinateConverter,
    pos1: &GeoPoint,
    pos2: &GeoPoint,
    distance_meter: f64,
    text_width: f64,
    text_height: f64,
) -> Option<ScreenPoint> {
    if !(distance_meter >= MIN_SEGMENT_METER) || pos1.almost_equal(pos2, 1e-9) {
        return None;
    }

    let ends = [converter.project(pos1), converter.project(pos2)];
    stations().find_map(|fraction| {
        let pos = pos1.interpolate_rhumb(pos2, distance_meter, fraction);
        let screen = converter.project(&pos)?;
        (!near_endpoint(screen, &ends)
            && box_fits(converter, screen, 0.0, text_width, text_height))
        .then_some(screen)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::nm_to_meter;
    use crate::map::Viewport;

    fn equator_segment() -> (GeoPoint, GeoPoint) {
        let p1 = GeoPoint::new(0.0, 0.0);
        let p2 = p1.endpoint(nm_to_meter(50.0), 90.0);
        (p1, p2)
    }

    #[test]
    fn test_stations_midpoint_first() {
        let all: Vec<f64> = stations().collect();
        assert_eq!(all.len(), 49);
        assert_eq!(all[0], 0.5);
        assert!((all[1] - 0.48).abs() < 1e-12);
        assert!((all[2] - 0.52).abs() < 1e-12);
        assert!(all.iter().all(|f| *f > 0.0 && *f < 1.0));
    }

    #[test]
    fn test_equator_segment_label_at_midpoint() {
        let (p1, p2) = equator_segment();
        let vp = Viewport::new(p2.lon / 2.0, 0.0, 200.0, 800, 600);

        let placement = find_text_pos(&vp, &p1, &p2, 40.0, 12.0).expect("label position");
        let mid = vp.project(&p1.interpolate(&p2, p1.distance_meter_to(&p2), 0.5)).unwrap();
        assert!(placement.pos.distance(mid) < 1.0);
        assert!((placement.bearing - 90.0).abs() < 0.5, "bearing {}", placement.bearing);
        assert!(placement.rotation.abs() < 0.5);
    }

    #[test]
    fn test_reverse_direction_keeps_text_upright() {
        let (p1, p2) = equator_segment();
        let vp = Viewport::new(p2.lon / 2.0, 0.0, 200.0, 800, 600);

        let placement = find_text_pos(&vp, &p2, &p1, 40.0, 12.0).unwrap();
        assert!((placement.bearing - 270.0).abs() < 0.5);
        assert!(placement.rotation.abs() < 0.5);
    }

    #[test]
    fn test_zero_length_segment() {
        let vp = Viewport::new(0.0, 0.0, 200.0, 800, 600);
        let p = GeoPoint::new(0.0, 0.0);
        assert!(find_text_pos(&vp, &p, &p, 40.0, 12.0).is_none());
        assert!(find_text_pos_rhumb(&vp, &p, &p, 0.0, 40.0, 12.0).is_none());
    }

    #[test]
    fn test_segment_outside_viewport() {
        let (p1, p2) = equator_segment();
        let vp = Viewport::new(120.0, 45.0, 200.0, 800, 600);
        assert!(find_text_pos(&vp, &p1, &p2, 40.0, 12.0).is_none());
        let dist = p1.distance_meter_rhumb_to(&p2);
        assert!(find_text_pos_rhumb(&vp, &p1, &p2, dist, 40.0, 12.0).is_none());
    }

    #[test]
    fn test_midpoint_offscreen_moves_outward() {
        let (p1, p2) = equator_segment();
        // Only the western quarter of the segment is on screen
        let vp = Viewport::new(p2.lon * 0.1, 0.0, 1600.0, 400, 300);
        let mid = vp.project(&p1.interpolate(&p2, p1.distance_meter_to(&p2), 0.5)).unwrap();
        assert!(!vp.is_visible(mid));

        let placement = find_text_pos(&vp, &p1, &p2, 40.0, 12.0).expect("label position");
        assert!(vp.is_visible(placement.pos));
        assert!(placement.pos.x < mid.x);
    }

    #[test]
    fn test_label_too_large_for_screen() {
        let (p1, p2) = equator_segment();
        let vp = Viewport::new(p2.lon / 2.0, 0.0, 200.0, 800, 600);
        assert!(find_text_pos(&vp, &p1, &p2, 2000.0, 12.0).is_none());
    }

    #[test]
    fn test_rhumb_label() {
        let p1 = GeoPoint::new(-1.0, 10.0);
        let p2 = GeoPoint::new(1.0, 10.5);
        let vp = Viewport::new(0.0, 10.25, 100.0, 800, 600);
        let dist = p1.distance_meter_rhumb_to(&p2);
        let pos = find_text_pos_rhumb(&vp, &p1, &p2, dist, 40.0, 12.0).expect("label position");
        let mid = vp.project(&p1.interpolate_rhumb(&p2, dist, 0.5)).unwrap();
        assert!(pos.distance(mid) < 1.0);
    }
}
