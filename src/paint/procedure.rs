//! Screen space geometry for arcs, holding patterns and procedure turns.
//!
//! Nothing here projects coordinates. Callers convert the anchor positions to
//! screen first. Angles are compass degrees (0 = up on screen, clockwise).
//! Left variants are built as the exact mirror of the right variants across
//! the reference course through the anchor.

use glam::{DVec2, IVec2, Vec2};

use crate::geo::normalize_course;
use crate::map::convert::{ScaleProvider, ScreenPoint};
use crate::paint::backend::PaintBackend;
use crate::paint::context::RenderContext;

/// Procedure turn outbound leg length
pub const PROCEDURE_TURN_LEG_NM: f64 = 3.0;

/// Segments per 180° of turn
const TURN_SEGMENTS: usize = 18;

/// Arc step when tessellating arcs
const ARC_STEP_DEG: f64 = 5.0;

const EPSILON: f64 = 1e-9;

/// Straight screen segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenLine {
    pub p1: ScreenPoint,
    pub p2: ScreenPoint,
}

impl ScreenLine {
    pub fn new(p1: ScreenPoint, p2: ScreenPoint) -> Self {
        Self { p1, p2 }
    }

    pub fn length(&self) -> f64 {
        self.p1.distance(self.p2)
    }
}

/// Compass angle of `v` on screen (y grows downwards)
#[inline(always)]
pub fn screen_course(v: DVec2) -> f64 {
    normalize_course(v.x.atan2(-v.y).to_degrees())
}

/// Unit vector pointing to compass angle `course` on screen
#[inline(always)]
pub fn course_vector(course: f64) -> DVec2 {
    let (sin, cos) = course.to_radians().sin_cos();
    DVec2::new(sin, -cos)
}

/// Tessellate an arc. `sweep` is positive clockwise.
pub fn arc_points(center: ScreenPoint, radius: f64, start: f64, sweep: f64) -> Vec<ScreenPoint> {
    let steps = ((sweep.abs() / ARC_STEP_DEG).ceil() as usize).max(1);
    (0..=steps)
        .map(|i| center + course_vector(start + sweep * i as f64 / steps as f64) * radius)
        .collect()
}

/// Coordinate representations accepted by [`paint_arc`]
pub trait ArcCoord: Copy {
    fn to_dvec2(self) -> DVec2;
}

impl ArcCoord for DVec2 {
    fn to_dvec2(self) -> DVec2 {
        self
    }
}

impl ArcCoord for Vec2 {
    fn to_dvec2(self) -> DVec2 {
        self.as_dvec2()
    }
}

impl ArcCoord for IVec2 {
    fn to_dvec2(self) -> DVec2 {
        self.as_dvec2()
    }
}

impl ArcCoord for (f32, f32) {
    fn to_dvec2(self) -> DVec2 {
        DVec2::new(self.0 as f64, self.1 as f64)
    }
}

/// Resolved arc parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub center: ScreenPoint,
    pub radius: f64,
    /// Compass angle of the start point seen from the center
    pub start: f64,
    /// Signed sweep in degrees, positive clockwise
    pub sweep: f64,
}

/// Arc from `p1` to `p2` around `p0`. The turn direction alone picks the
/// minor or major arc: right turns always sweep clockwise, left turns
/// counter-clockwise. The radius is taken from `p1`.
pub fn arc_geometry(p1: DVec2, p2: DVec2, p0: DVec2, left: bool) -> Option<ArcGeometry> {
    let radius = p1.distance(p0);
    if !radius.is_finite() || radius < EPSILON || p1.distance(p2) < EPSILON {
        return None;
    }

    let start = screen_course(p1 - p0);
    let end = screen_course(p2 - p0);
    let sweep = if left {
        -(start - end).rem_euclid(360.0)
    } else {
        (end - start).rem_euclid(360.0)
    };
    if sweep.abs() < EPSILON {
        return None;
    }

    Some(ArcGeometry {
        center: p0,
        radius,
        start,
        sweep,
    })
}

/// Draw an arc from `p1` to `p2` around center `p0`
pub fn paint_arc<P: ArcCoord>(painter: &mut dyn PaintBackend, p1: P, p2: P, p0: P, left: bool) {
    if let Some(arc) = arc_geometry(p1.to_dvec2(), p2.to_dvec2(), p0.to_dvec2(), left) {
        painter.draw_arc(arc.center, arc.radius, arc.start, arc.sweep);
    }
}

/// Float pair variant of [`paint_arc`]
#[allow(clippy::too_many_arguments)]
pub fn paint_arc_xy(
    painter: &mut dyn PaintBackend,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    x0: f32,
    y0: f32,
    left: bool,
) {
    paint_arc(painter, (x1, y1), (x2, y2), (x0, y0), left);
}

/// Maps (along, right) coordinates relative to an anchor and course to screen.
/// `side` is -1 for left patterns which mirrors across the course line.
struct LocalFrame {
    origin: DVec2,
    forward: DVec2,
    right: DVec2,
    side: f64,
}

impl LocalFrame {
    fn new(origin: DVec2, course: f64, left: bool) -> Self {
        Self {
            origin,
            forward: course_vector(course),
            right: course_vector(course + 90.0),
            side: if left { -1.0 } else { 1.0 },
        }
    }

    #[inline(always)]
    fn to_screen(&self, along: f64, right: f64) -> DVec2 {
        self.origin + self.forward * along + self.right * (right * self.side)
    }
}

/// Closed racetrack of a holding pattern. The fix is the end of the inbound
/// leg flown on `inbound_course`. Right holds turn right over the fix.
pub fn hold_geometry(fix: DVec2, inbound_course: f64, leg_px: f64, left: bool) -> Vec<DVec2> {
    if !(leg_px > EPSILON) || !leg_px.is_finite() || !inbound_course.is_finite() {
        return Vec::new();
    }

    let frame = LocalFrame::new(fix, inbound_course, left);
    let radius = leg_px / 4.0;
    let mut points = Vec::with_capacity(2 * TURN_SEGMENTS + 3);

    // Turn over the fix to the outbound leg
    for i in 0..=TURN_SEGMENTS {
        let theta = std::f64::consts::PI * i as f64 / TURN_SEGMENTS as f64;
        points.push(frame.to_screen(radius * theta.sin(), radius - radius * theta.cos()));
    }
    // Outbound leg then turn back to the inbound leg
    for i in 0..=TURN_SEGMENTS {
        let theta = std::f64::consts::PI * i as f64 / TURN_SEGMENTS as f64;
        points.push(frame.to_screen(-leg_px - radius * theta.sin(), radius + radius * theta.cos()));
    }
    // Inbound leg back to the fix
    points.push(fix);
    points
}

/// Computed procedure turn shape
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureTurnGeometry {
    /// 45° leg, 180° turn and inbound leg
    pub path: Vec<DVec2>,
    /// Straight outbound segment from the fix to the start of the 45° leg
    pub extension: ScreenLine,
}

/// 45/180 procedure turn. The extension line runs from the fix along
/// `turn_heading` for `distance_px`. A right turn leaves it 45° to the right,
/// turns 180° left and flies back until it meets the extension line.
pub fn procedure_turn_geometry(
    fix: DVec2,
    turn_heading: f64,
    distance_px: f64,
    leg_px: f64,
    left: bool,
) -> Option<ProcedureTurnGeometry> {
    if !(distance_px > EPSILON && leg_px > EPSILON)
        || !distance_px.is_finite()
        || !leg_px.is_finite()
        || !turn_heading.is_finite()
    {
        return None;
    }

    let frame = LocalFrame::new(fix, turn_heading, left);
    let diag = std::f64::consts::FRAC_1_SQRT_2;
    let radius = leg_px / 4.0;

    // Local coordinates as (along, right)
    let start = DVec2::new(distance_px, 0.0);
    let track = DVec2::new(diag, diag);
    let turn_start = start + track * leg_px;
    let center = turn_start + DVec2::new(diag, -diag) * radius;

    let mut local = Vec::with_capacity(TURN_SEGMENTS + 3);
    local.push(start);
    let offset = turn_start - center;
    for i in 0..=TURN_SEGMENTS {
        // Counter-clockwise in the (along, right) plane
        let theta = std::f64::consts::PI * i as f64 / TURN_SEGMENTS as f64;
        let (sin, cos) = theta.sin_cos();
        local.push(center + DVec2::new(offset.x * cos + offset.y * sin, -offset.x * sin + offset.y * cos));
    }
    let turn_end = center * 2.0 - turn_start;
    local.push(turn_end - track * (leg_px - 2.0 * radius));

    Some(ProcedureTurnGeometry {
        path: local.iter().map(|p| frame.to_screen(p.x, p.y)).collect(),
        extension: ScreenLine::new(fix, frame.to_screen(distance_px, 0.0)),
    })
}

/// Draw a holding pattern at screen position (x, y)
pub fn paint_hold(ctx: &mut RenderContext, x: f32, y: f32, direction: f32, length_nm: f32, left: bool) {
    let leg_px = ctx.scale.pixel_for_nm(length_nm as f64);
    let points = hold_geometry(DVec2::new(x as f64, y as f64), direction as f64, leg_px, left);
    if points.len() > 1 {
        ctx.painter.draw_polyline(&points);
    }
}

/// Draw a procedure turn at screen position (x, y) and return the extension
/// line so the caller can draw it separately
pub fn paint_procedure_turn(
    ctx: &mut RenderContext,
    x: f32,
    y: f32,
    turn_heading: f32,
    distance_nm: f32,
    left: bool,
) -> Option<ScreenLine> {
    let distance_px = ctx.scale.pixel_for_nm(distance_nm as f64);
    let leg_px = ctx.scale.pixel_for_nm(PROCEDURE_TURN_LEG_NM);
    let turn = procedure_turn_geometry(
        DVec2::new(x as f64, y as f64),
        turn_heading as f64,
        distance_px,
        leg_px,
        left,
    )?;
    ctx.painter.draw_polyline(&turn.path);
    Some(turn.extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoRect;
    use crate::map::Viewport;
    use crate::paint::backend::{DisplayList, DrawCommand};
    use crate::paint::context::FrameOptions;
    use crate::paint::layer::MapLayer;

    /// Reflect `p` across the line through `anchor` with compass `course`
    fn mirror(p: DVec2, anchor: DVec2, course: f64) -> DVec2 {
        let dir = course_vector(course);
        let rel = p - anchor;
        anchor + dir * (2.0 * rel.dot(dir)) - rel
    }

    fn assert_mirrored(a: &[DVec2], b: &[DVec2], anchor: DVec2, course: f64) {
        assert_eq!(a.len(), b.len());
        for (pa, pb) in a.iter().zip(b) {
            assert!(mirror(*pa, anchor, course).distance(*pb) < 1e-6, "{pa} vs {pb}");
        }
    }

    #[test]
    fn test_screen_course() {
        assert!((screen_course(DVec2::new(0.0, -1.0)) - 0.0).abs() < 1e-9);
        assert!((screen_course(DVec2::new(1.0, 0.0)) - 90.0).abs() < 1e-9);
        assert!((screen_course(DVec2::new(0.0, 1.0)) - 180.0).abs() < 1e-9);
        assert!((screen_course(DVec2::new(-1.0, 0.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_arc_short_sweep_right() {
        // North point to east point, clockwise = quarter circle
        let arc = arc_geometry(
            DVec2::new(0.0, -10.0),
            DVec2::new(10.0, 0.0),
            DVec2::ZERO,
            false,
        )
        .unwrap();
        assert!((arc.radius - 10.0).abs() < 1e-9);
        assert!((arc.start - 0.0).abs() < 1e-9);
        assert!((arc.sweep - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_arc_long_sweep_left() {
        // Same endpoints turning left goes the long way round
        let arc = arc_geometry(
            DVec2::new(0.0, -10.0),
            DVec2::new(10.0, 0.0),
            DVec2::ZERO,
            true,
        )
        .unwrap();
        assert!((arc.sweep + 270.0).abs() < 1e-9);

        // Sweep ends at p2
        let points = arc_points(arc.center, arc.radius, arc.start, arc.sweep);
        assert!(points.last().unwrap().distance(DVec2::new(10.0, 0.0)) < 1e-9);
        // Passes west on the way
        assert!(points.iter().any(|p| p.distance(DVec2::new(-10.0, 0.0)) < 1e-9));
    }

    #[test]
    fn test_arc_long_sweep_right() {
        let arc = arc_geometry(
            DVec2::new(10.0, 0.0),
            DVec2::new(0.0, -10.0),
            DVec2::ZERO,
            false,
        )
        .unwrap();
        assert!((arc.sweep - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_arc_representations_agree() {
        let mut list = DisplayList::new();
        paint_arc(&mut list, IVec2::new(0, -10), IVec2::new(10, 0), IVec2::ZERO, true);
        paint_arc(&mut list, Vec2::new(0.0, -10.0), Vec2::new(10.0, 0.0), Vec2::ZERO, true);
        paint_arc_xy(&mut list, 0.0, -10.0, 10.0, 0.0, 0.0, 0.0, true);
        let arcs: Vec<_> = list.commands().to_vec();
        assert_eq!(arcs.len(), 3);
        assert_eq!(arcs[0], arcs[1]);
        assert_eq!(arcs[1], arcs[2]);
        assert!(matches!(arcs[0], DrawCommand::Arc { sweep, .. } if (sweep + 270.0).abs() < 1e-9));
    }

    #[test]
    fn test_arc_degenerate() {
        assert!(arc_geometry(DVec2::ZERO, DVec2::new(1.0, 1.0), DVec2::ZERO, false).is_none());
        assert!(arc_geometry(DVec2::X, DVec2::X, DVec2::ZERO, true).is_none());
    }

    #[test]
    fn test_hold_shape() {
        let fix = DVec2::new(100.0, 100.0);
        // Inbound north, right hold lies east of the fix
        let points = hold_geometry(fix, 0.0, 40.0, false);
        assert_eq!(points.first(), Some(&fix));
        assert_eq!(points.last(), Some(&fix));
        assert!(points.iter().all(|p| p.x >= fix.x - 1e-9));
        // Outbound leg extends south of the fix
        assert!(points.iter().any(|p| (p.y - 140.0).abs() < 1e-9));
        // Racetrack width is half the leg
        let max_x = points.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        assert!((max_x - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_hold_mirror_for_all_headings() {
        let fix = DVec2::new(50.0, 80.0);
        for heading in (0..360).step_by(15) {
            for leg in [5.0, 40.0, 333.0] {
                let right = hold_geometry(fix, heading as f64, leg, false);
                let left = hold_geometry(fix, heading as f64, leg, true);
                assert_mirrored(&right, &left, fix, heading as f64);
            }
        }
    }

    #[test]
    fn test_hold_degenerate() {
        assert!(hold_geometry(DVec2::ZERO, 90.0, 0.0, false).is_empty());
        assert!(hold_geometry(DVec2::ZERO, 90.0, -3.0, true).is_empty());
        assert!(hold_geometry(DVec2::ZERO, f64::NAN, 10.0, true).is_empty());
    }

    #[test]
    fn test_procedure_turn_extension() {
        let fix = DVec2::new(200.0, 200.0);
        let turn = procedure_turn_geometry(fix, 90.0, 50.0, 30.0, false).unwrap();
        assert_eq!(turn.extension.p1, fix);
        assert!(turn.extension.p2.distance(DVec2::new(250.0, 200.0)) < 1e-9);
        assert_eq!(turn.path.first(), Some(&turn.extension.p2));
        // Right turn towards south (screen y down) when flying east
        assert!(turn.path[1].y > 200.0);
        // Inbound leg ends on the extension line
        assert!((turn.path.last().unwrap().y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_procedure_turn_mirror() {
        let fix = DVec2::new(10.0, -20.0);
        for heading in (0..360).step_by(30) {
            let right = procedure_turn_geometry(fix, heading as f64, 60.0, 20.0, false).unwrap();
            let left = procedure_turn_geometry(fix, heading as f64, 60.0, 20.0, true).unwrap();
            assert_eq!(right.extension, left.extension);
            assert_mirrored(&right.path, &left.path, fix, heading as f64);
        }
    }

    #[test]
    fn test_paint_hold_and_turn_use_scale() {
        let vp = Viewport::new(0.0, 0.0, 200.0, 800, 600);
        let layer = MapLayer::new(f64::MAX);
        let mut list = DisplayList::new();
        let mut ctx = RenderContext::new(
            &mut list,
            &vp,
            &vp,
            &layer,
            &layer,
            GeoRect::WORLD,
            &FrameOptions::default(),
        );
        paint_hold(&mut ctx, 400.0, 300.0, 270.0, 4.0, true);
        let extension = paint_procedure_turn(&mut ctx, 400.0, 300.0, 180.0, 5.0, false).unwrap();
        assert!(paint_procedure_turn(&mut ctx, 400.0, 300.0, 180.0, 0.0, false).is_none());

        let px_per_nm = ctx.scale.pixel_for_nm(1.0);
        assert!((extension.length() - 5.0 * px_per_nm).abs() < 1e-3);
        drop(ctx);
        assert_eq!(list.polylines().count(), 2);
    }
}
