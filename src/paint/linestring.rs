use log::trace;

use crate::geo::{normalize_lon, walk_great_circle, GeoPoint};
use crate::map::convert::{CoordinateConverter, ScreenPoint};
use crate::paint::context::RenderContext;

/// A geographic line. Pre-tessellated lines are drawn vertex to vertex,
/// otherwise every segment follows the great circle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineString {
    pub points: Vec<GeoPoint>,
    pub tessellated: bool,
}

impl LineString {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self {
            points,
            tessellated: false,
        }
    }

    /// Points are already dense enough to be connected by straight screen lines
    pub fn pre_tessellated(points: Vec<GeoPoint>) -> Self {
        Self {
            points,
            tessellated: true,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl From<Vec<(f64, f64)>> for LineString {
    fn from(coords: Vec<(f64, f64)>) -> Self {
        LineString::pre_tessellated(
            coords
                .into_iter()
                .map(|(lon, lat)| GeoPoint::new(lon, lat))
                .collect(),
        )
    }
}

/// Draw a line string with the current pen
pub fn draw_line_string(ctx: &mut RenderContext, line: &LineString) {
    draw_points(ctx, &line.points, !line.tessellated);
}

/// Draw a raw sequence of positions connected by great circle segments
pub fn draw_geo_path(ctx: &mut RenderContext, points: &[GeoPoint]) {
    draw_points(ctx, points, true);
}

fn draw_points(ctx: &mut RenderContext, points: &[GeoPoint], great_circle: bool) {
    if ctx.is_overflow() || points.len() < 2 {
        return;
    }

    let mut dense = Vec::with_capacity(points.len());
    dense.push(points[0]);
    for pair in points.windows(2) {
        if great_circle {
            walk_great_circle(pair[0], pair[1], |p| dense.push(p));
        } else {
            dense.push(pair[1]);
        }
    }

    let cull_rect = ctx.converter.screen_rect().expanded(1.0);

    let mut run: Vec<ScreenPoint> = Vec::new();
    let mut prev: Option<(GeoPoint, ScreenPoint)> = None;

    for pos in dense {
        // Invalid vertices break the path like unprojectable ones
        let projected = if pos.is_valid() {
            ctx.converter.project(&pos)
        } else {
            None
        };

        if let (Some((prev_pos, prev_screen)), Some(cur)) = (prev, projected) {
            let wraps = wraps_around(&prev_pos, &pos, cur.x - prev_screen.x);
            if wraps || !cull_rect.segment_might_be_visible(prev_screen, cur) {
                if !flush(ctx, &mut run) {
                    return;
                }
            } else {
                if run.is_empty() {
                    run.push(prev_screen);
                }
                run.push(cur);
            }
        } else if !flush(ctx, &mut run) {
            return;
        }

        prev = projected.map(|screen| (pos, screen));
    }
    flush(ctx, &mut run);
}

/// Segment crosses the antimeridian or the seam opposite the view center.
/// At the seam the screen direction disagrees with the shorter longitude delta.
fn wraps_around(from: &GeoPoint, to: &GeoPoint, screen_dx: f64) -> bool {
    let dlon = normalize_lon(to.lon - from.lon);
    (to.lon - from.lon).abs() > 180.0 || (screen_dx.abs() >= 1.0 && screen_dx * dlon < 0.0)
}

/// Emit the collected run as one primitive. Returns false once the frame overflows.
fn flush(ctx: &mut RenderContext, run: &mut Vec<ScreenPoint>) -> bool {
    if run.len() < 2 {
        run.clear();
        return true;
    }

    if ctx.obj_count() {
        trace!("Dropping path with {} points after overflow", run.len());
        run.clear();
        return false;
    }

    ctx.painter.draw_polyline(run);
    run.clear();
    true
}
