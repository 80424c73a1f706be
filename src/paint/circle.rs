use log::trace;

use crate::geo::{nm_to_meter, GeoPoint};
use crate::map::convert::{CoordinateConverter, ScaleProvider, ScreenPoint};
use crate::paint::context::RenderContext;
use crate::paint::sampler::circle_point_count;

/// Screen approximation of a geographic circle
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CircleApproximation {
    /// Closed ring, first point repeated at the end. Points that cannot be
    /// projected are left out.
    pub points: Vec<ScreenPoint>,
    /// Suggested position for a label next to the circle
    pub text_anchor: Option<ScreenPoint>,
}

/// Draw a circle with the current pen and return label placement hints.
/// The number of points depends on the on-screen radius.
pub fn paint_circle(
    ctx: &mut RenderContext,
    center: &GeoPoint,
    radius_nm: f64,
    fast: bool,
) -> CircleApproximation {
    let radius_nm = if radius_nm.is_finite() { radius_nm.max(0.0) } else { 0.0 };
    let num_points = circle_point_count(ctx.scale, radius_nm, fast);
    let radius_meter = nm_to_meter(radius_nm);

    // Bearing 0 first, last point closes the ring
    let mut projected: Vec<Option<ScreenPoint>> = (0..num_points)
        .map(|i| {
            let bearing = 360.0 * i as f64 / num_points as f64;
            ctx.converter.project(&center.endpoint(radius_meter, bearing))
        })
        .collect();
    projected.push(projected[0]);

    let screen = ctx.converter.screen_rect();
    let cull_rect = screen.expanded(1.0);

    let mut run: Vec<ScreenPoint> = Vec::new();
    let mut top_anchor: Option<ScreenPoint> = None;

    for pair in projected.windows(2) {
        let (Some(p1), Some(p2)) = (pair[0], pair[1]) else {
            flush(ctx, &mut run);
            continue;
        };

        if !cull_rect.segment_might_be_visible(p1, p2) {
            flush(ctx, &mut run);
            continue;
        }

        if run.is_empty() {
            run.push(p1);
        }
        run.push(p2);

        // Remember segment center for text placement, topmost wins
        let mid = (p1 + p2) / 2.0;
        if screen.contains(mid) && top_anchor.map_or(true, |top| mid.y < top.y) {
            top_anchor = Some(mid);
        }
    }
    flush(ctx, &mut run);

    let text_anchor = top_anchor.or(projected[0]);
    if top_anchor.is_none() {
        trace!("Circle at {center:?} with {radius_nm} nm not visible");
    }

    CircleApproximation {
        points: projected.into_iter().flatten().collect(),
        text_anchor,
    }
}

fn flush(ctx: &mut RenderContext, run: &mut Vec<ScreenPoint>) {
    if run.len() > 1 {
        ctx.painter.draw_polyline(run);
    }
    run.clear();
}
