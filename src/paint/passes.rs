//! Per category render passes run by the frame driver in a fixed order.
//!
//! Every pass checks the object type filter and the current map layer first,
//! then counts each object against the frame budget before drawing it.

use glam::DVec2;

use crate::geo::{meter_to_nm, GeoPoint, GeoRect};
use crate::map::convert::{CoordinateConverter, ScaleProvider, ScreenPoint};
use crate::paint::backend::{DashStyle, Pen};
use crate::paint::circle::paint_circle;
use crate::paint::context::{DisplayOptions, ObjectTypes, RenderContext};
use crate::paint::linestring::{draw_geo_path, draw_line_string, LineString};
use crate::paint::procedure::{paint_hold, paint_procedure_turn, PROCEDURE_TURN_LEG_NM};
use crate::paint::text::{find_text_pos, find_text_pos_dist, find_text_pos_rhumb};

const RING_COLOR: [u8; 3] = [200, 60, 60];
const AIRWAY_COLOR: [u8; 3] = [90, 130, 200];
const HOLD_COLOR: [u8; 3] = [40, 160, 160];
const PROCEDURE_COLOR: [u8; 3] = [160, 100, 200];
const FLIGHTPLAN_COLOR: [u8; 3] = [240, 200, 40];

/// Points per rhumb line leg
const RHUMB_LEG_POINTS: usize = 16;

/// A renderer for one map object category
pub trait MapPainter {
    fn render(&self, ctx: &mut RenderContext);
}

/// Font size from the effective layer scaled by a multiplier
fn set_layer_font(ctx: &mut RenderContext, multiplier: f32) {
    let size = ctx.sz_f(multiplier, ctx.map_layer_effective.text_size);
    ctx.painter.set_font_size(size);
}

/// Small triangle marking a fix
fn draw_fix_symbol(ctx: &mut RenderContext, pt: ScreenPoint) {
    let size =
        ctx.sz(ctx.sizes.symbol_size_navaid, ctx.map_layer_effective.symbol_size) as f64 / 2.0;
    if size < 1.0 {
        return;
    }
    let half_base = size * 0.866;
    ctx.painter.draw_polygon(&[
        pt + DVec2::new(0.0, -size),
        pt + DVec2::new(half_base, size / 2.0),
        pt + DVec2::new(-half_base, size / 2.0),
    ]);
}

/// Concentric distance rings around a center
#[derive(Debug, Clone, PartialEq)]
pub struct RangeRings {
    pub center: GeoPoint,
    pub radii_nm: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct RangeRingPainter {
    pub rings: Vec<RangeRings>,
}

impl MapPainter for RangeRingPainter {
    fn render(&self, ctx: &mut RenderContext) {
        if !ctx.object_types_contain(ObjectTypes::RANGE_RINGS)
            || !ctx.map_layer.range_rings
            || !ctx.details_allowed()
        {
            return;
        }

        let width = ctx.sz_f(ctx.sizes.thickness_range_distance, 1.5);
        ctx.painter.set_pen(Pen::new(RING_COLOR, width));
        ctx.sz_font(1.0);
        let labels = ctx.map_layer_effective.range_ring_text
            && ctx.d_opt(DisplayOptions::RING_LABELS)
            && ctx.labels_allowed();

        let fast = ctx.draw_fast;
        for rings in &self.rings {
            for &radius in &rings.radii_nm {
                if ctx.obj_count() {
                    return;
                }

                let circle = paint_circle(ctx, &rings.center, radius, fast);
                if !labels {
                    continue;
                }
                if let Some(anchor) = circle.text_anchor.filter(|a| ctx.converter.is_visible(*a)) {
                    ctx.painter.draw_text(anchor, 0.0, &format!("{radius:.0} nm"));
                }
            }
        }
    }
}

/// Airway segment between two fixes
#[derive(Debug, Clone, PartialEq)]
pub struct Airway {
    pub name: String,
    pub from: GeoPoint,
    pub to: GeoPoint,
}

#[derive(Debug, Clone, Default)]
pub struct AirwayPainter {
    pub airways: Vec<Airway>,
}

impl MapPainter for AirwayPainter {
    fn render(&self, ctx: &mut RenderContext) {
        if !ctx.object_types_contain(ObjectTypes::AIRWAY)
            || !ctx.map_layer.airway
            || !ctx.details_allowed()
        {
            return;
        }

        ctx.painter.set_pen(Pen::new(AIRWAY_COLOR, 1.0));
        let text_size = ctx.sizes.text_size_navaid;
        set_layer_font(ctx, text_size);
        let labels = ctx.map_layer_effective.airway_ident
            && ctx.d_opt(DisplayOptions::AIRWAY_LABELS)
            && ctx.labels_allowed();

        for airway in &self.airways {
            let visible = GeoRect::bounding(&[airway.from, airway.to])
                .is_some_and(|rect| rect.overlaps(&ctx.viewport_rect));
            if !visible {
                continue;
            }

            draw_geo_path(ctx, &[airway.from, airway.to]);
            if ctx.is_overflow() {
                return;
            }

            if labels {
                let (w, h) = ctx.painter.text_extent(&airway.name);
                if let Some(placement) = find_text_pos(ctx.converter, &airway.from, &airway.to, w, h) {
                    ctx.painter
                        .draw_text(placement.pos, placement.rotation, &airway.name);
                }
            }
        }
    }
}

/// Holding pattern at a fix
#[derive(Debug, Clone, PartialEq)]
pub struct Hold {
    pub ident: String,
    pub fix: GeoPoint,
    pub inbound_course: f32,
    pub leg_nm: f32,
    pub left: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HoldPainter {
    pub holds: Vec<Hold>,
}

impl MapPainter for HoldPainter {
    fn render(&self, ctx: &mut RenderContext) {
        if !ctx.object_types_contain(ObjectTypes::HOLD)
            || !ctx.map_layer.hold
            || !ctx.details_allowed()
        {
            return;
        }

        ctx.painter.set_pen(Pen::new(HOLD_COLOR, 1.5));
        let text_size = ctx.sizes.text_size_navaid;
        set_layer_font(ctx, text_size);
        let labels = ctx.map_layer_effective.hold_info
            && ctx.d_opt(DisplayOptions::HOLD_LABELS)
            && ctx.labels_allowed();

        for hold in &self.holds {
            let Some(pt) = ctx.converter.project(&hold.fix) else {
                continue;
            };
            // Whole pattern may be visible even if the fix is not
            let margin = ctx.scale.pixel_for_nm(hold.leg_nm as f64) * 1.5;
            if !ctx.converter.screen_rect().expanded(margin).contains(pt) {
                continue;
            }
            if ctx.obj_count() {
                return;
            }

            paint_hold(ctx, pt.x as f32, pt.y as f32, hold.inbound_course, hold.leg_nm, hold.left);
            draw_fix_symbol(ctx, pt);

            if labels {
                let text = format!(
                    "{} {:03.0}° {}",
                    hold.ident,
                    hold.inbound_course,
                    if hold.left { "L" } else { "R" }
                );
                let (w, h) = ctx.painter.text_extent(&text);
                ctx.painter.draw_text(pt + DVec2::new(w / 2.0 + 4.0, -h), 0.0, &text);
            }
        }
    }
}

/// 45/180 procedure turn at a fix
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureTurn {
    pub ident: String,
    pub fix: GeoPoint,
    pub turn_heading: f32,
    pub distance_nm: f32,
    pub left: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProcedureTurnPainter {
    pub turns: Vec<ProcedureTurn>,
}

impl MapPainter for ProcedureTurnPainter {
    fn render(&self, ctx: &mut RenderContext) {
        if !ctx.object_types_contain(ObjectTypes::PROCEDURE)
            || !ctx.map_layer.procedure
            || !ctx.details_allowed()
        {
            return;
        }

        let pen = Pen::new(PROCEDURE_COLOR, 1.5);
        let extension = ctx.d_opt(DisplayOptions::PROCEDURE_EXTENSION);

        for turn in &self.turns {
            let Some(pt) = ctx.converter.project(&turn.fix) else {
                continue;
            };
            let reach = turn.distance_nm as f64 + PROCEDURE_TURN_LEG_NM * 2.0;
            let margin = ctx.scale.pixel_for_nm(reach);
            if !ctx.converter.screen_rect().expanded(margin).contains(pt) {
                continue;
            }
            if ctx.obj_count() {
                return;
            }

            ctx.painter.set_pen(pen);
            let line = paint_procedure_turn(
                ctx,
                pt.x as f32,
                pt.y as f32,
                turn.turn_heading,
                turn.distance_nm,
                turn.left,
            );

            if let Some(line) = line.filter(|_| extension) {
                ctx.painter.set_pen(pen.dashed(DashStyle::Dash));
                ctx.painter.draw_line(line.p1, line.p2);
            }
        }
        ctx.painter.set_pen(pen);
    }
}

/// Named point of a flight plan
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub ident: String,
    pub pos: GeoPoint,
}

/// Flight plan legs. Rhumb line plans keep a constant course per leg.
#[derive(Debug, Clone, Default)]
pub struct FlightplanPainter {
    pub waypoints: Vec<Waypoint>,
    pub rhumb: bool,
}

impl FlightplanPainter {
    fn draw_leg(&self, ctx: &mut RenderContext, from: &GeoPoint, to: &GeoPoint) {
        if self.rhumb {
            let dist = from.distance_meter_rhumb_to(to);
            let points = (0..=RHUMB_LEG_POINTS)
                .map(|i| from.interpolate_rhumb(to, dist, i as f64 / RHUMB_LEG_POINTS as f64))
                .collect();
            draw_line_string(ctx, &LineString::pre_tessellated(points));
        } else {
            draw_geo_path(ctx, &[*from, *to]);
        }
    }

    fn draw_leg_label(&self, ctx: &mut RenderContext, from: &GeoPoint, to: &GeoPoint) {
        if self.rhumb {
            let dist = from.distance_meter_rhumb_to(to);
            let text = format!("{:03.0}° {:.0}nm", from.bearing_rhumb_to(to), meter_to_nm(dist));
            let (w, h) = ctx.painter.text_extent(&text);
            if let Some(pos) = find_text_pos_rhumb(ctx.converter, from, to, dist, w, h) {
                ctx.painter.draw_text(pos, 0.0, &text);
            }
        } else {
            let dist = from.distance_meter_to(to);
            let text = format!("{:03.0}° {:.0}nm", from.bearing_to(to), meter_to_nm(dist));
            let (w, h) = ctx.painter.text_extent(&text);
            if let Some(placement) = find_text_pos_dist(ctx.converter, from, to, dist, w, h) {
                ctx.painter.draw_text(placement.pos, placement.rotation, &text);
            }
        }
    }
}

impl MapPainter for FlightplanPainter {
    fn render(&self, ctx: &mut RenderContext) {
        // Still drawn with the lowest scroll detail
        if !ctx.object_types_contain(ObjectTypes::FLIGHTPLAN) || !ctx.map_layer.flightplan {
            return;
        }

        let width = ctx.sz_f(ctx.sizes.thickness_flightplan, 2.0);
        ctx.painter.set_pen(Pen::new(FLIGHTPLAN_COLOR, width));
        let text_size = ctx.sizes.text_size_flightplan;
        set_layer_font(ctx, text_size);
        let labels = ctx.map_layer_effective.flightplan_text
            && ctx.d_opt(DisplayOptions::FLIGHTPLAN_LABELS)
            && ctx.labels_allowed();

        for leg in self.waypoints.windows(2) {
            self.draw_leg(ctx, &leg[0].pos, &leg[1].pos);
            if ctx.is_overflow() {
                return;
            }
            if labels {
                self.draw_leg_label(ctx, &leg[0].pos, &leg[1].pos);
            }
        }

        if !labels {
            return;
        }
        for waypoint in &self.waypoints {
            let Some(pt) = ctx.converter.project(&waypoint.pos) else {
                continue;
            };
            if ctx.converter.is_visible(pt) {
                let text = match waypoint.pos.alt {
                    Some(alt) => format!("{} {alt:.0}ft", waypoint.ident),
                    None => waypoint.ident.clone(),
                };
                let (w, _) = ctx.painter.text_extent(&text);
                ctx.painter.draw_text(pt + DVec2::new(w / 2.0 + 3.0, 0.0), 0.0, &text);
            }
        }
    }
}

/// All painters of a chart in drawing order
#[derive(Debug, Clone, Default)]
pub struct ChartScene {
    pub range_rings: RangeRingPainter,
    pub airways: AirwayPainter,
    pub procedures: ProcedureTurnPainter,
    pub holds: HoldPainter,
    pub flightplan: FlightplanPainter,
}

impl MapPainter for ChartScene {
    fn render(&self, ctx: &mut RenderContext) {
        ctx.set_render_hints();

        let passes: [&dyn MapPainter; 5] = [
            &self.range_rings,
            &self.airways,
            &self.procedures,
            &self.holds,
            &self.flightplan,
        ];
        for pass in passes {
            if ctx.is_overflow() {
                break;
            }
            pass.render(ctx);
        }
    }
}
