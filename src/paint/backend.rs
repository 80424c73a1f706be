//! Drawing backend boundary.
//!
//! Renderers never rasterize anything themselves. They set pen state once and
//! emit ordered primitive calls to a [`PaintBackend`].

use crate::map::convert::ScreenPoint;
use crate::paint::procedure::arc_points;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashStyle {
    #[default]
    Solid,
    Dash,
    Dot,
}

/// Stroke state applied to all following primitives
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub color: [u8; 3],
    pub width: f32,
    pub dash: DashStyle,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            color: [255, 255, 255],
            width: 1.0,
            dash: DashStyle::Solid,
        }
    }
}

impl Pen {
    pub fn new(color: [u8; 3], width: f32) -> Self {
        Self {
            color,
            width: width.max(0.0),
            dash: DashStyle::Solid,
        }
    }

    pub fn dashed(mut self, dash: DashStyle) -> Self {
        self.dash = dash;
        self
    }
}

/// Painter state sink. All methods are infallible: a backend that cannot
/// draw something silently drops it.
pub trait PaintBackend {
    fn set_pen(&mut self, pen: Pen);

    fn set_antialiasing(&mut self, enabled: bool);

    fn set_font_size(&mut self, pixel: f32);

    fn font_size(&self) -> f32;

    fn draw_polyline(&mut self, points: &[ScreenPoint]);

    /// Closed outline, the first point is repeated at the end
    fn draw_polygon(&mut self, points: &[ScreenPoint]) {
        if let Some(first) = points.first() {
            let mut closed = points.to_vec();
            closed.push(*first);
            self.draw_polyline(&closed);
        }
    }

    fn draw_line(&mut self, p1: ScreenPoint, p2: ScreenPoint) {
        self.draw_polyline(&[p1, p2]);
    }

    /// Circular arc starting at compass angle `start` seen from `center`,
    /// sweeping `sweep` degrees (positive is clockwise on screen).
    fn draw_arc(&mut self, center: ScreenPoint, radius: f64, start: f64, sweep: f64) {
        let points = arc_points(center, radius, start, sweep);
        self.draw_polyline(&points);
    }

    /// Approximate width and height of `text` in pixels at the current font size
    fn text_extent(&self, text: &str) -> (f64, f64) {
        let size = self.font_size() as f64;
        (text.chars().count() as f64 * size * 0.6, size)
    }

    /// Text centered at `pos`, rotated clockwise by `rotation` degrees
    fn draw_text(&mut self, pos: ScreenPoint, rotation: f64, text: &str);
}

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Polyline {
        points: Vec<ScreenPoint>,
        pen: Pen,
    },
    Arc {
        center: ScreenPoint,
        radius: f64,
        start: f64,
        sweep: f64,
        pen: Pen,
    },
    Text {
        pos: ScreenPoint,
        rotation: f64,
        text: String,
        size: f32,
    },
}

/// Backend that records every call, used for tests and benchmarks
#[derive(Debug, Clone)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
    pen: Pen,
    font_size: f32,
    antialiasing: bool,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            pen: Pen::default(),
            font_size: 12.0,
            antialiasing: true,
        }
    }
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn antialiasing(&self) -> bool {
        self.antialiasing
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn polylines(&self) -> impl Iterator<Item = &[ScreenPoint]> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Polyline { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = (&ScreenPoint, f64, &str)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text {
                pos,
                rotation,
                text,
                ..
            } => Some((pos, *rotation, text.as_str())),
            _ => None,
        })
    }
}

impl PaintBackend for DisplayList {
    fn set_pen(&mut self, pen: Pen) {
        self.pen = pen;
    }

    fn set_antialiasing(&mut self, enabled: bool) {
        self.antialiasing = enabled;
    }

    fn set_font_size(&mut self, pixel: f32) {
        self.font_size = pixel;
    }

    fn font_size(&self) -> f32 {
        self.font_size
    }

    fn draw_polyline(&mut self, points: &[ScreenPoint]) {
        if points.len() < 2 {
            return;
        }
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            pen: self.pen,
        });
    }

    fn draw_arc(&mut self, center: ScreenPoint, radius: f64, start: f64, sweep: f64) {
        self.commands.push(DrawCommand::Arc {
            center,
            radius,
            start,
            sweep,
            pen: self.pen,
        });
    }

    fn draw_text(&mut self, pos: ScreenPoint, rotation: f64, text: &str) {
        self.commands.push(DrawCommand::Text {
            pos,
            rotation,
            text: text.to_string(),
            size: self.font_size,
        });
    }
}
