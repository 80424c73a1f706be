use glam::{DVec2, IVec2};

use crate::braille::BrailleCanvas;
use crate::paint::backend::{DashStyle, Pen};

/// Stroke state carried across the segments of one polyline so dash
/// patterns continue at the joints
pub struct Stroke {
    color: [u8; 3],
    /// Dots on, dots off
    pattern: Option<(u32, u32)>,
    thick: bool,
    step: u32,
}

impl Stroke {
    pub fn new(pen: &Pen) -> Self {
        let pattern = match pen.dash {
            DashStyle::Solid => None,
            DashStyle::Dash => Some((4, 3)),
            DashStyle::Dot => Some((1, 2)),
        };
        Self {
            color: pen.color,
            pattern,
            thick: pen.width > 1.5,
            step: 0,
        }
    }

    #[inline(always)]
    fn next_on(&mut self) -> bool {
        let Some((on, off)) = self.pattern else {
            return true;
        };
        let visible = self.step % (on + off) < on;
        self.step = self.step.wrapping_add(1);
        visible
    }
}

/// Clip a segment to a rectangle from the origin to `size` (Liang-Barsky)
pub fn clip_segment(p0: DVec2, p1: DVec2, size: DVec2) -> Option<(DVec2, DVec2)> {
    let d = p1 - p0;
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;

    for (p, q) in [
        (-d.x, p0.x),
        (d.x, size.x - p0.x),
        (-d.y, p0.y),
        (d.y, size.y - p0.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((p0 + d * t0, p0 + d * t1))
}

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, from: IVec2, to: IVec2, stroke: &mut Stroke) {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = from.x;
    let mut y = from.y;

    loop {
        if stroke.next_on() {
            canvas.set_pixel_signed(x, y, stroke.color);
            if stroke.thick {
                canvas.set_pixel_signed(x + 1, y, stroke.color);
                canvas.set_pixel_signed(x, y + 1, stroke.color);
            }
        }

        if x == to.x && y == to.y {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == to.x {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == to.y {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Clip and rasterize a segment given in canvas pixels
pub fn draw_segment(canvas: &mut BrailleCanvas, p0: DVec2, p1: DVec2, stroke: &mut Stroke) {
    if !p0.is_finite() || !p1.is_finite() {
        return;
    }
    let size = DVec2::new(canvas.pixel_width() as f64, canvas.pixel_height() as f64);
    if let Some((a, b)) = clip_segment(p0, p1, size) {
        draw_line(canvas, a.round().as_ivec2(), b.round().as_ivec2(), stroke);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid() -> Stroke {
        Stroke::new(&Pen::new([255, 255, 255], 1.0))
    }

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, IVec2::new(0, 0), IVec2::new(9, 0), &mut solid());
        // Top dot row of every cell
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, IVec2::new(0, 0), IVec2::new(0, 7), &mut solid());
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_dashed_line_has_gaps() {
        let mut canvas = BrailleCanvas::new(10, 1);
        let mut stroke = Stroke::new(&Pen::new([255, 255, 255], 1.0).dashed(DashStyle::Dash));
        draw_line(&mut canvas, IVec2::new(0, 0), IVec2::new(19, 0), &mut stroke);
        // Dots 4..7 are off
        assert!(canvas.cell(2, 0).is_none());
        assert!(canvas.cell(0, 0).is_some());
    }

    #[test]
    fn test_clip_segment() {
        let size = DVec2::new(100.0, 50.0);
        let (a, b) = clip_segment(DVec2::new(-50.0, 25.0), DVec2::new(150.0, 25.0), size).unwrap();
        assert_eq!(a, DVec2::new(0.0, 25.0));
        assert_eq!(b, DVec2::new(100.0, 25.0));
        assert!(clip_segment(DVec2::new(-10.0, -10.0), DVec2::new(-5.0, 60.0), size).is_none());
    }

    #[test]
    fn test_far_segment_is_cheap() {
        let mut canvas = BrailleCanvas::new(4, 4);
        draw_segment(&mut canvas, DVec2::new(-1e9, 2.0), DVec2::new(1e9, 2.0), &mut solid());
        assert_eq!(canvas.cells().count(), 4);
    }
}
