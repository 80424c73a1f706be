mod canvas;

pub use canvas::BrailleCanvas;

use glam::DVec2;

use crate::map::convert::ScreenPoint;
use crate::map::geometry::{draw_segment, Stroke};
use crate::paint::backend::{PaintBackend, Pen};

/// Text placed over the canvas at a character cell
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub col: u16,
    pub row: u16,
    pub text: String,
    pub color: [u8; 3],
}

/// Paint backend rasterizing into a braille canvas. Pixels are braille dots,
/// text is collected as labels for the terminal overlay.
pub struct BrailleBackend {
    canvas: BrailleCanvas,
    labels: Vec<Label>,
    pen: Pen,
    font_size: f32,
    antialiasing: bool,
}

impl BrailleBackend {
    /// Canvas of `width` x `height` terminal cells
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            canvas: BrailleCanvas::new(width, height),
            labels: Vec::new(),
            pen: Pen::default(),
            font_size: 4.0,
            antialiasing: true,
        }
    }

    pub fn canvas(&self) -> &BrailleCanvas {
        &self.canvas
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn antialiasing(&self) -> bool {
        self.antialiasing
    }
}

impl PaintBackend for BrailleBackend {
    fn set_pen(&mut self, pen: Pen) {
        self.pen = pen;
    }

    /// Dots cannot be blended, the flag is only recorded
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
        if self.pen.width <= 0.0 {
            return;
        }
        let mut stroke = Stroke::new(&self.pen);
        for pair in points.windows(2) {
            draw_segment(&mut self.canvas, pair[0], pair[1], &mut stroke);
        }
    }

    /// One cell is 2x4 dots
    fn text_extent(&self, text: &str) -> (f64, f64) {
        (text.chars().count() as f64 * 2.0, 4.0)
    }

    /// Rotation is ignored, terminal text is always horizontal
    fn draw_text(&mut self, pos: ScreenPoint, _rotation: f64, text: &str) {
        let (width, height) = self.text_extent(text);
        let top_left = pos - DVec2::new(width, height) / 2.0;
        if !top_left.is_finite() || top_left.x < 0.0 || top_left.y < 0.0 {
            return;
        }

        let col = (top_left.x / 2.0).round() as usize;
        let row = (top_left.y / 4.0).round() as usize;
        if col >= self.canvas.width() || row >= self.canvas.height() {
            return;
        }

        let max_len = self.canvas.width() - col;
        self.labels.push(Label {
            col: col as u16,
            row: row as u16,
            text: text.chars().take(max_len).collect(),
            color: self.pen.color,
        });
    }
}
