use tui_navmap::config::ChartConfig;
use tui_navmap::data::Coastline;
use tui_navmap::map::{CoordinateConverter, Viewport};
use tui_navmap::paint::context::{DisplayOptions, FrameOptions, ObjectTypes};
use tui_navmap::paint::layer::{DETAIL_MAX, DETAIL_MIN};
use tui_navmap::paint::linestring::draw_line_string;
use tui_navmap::paint::{ChartScene, LayerSettings, MapPainter, PaintBackend, Pen, RenderContext};

const COASTLINE_COLOR: [u8; 3] = [80, 160, 200];

/// Frames the map counts as moving after the last pan or zoom
const MOVING_FRAMES: u64 = 8;

/// Result of one rendered frame for the status bar
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub objects: usize,
    pub overflow: bool,
    pub draw_fast: bool,
}

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub config: ChartConfig,
    pub layers: LayerSettings,
    pub scene: ChartScene,
    pub coastlines: Vec<Coastline>,
    /// Level of detail shift, changed with [ and ]
    pub detail: i32,
    /// Object types and labels toggled at runtime
    pub object_types: ObjectTypes,
    pub labels: bool,
    pub should_quit: bool,
    pub last_mouse: Option<(u16, u16)>,
    pub mouse_pos: Option<(u16, u16)>,
    pub frame: u64,
    last_move_frame: Option<u64>,
}

impl App {
    pub fn new(width: usize, height: usize, config: ChartConfig) -> Self {
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(3); // 2 for border + 1 for status bar

        // Start over Zurich with roughly 200 km across
        let mut viewport = Viewport::new(8.55, 47.46, 1.0, inner_width * 2, inner_height * 4);
        viewport.zoom_to_distance(200.0);

        Self {
            viewport,
            detail: config.detail(),
            object_types: config.object_types(),
            labels: true,
            config,
            layers: LayerSettings::default(),
            scene: ChartScene::default(),
            coastlines: Vec::new(),
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            frame: 0,
            last_move_frame: None,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(3);
        self.viewport.width = inner_width * 2;
        self.viewport.height = inner_height * 4;
    }

    fn moved(&mut self) {
        self.last_move_frame = Some(self.frame);
    }

    pub fn is_moving(&self) -> bool {
        self.last_move_frame
            .is_some_and(|f| self.frame.saturating_sub(f) < MOVING_FRAMES)
    }

    pub fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
        self.moved();
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.moved();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.moved();
    }

    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_at(px, py, 1.5);
        self.moved();
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_at(px, py, 1.0 / 1.5);
        self.moved();
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn more_detail(&mut self) {
        self.detail = (self.detail + 1).min(DETAIL_MAX);
    }

    pub fn less_detail(&mut self) {
        self.detail = (self.detail - 1).max(DETAIL_MIN);
    }

    pub fn toggle_object_type(&mut self, types: ObjectTypes) {
        if self.object_types.contains(types) {
            self.object_types = self.object_types.without(types);
        } else {
            self.object_types |= types;
        }
    }

    pub fn toggle_labels(&mut self) {
        self.labels = !self.labels;
    }

    pub fn toggle_draw_fast(&mut self) {
        self.config.draw_fast_when_moving = !self.config.draw_fast_when_moving;
    }

    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = (last_x as i32 - x as i32) * 2;
            let dy = (last_y as i32 - y as i32) * 4;
            self.pan(dx, dy);
        }
        self.last_mouse = Some((x, y));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| cell_to_pixel(col, row))
    }

    /// Position under the mouse as "47.46°N 8.55°E"
    pub fn cursor_coords(&self) -> Option<String> {
        let (px, py) = self.mouse_pixel_pos()?;
        let pos = self
            .viewport
            .unproject(glam::DVec2::new(px as f64, py as f64))?;
        Some(format_lat_lon(pos.lat, pos.lon))
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.0} km", self.viewport.distance_km())
    }

    pub fn center_coords(&self) -> String {
        format_lat_lon(self.viewport.center_lat, self.viewport.center_lon)
    }

    /// Settings snapshot for the next frame
    pub fn frame_options(&self) -> FrameOptions {
        let mut options = self.config.snapshot(self.is_moving());
        options.object_types = self.object_types;
        if !self.labels {
            options.display_options.set(
                DisplayOptions::AIRWAY_LABELS
                    | DisplayOptions::RING_LABELS
                    | DisplayOptions::HOLD_LABELS
                    | DisplayOptions::FLIGHTPLAN_LABELS,
                false,
            );
        }
        options
    }

    /// Paint one frame of the chart with a fresh render context
    pub fn render_frame(&self, painter: &mut dyn PaintBackend, viewport: &Viewport) -> FrameStats {
        let distance = viewport.distance_km();
        let layer = self.layers.layer_for(distance, self.detail);
        let effective = self.layers.layer_for(distance, 0);
        let options = self.frame_options();
        let bounds = viewport.visible_bounds();

        let mut ctx = RenderContext::new(
            painter, viewport, viewport, layer, effective, bounds, &options,
        );

        ctx.painter.set_pen(Pen::new(COASTLINE_COLOR, 1.0));
        for coastline in self.coastlines.iter().filter(|c| c.bounds.overlaps(&bounds)) {
            draw_line_string(&mut ctx, &coastline.line);
            if ctx.is_overflow() {
                break;
            }
        }

        self.scene.render(&mut ctx);

        FrameStats {
            objects: ctx.object_count(),
            overflow: ctx.is_overflow(),
            draw_fast: ctx.draw_fast,
        }
    }
}

/// Terminal cell inside the map border to braille pixel
fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
    (
        (col.saturating_sub(1) as i32) * 2,
        (row.saturating_sub(1) as i32) * 4,
    )
}

fn format_lat_lon(lat: f64, lon: f64) -> String {
    format!(
        "{:.2}°{} {:.2}°{}",
        lat.abs(),
        if lat >= 0.0 { "N" } else { "S" },
        lon.abs(),
        if lon >= 0.0 { "E" } else { "W" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_navmap::data::{demo_scene, generate_simple_region};
    use tui_navmap::paint::DisplayList;

    fn app() -> App {
        let mut app = App::new(102, 53, ChartConfig::default());
        app.scene = demo_scene();
        app.coastlines = generate_simple_region();
        app
    }

    #[test]
    fn test_initial_view() {
        let app = app();
        assert_eq!(app.viewport.width, 200);
        assert_eq!(app.viewport.height, 200);
        assert!((app.viewport.distance_km() - 200.0).abs() < 1.0);
        assert_eq!(app.center_coords(), "47.46°N 8.55°E");
    }

    #[test]
    fn test_moving_enables_draw_fast_for_a_few_frames() {
        let mut app = app();
        assert!(!app.frame_options().draw_fast);

        app.pan(4, 0);
        assert!(app.frame_options().draw_fast);
        for _ in 0..MOVING_FRAMES {
            app.tick();
        }
        assert!(!app.frame_options().draw_fast);

        app.toggle_draw_fast();
        app.zoom_in();
        assert!(!app.frame_options().draw_fast);
    }

    #[test]
    fn test_render_frame_counts_objects() {
        let app = app();
        let mut list = DisplayList::new();
        let stats = app.render_frame(&mut list, &app.viewport);
        assert!(stats.objects > 0);
        assert!(!stats.overflow);
        assert!(list.texts().count() > 0);

        // Every frame starts with a new counter
        let mut list = DisplayList::new();
        assert_eq!(app.render_frame(&mut list, &app.viewport), stats);
    }

    #[test]
    fn test_toggles() {
        let mut app = app();
        app.toggle_object_type(ObjectTypes::HOLD);
        assert!(!app.frame_options().object_types.contains(ObjectTypes::HOLD));
        app.toggle_object_type(ObjectTypes::HOLD);
        assert!(app.frame_options().object_types.contains(ObjectTypes::HOLD));

        app.toggle_labels();
        let mut list = DisplayList::new();
        app.render_frame(&mut list, &app.viewport);
        assert_eq!(list.texts().count(), 0);

        for _ in 0..5 {
            app.more_detail();
        }
        assert_eq!(app.detail, DETAIL_MAX);
    }
}
