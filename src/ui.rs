use crate::app::{App, FrameStats};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};
use tui_navmap::braille::BrailleBackend;
use tui_navmap::paint::context::ObjectTypes;

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let stats = render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, stats, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) -> FrameStats {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Chart ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Braille gives 2x4 resolution per character
    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let mut backend = BrailleBackend::new(inner.width as usize, inner.height as usize);
    let stats = app.render_frame(&mut backend, &viewport);

    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        (cx < inner.width && cy < inner.height).then_some((cx, cy))
    });

    frame.render_widget(MapWidget { backend, cursor_pos }, inner);
    stats
}

fn rgb(color: [u8; 3]) -> Color {
    Color::Rgb(color[0], color[1], color[2])
}

/// Braille chart with text labels overlaid
struct MapWidget {
    backend: BrailleBackend,
    cursor_pos: Option<(u16, u16)>,
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (col, row, ch, color) in self.backend.canvas().cells() {
            if col >= area.width as usize || row >= area.height as usize {
                continue;
            }
            let x = area.x + col as u16;
            let y = area.y + row as u16;
            buf[(x, y)].set_char(ch).set_fg(rgb(color));
        }

        for label in self.backend.labels() {
            if label.row >= area.height || label.col >= area.width {
                continue;
            }
            let y = area.y + label.row;
            let style = Style::default().fg(rgb(label.color));
            for (i, ch) in label.text.chars().enumerate() {
                let x = area.x + label.col + i as u16;
                if x < area.x + area.width {
                    buf[(x, y)].set_char(ch).set_style(style);
                }
            }
        }

        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

fn toggle_span(label: &'static str, on: bool) -> Span<'static> {
    Span::styled(
        label,
        Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
    )
}

fn render_status_bar(frame: &mut Frame, app: &App, stats: FrameStats, area: Rect) {
    let types = app.object_types;
    let dim = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        Span::styled(" ", dim),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(format!(" detail {:+} ", app.detail), Style::default().fg(Color::Magenta)),
        toggle_span("1rings ", types.contains(ObjectTypes::RANGE_RINGS)),
        toggle_span("2awy ", types.contains(ObjectTypes::AIRWAY)),
        toggle_span("3hold ", types.contains(ObjectTypes::HOLD)),
        toggle_span("4proc ", types.contains(ObjectTypes::PROCEDURE)),
        toggle_span("5plan ", types.contains(ObjectTypes::FLIGHTPLAN)),
        toggle_span("Labels ", app.labels),
        toggle_span("Fast ", app.config.draw_fast_when_moving),
        Span::styled("| ", dim),
        Span::styled(
            format!("{} obj", stats.objects),
            Style::default().fg(if stats.overflow { Color::Red } else { Color::Green }),
        ),
    ];
    if stats.overflow {
        spans.push(Span::styled(" OVERFLOW", Style::default().fg(Color::Red)));
    }
    spans.push(Span::styled(" | ", dim));
    spans.push(Span::styled(
        app.cursor_coords().unwrap_or_else(|| app.center_coords()),
        Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(" | hjkl:pan +/-:zoom []:detail q:quit", dim));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
