mod app;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use log::{info, warn};
use ratatui::DefaultTerminal;
use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use tui_navmap::config::ChartConfig;
use tui_navmap::data;
use tui_navmap::paint::context::ObjectTypes;

#[derive(Parser, Debug)]
#[command(name = "tui-navmap", version, about = "Aeronautical chart in the terminal")]
struct Args {
    /// Chart settings in TOML format
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Directory with GeoJSON background lines
    #[arg(long, default_value = "data")]
    data: PathBuf,

    /// GeoJSON feature collection of flight plan waypoints
    #[arg(long)]
    flightplan: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    #[arg(long, default_value = "tui-navmap.log")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // The terminal belongs to the UI, log to a file
    WriteLogger::init(
        args.log_level,
        Config::default(),
        File::create(&args.log_file)
            .with_context(|| format!("Cannot create log file {:?}", args.log_file))?,
    )?;

    let config = ChartConfig::load_or_default(args.config.as_deref())?;

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &args, config);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Handle mouse events for panning and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
        }
        _ => {}
    }
}

fn new_app(terminal: &DefaultTerminal, args: &Args, config: ChartConfig) -> Result<App> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize, config);
    app.scene = data::demo_scene();

    if let Some(path) = &args.flightplan {
        let waypoints = data::load_waypoints(path)?;
        info!("Flight plan with {} waypoints from {path:?}", waypoints.len());
        app.scene.flightplan.waypoints = waypoints;
    }

    if args.data.exists() {
        match data::load_coastlines(&args.data) {
            Ok(lines) => app.coastlines = lines,
            Err(e) => warn!("No background data: {e:#}"),
        }
    }

    // Fall back to simple outlines if no data loaded
    if app.coastlines.is_empty() {
        app.coastlines = data::generate_simple_region();
    }
    Ok(app)
}

fn run(terminal: &mut DefaultTerminal, args: &Args, config: ChartConfig) -> Result<()> {
    let mut app = new_app(terminal, args, config.clone())?;

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                    // Pan with hjkl or arrow keys
                    KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                    KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                    KeyCode::Up | KeyCode::Char('k') => app.pan(0, -12),
                    KeyCode::Down | KeyCode::Char('j') => app.pan(0, 12),

                    KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                    KeyCode::Char(']') => app.more_detail(),
                    KeyCode::Char('[') => app.less_detail(),

                    KeyCode::Char('1') => app.toggle_object_type(ObjectTypes::RANGE_RINGS),
                    KeyCode::Char('2') => app.toggle_object_type(ObjectTypes::AIRWAY),
                    KeyCode::Char('3') => app.toggle_object_type(ObjectTypes::HOLD),
                    KeyCode::Char('4') => app.toggle_object_type(ObjectTypes::PROCEDURE),
                    KeyCode::Char('5') => app.toggle_object_type(ObjectTypes::FLIGHTPLAN),
                    KeyCode::Char('L') => app.toggle_labels(),
                    KeyCode::Char('f') => app.toggle_draw_fast(),

                    // Reset view
                    KeyCode::Char('r') | KeyCode::Char('0') => {
                        app = new_app(terminal, args, config.clone())?;
                    }

                    _ => {}
                },
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width as usize, height as usize),
                _ => {}
            }
        }

        app.tick();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
