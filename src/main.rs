use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;
use world_map::app::App;
use world_map::config::Config;
use world_map::data::LoadState;
use world_map::ui;

fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config)?;
    info!(source = ?config.source(), "starting");

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, &config);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Log to a file: the terminal belongs to the map
fn init_logging(config: &Config) -> Result<()> {
    let file = File::create(&config.log_file)
        .with_context(|| format!("creating log file {}", config.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Handle mouse events for hover, click, panning and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Every event carries a position: keep hover and tooltip current
    app.pointer_moved(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.wheel(mouse.column, mouse.row, true),
        MouseEventKind::ScrollDown => app.wheel(mouse.column, mouse.row, false),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-30.0, 0.0),
        MouseEventKind::ScrollRight => app.pan(30.0, 0.0),
        // Press, drag to pan, release to click
        MouseEventKind::Down(MouseButton::Left) => app.press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => {
            app.release(mouse.column, mouse.row, Instant::now());
        }
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, config: &Config) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(config.source(), size.width, size.height);

    // Main loop
    loop {
        app.update(Instant::now());

        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        let now = Instant::now();
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Pan with hjkl or arrow keys
                            KeyCode::Left | KeyCode::Char('h') => app.pan(-40.0, 0.0),
                            KeyCode::Right | KeyCode::Char('l') => app.pan(40.0, 0.0),
                            KeyCode::Up | KeyCode::Char('k') => app.pan(0.0, -40.0),
                            KeyCode::Down | KeyCode::Char('j') => app.pan(0.0, 40.0),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(now),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(now),

                            // Reset view
                            KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(now),

                            KeyCode::Char('b') | KeyCode::Char('B') => {
                                app.map_renderer.toggle_borders();
                            }

                            // Retry after a failed load
                            KeyCode::Enter => {
                                if matches!(app.load_state(), LoadState::Failed) {
                                    app.reload();
                                }
                            }

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width, height);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
