use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use benchwatch::app::{self, App, View};
use benchwatch::{events, ui, Session, Settings};

#[derive(Parser, Debug)]
#[command(name = "benchwatch")]
#[command(about = "Terminal dashboard for bench hardware telemetry")]
struct Args {
    /// CSV file of readings (Timestamp,Parameter,Value) to load at startup
    #[arg(short, long)]
    upload: Option<PathBuf>,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Refresh interval (e.g., "1s", "500ms")
    #[arg(short, long)]
    refresh: Option<String>,

    /// History window (e.g., "30m", "1h")
    #[arg(short, long)]
    window: Option<String>,

    /// Seed for the simulated readings
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write logs to this file (the terminal UI owns stdout)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Export current state to JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(ref refresh) = args.refresh {
        settings.refresh = refresh.clone();
    }
    if let Some(ref window) = args.window {
        settings.window = window.clone();
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    let refresh_interval = settings.refresh_interval()?;

    let mut session = Session::new(&settings)?;
    if let Some(ref path) = args.upload {
        session
            .upload_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
    }

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return export_to_file(session, export_path);
    }

    run_tui(App::new(session, args.upload), refresh_interval)
}

/// Log to `--log-file` when given; export mode falls back to stderr.
fn init_logging(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(ref path) = args.log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if args.export.is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

/// Run the TUI for the given session
fn run_tui(mut app: App, refresh_interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    app.tick();

    let result = run_app(&mut terminal, &mut app, refresh_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 16;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered =
                    ratatui::layout::Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(10),   // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Parameters => ui::parameters::render(frame, app, chunks[2]),
                View::Link => ui::link::render(frame, app, chunks[2]),
                View::Controls => ui::controls::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Content starts after header (1) + tabs (1) + table border (1)
                    events::handle_mouse_event(app, mouse, 3);
                }
                _ => {}
            }
        }

        // Auto-refresh stands in for a dashboard page reload
        if last_refresh.elapsed() >= refresh_interval {
            app.tick();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Export the session state to a JSON file
fn export_to_file(mut session: Session, export_path: &Path) -> Result<()> {
    use std::io::Write;

    let now = app::now();
    session.tick(now);

    let report = session.report(now);
    let json = serde_json::to_string_pretty(&report)?;
    let mut file = File::create(export_path)?;
    file.write_all(json.as_bytes())?;

    info!(path = %export_path.display(), readings = report.readings, "Exported session");
    println!("Exported session state to: {}", export_path.display());
    Ok(())
}
