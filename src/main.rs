mod api;
mod app;
mod config;
mod form;
mod model;
mod notify;
mod page;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt};

use api::{CancelToken, EquipmentService, HttpEquipmentService};
use app::App;
use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "agribarter")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "List and barter farming equipment from the terminal")]
struct Args {
    /// Base URL of the equipment listing service
    #[arg(long, env = "AGRIBARTER_API_URL")]
    api_url: Option<String>,

    /// Print the available equipment as JSON and exit
    #[arg(short, long)]
    list: bool,

    /// Use this config file instead of the default one
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The TUI owns the terminal, so its logs go to a file
    init_logging(!args.list);

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(url) = args.api_url {
        config.api_base_url = url;
    }

    let service = HttpEquipmentService::new(config.api_base_url.clone(), config.request_timeout())
        .context("Failed to build HTTP client")?;

    if args.list {
        return print_listing(&service).await;
    }

    run_tui(&config, Arc::new(service)).await
}

fn init_logging(to_file: bool) {
    let filter = tracing_subscriber::EnvFilter::from_default_env();

    let writer = if to_file {
        match open_log_file() {
            Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
            Err(e) => {
                // Writing to the terminal would corrupt the TUI
                eprintln!("Logging disabled: {:#}", e);
                BoxMakeWriter::new(io::sink)
            }
        }
    } else {
        BoxMakeWriter::new(io::stderr)
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(!to_file).with_writer(writer))
        .with(filter)
        .init();
}

fn open_log_file() -> Result<std::fs::File> {
    let log_dir = dirs::data_local_dir()
        .context("Could not find data directory")?
        .join("agribarter");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create {}", log_dir.display()))?;
    let path = log_dir.join("agribarter.log");
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))
}

async fn print_listing(service: &HttpEquipmentService) -> Result<()> {
    let records = service
        .get_equipment(&CancelToken::new())
        .await
        .context("Failed to load equipment")?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

async fn run_tui(config: &AppConfig, service: Arc<dyn EquipmentService>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, service);
    app.activate();

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;
    app.teardown();

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

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.accepts_quit() => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => app.handle_key(key),
                    }
                }
            }
        }

        // Apply finished requests, expire toasts
        app.tick();
    }
}
