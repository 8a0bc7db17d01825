mod app;
mod copy;
mod handler;
mod tui;
mod ui;

use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use surprise_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;
use tui::{EventHandler, Tui, TICK_RATE};

const DEFAULT_FILTER: &str = "surprise_core=debug,surprise_tui=debug,warn";

#[tokio::main]
async fn main() -> Result<()> {
    // The terminal belongs to the UI, so logs go to a file.
    let (file_layer, log_error) = match open_log_file() {
        Ok(file) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            ),
            None,
        ),
        Err(e) => (None, Some(e)),
    };
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.into()),
        ))
        .with(file_layer)
        .init();

    if let Some(e) = log_error {
        eprintln!("Logging disabled: {:#}", e);
    }
    tracing::info!("Starting surprise");

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load config, using defaults");
        Config::new()
    });

    let mut app = App::new(&config);
    tracing::info!(recipient = %config.name, gateway = %app.gateway_label, "session ready");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let size = terminal.size()?;
    app.resize(size.width, size.height);

    let mut events = EventHandler::new(TICK_RATE);
    let result = run(&mut app, &mut terminal, &mut events).await;

    tui::restore()?;
    tracing::info!("Shutting down");
    result
}

async fn run(app: &mut App, terminal: &mut Tui, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}

fn log_path() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .context("Could not find cache directory")?
        .join("surprise");
    fs::create_dir_all(&dir)?;
    Ok(dir.join("surprise.log"))
}

fn open_log_file() -> Result<File> {
    let path = log_path()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))
}
