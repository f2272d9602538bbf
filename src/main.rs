mod api;
mod app;
mod config;
mod constants;
mod controller;
mod input;
mod player;
mod theme;
mod ui;
mod upload;
mod video;
mod view;

use anyhow::{Context, Result};
use clap::Parser;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use app::App;
use config::{Config, Settings};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Base URL of the video backend (default: prefs.toml, then http://localhost:8000)
  #[arg(long, env = "VEDSTREAM_API_URL")]
  api_url: Option<String>,

  /// Search debounce delay in milliseconds (default: 500)
  #[arg(long)]
  debounce_ms: Option<u64>,
}

// --- Logging ---

/// Log to a daily rolling file; stdout belongs to the terminal UI.
fn init_logging() -> Result<WorkerGuard> {
  let dir = config::log_dir();
  std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create log directory {}", dir.display()))?;
  let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, "vedstream.log"));
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();
  Ok(guard)
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let _log_guard = init_logging()?;

  let config = Config::load();
  let settings = Settings::resolve(args.api_url, args.debounce_ms, &config);
  info!(api_url = %settings.api_url, debounce_ms = settings.debounce.as_millis() as u64, "starting");

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let theme_index = theme::theme_index(config.theme_name.as_deref());
  let result = run(&mut terminal, App::new(&settings, theme_index)).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, mut app: App) -> Result<()> {
  app.mount();

  loop {
    app.check_pending();

    terminal.draw(|frame| ui::ui(frame, &mut app)).context("Failed to draw frame")?;

    if event::poll(Duration::from_millis(50))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key).await?;
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  app.player.stop().await?;
  info!("bye");
  Ok(())
}
