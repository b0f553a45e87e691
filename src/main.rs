use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use chatkit::infrastructure::config::{AppConfig, CliArgs, StorageManager};
use chatkit::infrastructure::image::{DiskImageCache, ImageLoader};
use chatkit::presentation::App;
use chatkit::presentation::widgets::ImageManager;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

async fn create_app(config: AppConfig) -> Result<App> {
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let disk_cache = Arc::new(DiskImageCache::default_location().await?);
    let loader = Arc::new(ImageLoader::new(
        config.images.to_loader_config(),
        &event_tx,
        disk_cache,
    )?);

    let images = ImageManager::new();

    Ok(App::new(&config, loader, event_rx, images))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);

    init_logging(&config)?;

    info!(version = chatkit::VERSION, "Starting chatkit demo");

    let mouse = config.mouse;
    let app = create_app(config).await?;

    let mut terminal = ratatui::init();
    if mouse {
        let _ = execute!(std::io::stdout(), EnableMouseCapture);
    }

    let result = app.run(&mut terminal).await;

    if mouse {
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
    }
    ratatui::restore();

    result
}
