use anyhow::{Context, Result};
use clap::Parser;
use grid_snake::game::{GameConfig, JsonFileStore, SpeedLevel};
use grid_snake::modes::HumanMode;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grid_snake")]
#[command(version, about = "Classic grid snake in the terminal")]
struct Cli {
    /// Grid width in cells
    #[arg(long)]
    width: Option<usize>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<usize>,

    /// Starting speed level (1 = slowest, 10 = fastest)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
    speed: Option<u8>,

    /// JSON game configuration; command line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// File remembering the best score across sessions
    #[arg(long, default_value = ".snake_high_score.json")]
    high_score_file: PathBuf,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_json_file(path)?,
            None => GameConfig::default(),
        };

        if let Some(width) = self.width {
            config.grid_width = width;
        }
        if let Some(height) = self.height {
            config.grid_height = height;
        }
        if let Some(speed) = self.speed {
            config.speed_level = SpeedLevel::new(speed);
        }

        config.validate()?;
        Ok(config)
    }
}

/// The TUI owns the terminal, so logs only go to a file
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create log file {:?}", path))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = cli.game_config()?;
    let store = JsonFileStore::new(&cli.high_score_file);
    tracing::debug!(?config, high_score_file = ?store.path(), "starting");

    let mut human_mode = HumanMode::new(config, store, cli.seed)?;
    human_mode.run().await?;

    Ok(())
}
