use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use verdant::{
    config::{ConfigLoader, SessionConfig},
    journal::JsonFileJournal,
    weather::{spawn_weather_poller, FileWeatherSource},
    GameplaySession, PlantCatalogue,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless plant-care session runner")]
struct Cli {
    /// Plant catalogue JSON
    #[arg(long, default_value = "assets/plants.json")]
    catalogue: PathBuf,

    /// Index of the plant to grow
    #[arg(long, default_value_t = 0)]
    plant: usize,

    /// Session config YAML (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 600.0)]
    seconds: f64,

    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Override the config seed
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for per-plant action logs
    #[arg(long, default_value = "save")]
    journal_dir: PathBuf,

    /// Override the weather state file
    #[arg(long)]
    weather_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "verdant=info")]
    log_level: String,

    /// Sleep between frames instead of running as fast as possible
    #[arg(long)]
    realtime: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&cli.log_level))?)
        .init();

    let mut config = match &cli.config {
        Some(path) => ConfigLoader::new(".").load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(path) = &cli.weather_file {
        config.weather.state_file = path.clone();
    }

    let catalogue = PlantCatalogue::load(&cli.catalogue)
        .with_context(|| format!("Failed to load catalogue {}", cli.catalogue.display()))?;
    let source = Arc::new(FileWeatherSource::new(&config.weather.state_file));
    let refresh = config.weather.refresh_interval();
    let fetch_timeout = config.weather.fetch_timeout();

    let mut session = GameplaySession::start(&catalogue, cli.plant, config)?
        .with_journal(JsonFileJournal::new(&cli.journal_dir));
    let poller = spawn_weather_poller(source, session.mailbox(), refresh, fetch_timeout);

    let dt = if cli.dt > 0.0 { cli.dt } else { 1.0 / 60.0 };
    let frames = (cli.seconds.max(0.0) / dt).ceil() as u64;
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(dt));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    for _ in 0..frames {
        if cli.realtime {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut shutdown => {
                    warn!("interrupted, stopping session");
                    break;
                }
            }
        } else {
            // Let the poller publish between frames.
            tokio::task::yield_now().await;
        }
        let report = session.tick(dt);
        for event in report.events {
            info!(frame = report.frame, ?event, "simulation event");
        }
    }
    poller.abort();

    let hud = session.hud();
    println!("{}", serde_json::to_string_pretty(&hud)?);
    Ok(())
}
