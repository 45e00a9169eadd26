//! Interactive pollution map viewer.
//!
//! Hosts the temporal raster synchronizer against a pollution backend:
//! - authenticates (when credentials are configured) before anything runs
//! - activates a dataset and attaches overlays to a console render target
//! - drives scrubbing, playback, dataset switches, and uploads from a
//!   line-oriented command loop

mod commands;
mod config;
mod render;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use pollution_client::{ClientConfig, PollutionClient, PollutionService};
use viewer_common::Param;
use viewer_sync::{Synchronizer, SynchronizerConfig, ViewerEvent};

use commands::Command;
use config::ViewerConfig;
use render::ConsoleRenderTarget;

#[derive(Parser, Debug)]
#[command(name = "viewer")]
#[command(about = "Interactive viewer for multi-dimensional pollution datasets")]
struct Args {
    /// Configuration file (viewer.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Dataset to activate on startup (overrides config)
    #[arg(short, long)]
    dataset: Option<String>,

    /// Playback cadence in milliseconds (overrides config)
    #[arg(long)]
    cadence_ms: Option<u64>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = ViewerConfig::load(args.config.as_deref())?;
    config.apply_env();
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(dataset) = args.dataset {
        config.dataset = Some(dataset);
    }
    if let Some(cadence_ms) = args.cadence_ms {
        config.cadence_ms = cadence_ms;
    }
    config.validate()?;

    info!(base_url = %config.base_url, "Starting pollution viewer");

    let client = Arc::new(PollutionClient::new(ClientConfig::new(&config.base_url))?);

    // Auth gate: with credentials configured, the synchronizer only runs
    // for an authenticated session.
    if let Some(auth) = &config.auth {
        let session = client
            .login(&auth.login, &auth.password)
            .await
            .context("Authentication failed")?;
        info!(user = %session.name, role = %session.role, "Session established");
    } else {
        warn!("No credentials configured, running unauthenticated");
    }

    let available = client.datasets().await.context("Failed to list datasets")?;
    if available.is_empty() {
        anyhow::bail!("Backend reports no datasets");
    }
    let dataset = config
        .dataset
        .clone()
        .unwrap_or_else(|| available[0].clone());
    info!(dataset = %dataset, available = available.len(), "Activating dataset");

    let sync_config = SynchronizerConfig {
        cadence: Duration::from_millis(config.cadence_ms),
        ..SynchronizerConfig::default()
    };
    let service: Arc<dyn PollutionService> = client.clone();
    let (sync, mut events) = Synchronizer::start(
        service,
        Box::new(ConsoleRenderTarget::default()),
        sync_config,
        &dataset,
    )
    .await
    .context("Failed to start synchronizer")?;

    // Surface synchronizer events alongside the prompt.
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ViewerEvent::LayerReady {
                    dataset,
                    tuple,
                    time_label,
                    ..
                } => {
                    info!(
                        dataset = %dataset,
                        time_index = tuple.time_index,
                        level_index = tuple.level_index,
                        species = %tuple.species,
                        data_type = %tuple.data_type,
                        time = time_label.as_deref().unwrap_or("?"),
                        "Layer ready"
                    );
                }
                ViewerEvent::LayerError { error } => {
                    warn!(error = %error, "Layer failed, previous overlay kept");
                }
                ViewerEvent::DatasetSwitched { dataset, .. } => {
                    info!(dataset = %dataset, "Dataset active");
                }
                ViewerEvent::SwitchFailed { dataset, error } => {
                    warn!(dataset = %dataset, error = %error, "Dataset switch failed");
                }
                ViewerEvent::PlaybackStarted => info!("Playback running"),
                ViewerEvent::PlaybackStopped => info!("Playback stopped"),
            }
        }
    });

    println!("{}", commands::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if !dispatch(&line, &sync, &client).await {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!(error = %e, "Failed to read input");
                        break;
                    }
                }
            }
        }
    }

    sync.shutdown().await;
    Ok(())
}

/// Execute one console command. Returns `false` to exit the loop.
async fn dispatch(line: &str, sync: &Synchronizer, client: &Arc<PollutionClient>) -> bool {
    let command = match commands::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return true,
        Err(message) => {
            println!("{} (try 'help')", message);
            return true;
        }
    };

    match command {
        Command::Play => sync.play().await,
        Command::Pause => sync.pause().await,
        Command::Time(index) => sync.set_param(Param::TimeIndex(index)).await,
        Command::Level(index) => sync.set_param(Param::LevelIndex(index)).await,
        Command::Species(species) => sync.set_param(Param::Species(species)).await,
        Command::DataType(data_type) => sync.set_param(Param::DataType(data_type)).await,
        Command::Dataset(dataset) => sync.switch_dataset(&dataset).await,
        Command::Datasets => match client.datasets().await {
            Ok(ids) => println!("datasets: {}", ids.join(", ")),
            Err(e) => warn!(error = %e, "Failed to list datasets"),
        },
        Command::Upload(path) => match client.upload_dataset(&path).await {
            Ok(dataset) => {
                println!("uploaded as '{}'", dataset);
                sync.dataset_uploaded(&dataset).await;
            }
            Err(e) => warn!(error = %e, "Upload failed"),
        },
        Command::Points => {
            let snapshot = sync.snapshot().await;
            match client
                .point_data(
                    snapshot.tuple.time_index,
                    snapshot.tuple.level_index,
                    &snapshot.tuple.species,
                )
                .await
            {
                Ok(collection) => {
                    let count = collection
                        .get("features")
                        .and_then(|f| f.as_array())
                        .map(|f| f.len())
                        .unwrap_or(0);
                    println!("{} points above threshold", count);
                }
                Err(e) => warn!(error = %e, "Point data fetch failed"),
            }
        }
        Command::Status => {
            let s = sync.snapshot().await;
            println!(
                "dataset={} time={}/{} level={}/{} species={} type={} playing={}",
                s.tuple.dataset,
                s.tuple.time_index,
                s.bounds.time.max,
                s.tuple.level_index,
                s.bounds.level.max,
                s.tuple.species,
                s.tuple.data_type,
                s.playing
            );
        }
        Command::Help => println!("{}", commands::HELP),
        Command::Quit => return false,
    }

    true
}
