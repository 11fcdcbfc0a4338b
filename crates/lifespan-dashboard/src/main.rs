//! Driver binary for the lifespan dashboard.
//!
//! Loads the configuration and the input files, builds a [`Dashboard`],
//! replays an optional event script against it, and prints the resulting
//! view models as JSON on stdout. Logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Parse command-line arguments
//! 2. Load configuration from `lifespan-config.yaml`
//! 3. Initialize structured logging (tracing)
//! 4. Load the life table, bandwidths, Olympic hosts and world map
//! 5. Build the dashboard and run the first-load refresh
//! 6. Publish every scripted event in order
//! 7. Print the snapshot
//!
//! A script is a YAML (or JSON) list of events in the wire shape the
//! browser controls publish:
//!
//! ```yaml
//! - event: changeGender
//!   payload: female
//! - event: changeViewStage
//!   payload: next
//! ```

mod error;

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use lifespan_core::config::DashboardConfig;
use lifespan_core::dashboard::Dashboard;
use lifespan_types::DashboardEvent;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Replay dashboard interactions and print the derived view models.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "lifespan-config.yaml")]
    config: PathBuf,

    /// Read every data file from this directory instead of the configured paths.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Event script to replay after the first load.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Pretty-print the snapshot.
    #[arg(long)]
    pretty: bool,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, data loading, any scripted event, or
/// writing the output fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;
    init_logging(&config.logging.level, args.log_format);

    info!(config = %args.config.display(), "lifespan-dashboard starting");
    run(&args, config)?;
    Ok(())
}

fn run(args: &Args, mut config: DashboardConfig) -> Result<(), AppError> {
    if let Some(dir) = &args.data_dir {
        config.data.relocate(dir);
    }
    let data = lifespan_data::load_dataset(&config.data)?;

    let mut dashboard = Dashboard::new(data, &config)?;
    info!(
        country = dashboard.state().country_of_residence(),
        gender = %dashboard.state().gender(),
        life_expectancy = dashboard.state().life_expectancy_years(),
        views = ?dashboard.view_names(),
        "dashboard ready"
    );

    if let Some(path) = &args.script {
        let events = load_script(path)?;
        info!(script = %path.display(), events = events.len(), "replaying script");
        replay(&mut dashboard, &events)?;
    }

    let snapshot = dashboard.snapshot();
    let mut stdout = std::io::stdout().lock();
    if args.pretty {
        serde_json::to_writer_pretty(&mut stdout, &snapshot)?;
    } else {
        serde_json::to_writer(&mut stdout, &snapshot)?;
    }
    writeln!(stdout).map_err(serde_json::Error::io)?;

    info!(version = dashboard.state().version(), "done");
    Ok(())
}

/// Load the configuration, falling back to defaults when the file is absent.
fn load_config(path: &Path) -> Result<DashboardConfig, AppError> {
    if path.exists() {
        Ok(DashboardConfig::from_file(path)?)
    } else {
        let mut config = DashboardConfig::default();
        config.data.apply_env_overrides();
        Ok(config)
    }
}

fn init_logging(default_level: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn load_script(path: &Path) -> Result<Vec<DashboardEvent>, AppError> {
    let contents = std::fs::read_to_string(path).map_err(|source| AppError::ScriptRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yml::from_str(&contents).map_err(|source| AppError::ScriptParse {
        path: path.to_path_buf(),
        source,
    })
}

fn replay(dashboard: &mut Dashboard, events: &[DashboardEvent]) -> Result<(), AppError> {
    for (index, event) in events.iter().enumerate() {
        let handlers = dashboard
            .publish(event)
            .map_err(|source| AppError::Event {
                index,
                event: event.name(),
                source,
            })?;
        debug!(index, event = %event.name(), handlers, "event applied");
    }
    Ok(())
}
