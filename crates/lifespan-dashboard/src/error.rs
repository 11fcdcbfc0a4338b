//! Error types for the dashboard driver.
//!
//! [`AppError`] wraps every failure mode between reading the configuration
//! and writing the final snapshot.

use std::path::PathBuf;

/// Top-level error for the driver binary.
///
/// Each variant wraps a specific subsystem error, giving `main` a single
/// type to propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: lifespan_core::config::ConfigError,
    },

    /// An input file could not be loaded.
    #[error("data error: {source}")]
    Data {
        /// The underlying loader error.
        #[from]
        source: lifespan_data::DataError,
    },

    /// Building the dashboard or applying an event failed.
    #[error("dashboard error: {source}")]
    Dashboard {
        /// The underlying dashboard error.
        #[from]
        source: lifespan_core::dashboard::DashboardError,
    },

    /// The event script could not be read.
    #[error("cannot read script {}: {source}", path.display())]
    ScriptRead {
        /// The script path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The event script is not a list of events.
    #[error("invalid script {}: {source}", path.display())]
    ScriptParse {
        /// The script path.
        path: PathBuf,
        /// The underlying YAML error.
        source: serde_yml::Error,
    },

    /// An event in the script failed; `index` is zero-based.
    #[error("event {index} ({event}) failed: {source}")]
    Event {
        /// Position in the script.
        index: usize,
        /// Event name.
        event: lifespan_types::EventName,
        /// The underlying dashboard error.
        source: lifespan_core::dashboard::DashboardError,
    },

    /// Writing the snapshot failed.
    #[error("output error: {source}")]
    Output {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
