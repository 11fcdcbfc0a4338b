//! Configuration loading and typed config structures for the dashboard.
//!
//! The canonical configuration lives in `lifespan-config.yaml` at the
//! project root. Every field has a default matching what the dashboard
//! shows on first load, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use lifespan_types::{AttributeKey, Gender};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DashboardConfig {
    /// Initial selections.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Input file locations.
    #[serde(default)]
    pub data: DataConfig,

    /// Derivation knobs.
    #[serde(default)]
    pub render: RenderConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DashboardConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `LIFESPAN_DATA_DIR`, when set, relocates every data file into that
    /// directory (file names are kept).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml rejects an empty document; treat it as all defaults.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.data.apply_env_overrides();
        Ok(config)
    }
}

/// Selections the dashboard starts with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DefaultsConfig {
    /// Date of birth.
    #[serde(default = "default_dob")]
    pub dob: NaiveDate,

    /// Gender.
    #[serde(default = "default_gender")]
    pub gender: Gender,

    /// Country of residence.
    #[serde(default = "default_country")]
    pub country: String,

    /// Life-table year used by the calendar and the week grid.
    #[serde(default = "default_heatmap_year")]
    pub heatmap_year: i32,

    /// Year shown by the map and the scatter plots.
    #[serde(default = "default_selected_year")]
    pub selected_year: i32,

    /// Attribute on the main scatter plot.
    #[serde(default = "default_attribute")]
    pub attribute: AttributeKey,

    /// Whether the regression overlay starts visible.
    #[serde(default = "default_true")]
    pub regression_enabled: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            dob: default_dob(),
            gender: default_gender(),
            country: default_country(),
            heatmap_year: default_heatmap_year(),
            selected_year: default_selected_year(),
            attribute: default_attribute(),
            regression_enabled: default_true(),
        }
    }
}

/// Locations of the input files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataConfig {
    /// WHO life-expectancy table.
    #[serde(default = "default_life_table")]
    pub life_table: PathBuf,

    /// LOESS bandwidths per year and attribute.
    #[serde(default = "default_bandwidths")]
    pub bandwidths: PathBuf,

    /// World topology with country names.
    #[serde(default = "default_world")]
    pub world: PathBuf,

    /// HDI per country and year.
    #[serde(default = "default_hdi")]
    pub hdi: PathBuf,

    /// Olympic Games host list.
    #[serde(default = "default_olympic_hosts")]
    pub olympic_hosts: PathBuf,
}

impl DataConfig {
    /// Relocate data files into `LIFESPAN_DATA_DIR` if it is set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("LIFESPAN_DATA_DIR") {
            self.relocate(Path::new(&dir));
        }
    }

    /// Keep each file name but move it into `dir`.
    pub fn relocate(&mut self, dir: &Path) {
        for path in [
            &mut self.life_table,
            &mut self.bandwidths,
            &mut self.world,
            &mut self.hdi,
            &mut self.olympic_hosts,
        ] {
            if let Some(name) = path.file_name() {
                *path = dir.join(name);
            }
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            life_table: default_life_table(),
            bandwidths: default_bandwidths(),
            world: default_world(),
            hdi: default_hdi(),
            olympic_hosts: default_olympic_hosts(),
        }
    }
}

/// Derivation knobs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenderConfig {
    /// Points sampled along a polynomial curve.
    #[serde(default = "default_curve_samples")]
    pub curve_samples: usize,

    /// Fixed "now" for reproducible output; wall clock when absent.
    #[serde(default)]
    pub now: Option<NaiveDateTime>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            curve_samples: default_curve_samples(),
            now: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_dob() -> NaiveDate {
    NaiveDate::from_ymd_opt(1998, 1, 1).unwrap_or_default()
}

const fn default_gender() -> Gender {
    Gender::Male
}

fn default_country() -> String {
    "Canada".to_owned()
}

const fn default_heatmap_year() -> i32 {
    2015
}

const fn default_selected_year() -> i32 {
    2000
}

const fn default_attribute() -> AttributeKey {
    AttributeKey::Bmi
}

const fn default_true() -> bool {
    true
}

fn default_life_table() -> PathBuf {
    PathBuf::from("data/who_life_exp.csv")
}

fn default_bandwidths() -> PathBuf {
    PathBuf::from("data/regression_parameter.csv")
}

fn default_world() -> PathBuf {
    PathBuf::from("data/world.json")
}

fn default_hdi() -> PathBuf {
    PathBuf::from("data/HDI.csv")
}

fn default_olympic_hosts() -> PathBuf {
    PathBuf::from("data/olympic_hosts.csv")
}

const fn default_curve_samples() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}
