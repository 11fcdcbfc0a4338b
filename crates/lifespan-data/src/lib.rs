//! Input-file loaders for the lifespan dashboard.
//!
//! The dashboard reads five files, all named in [`DataConfig`]:
//!
//! | File | Loader | Produces |
//! |------|--------|----------|
//! | `who_life_exp.csv` | [`load_life_table`] | one [`CountryYearRecord`] per country and year |
//! | `regression_parameter.csv` | [`load_bandwidths`] | [`BandwidthTable`] |
//! | `olympic_hosts.csv` | [`load_games`] | [`GameEvent`] list |
//! | `world.json` + `HDI.csv` | [`load_country_shapes`] | [`CountryShape`] list |
//!
//! Each loader has a `*_from_reader` twin so tests can feed inline text.
//! [`load_dataset`] runs all of them and bundles the result.
//!
//! [`CountryYearRecord`]: lifespan_types::CountryYearRecord
//! [`BandwidthTable`]: lifespan_types::BandwidthTable
//! [`GameEvent`]: lifespan_types::GameEvent
//! [`CountryShape`]: lifespan_types::CountryShape

pub mod bandwidths;
mod cells;
pub mod error;
pub mod games;
pub mod life_table;
pub mod shapes;

use lifespan_core::config::DataConfig;
use lifespan_core::dataset::Dataset;
use tracing::info;

pub use bandwidths::{load_bandwidths, load_bandwidths_from_reader};
pub use error::DataError;
pub use games::{load_games, load_games_from_reader};
pub use life_table::{load_life_table, load_life_table_from_reader};
pub use shapes::{load_country_shapes, load_country_shapes_from_reader};

/// Load every input file named in `config`.
///
/// # Errors
///
/// Returns the first [`DataError`] any loader reports.
pub fn load_dataset(config: &DataConfig) -> Result<Dataset, DataError> {
    let dataset = Dataset {
        life_table: load_life_table(&config.life_table)?,
        bandwidths: load_bandwidths(&config.bandwidths)?,
        games: load_games(&config.olympic_hosts)?,
        shapes: load_country_shapes(&config.world, &config.hdi)?,
    };
    info!(
        rows = dataset.life_table.len(),
        countries = dataset.countries().len(),
        years = dataset.years().len(),
        "dataset ready"
    );
    Ok(dataset)
}
