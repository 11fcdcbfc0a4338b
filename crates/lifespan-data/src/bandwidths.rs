//! Loader for the LOESS bandwidth table (`regression_parameter.csv`).
//!
//! The file has one column per attribute and no year column: data row `i`
//! holds the bandwidths for year `2000 + i`.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use lifespan_types::{AttributeKey, BandwidthTable};
use tracing::{debug, info};

use crate::cells::{open, optional_number};
use crate::error::DataError;

const FILE: &str = "regression_parameter.csv";

/// Load `regression_parameter.csv` from disk.
///
/// # Errors
///
/// Fails if the file cannot be read or a cell is not a number.
pub fn load_bandwidths(path: &Path) -> Result<BandwidthTable, DataError> {
    let table = load_bandwidths_from_reader(open(path)?)?;
    info!(path = %path.display(), years = table.rows.len(), "bandwidths loaded");
    Ok(table)
}

/// Load the bandwidth table from any reader.
///
/// Columns that do not name an attribute are skipped. Empty cells leave the
/// attribute out of that year's row.
///
/// # Errors
///
/// See [`load_bandwidths`].
pub fn load_bandwidths_from_reader<R: Read>(reader: R) -> Result<BandwidthTable, DataError> {
    let mut csv = csv::Reader::from_reader(reader);
    let columns: Vec<(String, Option<AttributeKey>)> = csv
        .headers()?
        .iter()
        .map(|h| (h.trim().to_owned(), h.parse().ok()))
        .collect();
    for (name, _) in columns.iter().filter(|(_, key)| key.is_none()) {
        debug!(column = %name, "ignoring bandwidth column");
    }

    let mut rows = Vec::new();
    for (index, result) in csv.records().enumerate() {
        let row = index.saturating_add(1);
        let record = result?;
        let mut bandwidths = BTreeMap::new();
        for ((name, key), value) in columns.iter().zip(record.iter()) {
            let Some(key) = key else { continue };
            if let Some(v) = optional_number(FILE, row, name, value)? {
                bandwidths.insert(*key, v);
            }
        }
        rows.push(bandwidths);
    }
    Ok(BandwidthTable { rows })
}
