//! Loader for the world map: TopoJSON country names joined with the HDI
//! table.
//!
//! Only `objects.countries.geometries[*].properties.name` is read from the
//! topology. Arcs and transforms stay with the browser, which draws the
//! shapes itself. Each named geometry gets an HDI value for every year in
//! `2000..=2016`, `0.0` when the HDI table has none.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use lifespan_types::CountryShape;
use serde::Deserialize;
use tracing::{debug, info};

use crate::cells::{open, optional_number, year};
use crate::error::DataError;

const HDI_FILE: &str = "HDI.csv";
const HDI_PREFIX: &str = "HDI_";

#[derive(Debug, Deserialize)]
struct Topology {
    objects: Objects,
}

#[derive(Debug, Deserialize)]
struct Objects {
    countries: GeometryCollection,
}

#[derive(Debug, Deserialize)]
struct GeometryCollection {
    #[serde(default)]
    geometries: Vec<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    name: Option<String>,
}

/// Load the topology and the HDI table from disk and join them by
/// country name.
///
/// # Errors
///
/// Fails if either file cannot be read, the topology lacks
/// `objects.countries`, or an HDI cell is not a number.
pub fn load_country_shapes(
    topology_path: &Path,
    hdi_path: &Path,
) -> Result<Vec<CountryShape>, DataError> {
    let shapes = load_country_shapes_from_reader(open(topology_path)?, open(hdi_path)?)?;
    info!(
        topology = %topology_path.display(),
        hdi = %hdi_path.display(),
        countries = shapes.len(),
        "world map loaded"
    );
    Ok(shapes)
}

/// Join a topology and an HDI table read from any readers.
///
/// # Errors
///
/// See [`load_country_shapes`].
pub fn load_country_shapes_from_reader<T: Read, H: Read>(
    topology: T,
    hdi: H,
) -> Result<Vec<CountryShape>, DataError> {
    let topology: Topology = serde_json::from_reader(topology)?;
    let hdi = load_hdi(hdi)?;

    let mut unnamed = 0_usize;
    let mut shapes = Vec::with_capacity(topology.objects.countries.geometries.len());
    for geometry in topology.objects.countries.geometries {
        let Some(name) = geometry.properties.name else {
            unnamed = unnamed.saturating_add(1);
            continue;
        };
        let known = hdi.get(&name);
        let series = (CountryShape::FIRST_HDI_YEAR..=CountryShape::LAST_HDI_YEAR)
            .map(|y| {
                let value = known.and_then(|k| k.get(&y)).copied().unwrap_or(0.0);
                (y, value)
            })
            .collect();
        shapes.push(CountryShape { name, hdi: series });
    }
    if unnamed > 0 {
        debug!(unnamed, "skipped geometries without a name");
    }
    Ok(shapes)
}

/// `country -> year -> HDI`. A later row for the same country replaces an
/// earlier one.
fn load_hdi<R: Read>(reader: R) -> Result<BTreeMap<String, BTreeMap<i32, f64>>, DataError> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers()?.clone();
    let country_at = headers
        .iter()
        .position(|h| h.trim() == "country")
        .ok_or(DataError::MissingColumn {
            file: HDI_FILE,
            column: "country",
        })?;
    let mut year_columns = Vec::new();
    for (at, header) in headers.iter().enumerate() {
        if let Some(suffix) = header.trim().strip_prefix(HDI_PREFIX) {
            year_columns.push((at, header.trim(), year(HDI_FILE, 0, header, suffix)?));
        }
    }

    let mut table = BTreeMap::new();
    for (index, result) in csv.records().enumerate() {
        let row = index.saturating_add(1);
        let record = result?;
        let country = record.get(country_at).unwrap_or_default().trim();
        if country.is_empty() {
            continue;
        }
        let mut series = BTreeMap::new();
        for &(at, column, y) in &year_columns {
            let value = record.get(at).unwrap_or_default();
            if let Some(v) = optional_number(HDI_FILE, row, column, value)? {
                series.insert(y, v);
            }
        }
        table.insert(country.to_owned(), series);
    }
    Ok(table)
}
