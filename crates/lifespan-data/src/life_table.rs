//! Loader for the WHO life-expectancy table (`who_life_exp.csv`).
//!
//! One row per country and year. Columns fall into four groups:
//!
//! - identity: `country`, `country_code`, `region`, `year`
//! - life expectancy: `life_expect`, `life_expectancy_male`,
//!   `life_expectancy_female`
//! - health attributes, named after [`AttributeKey::column`]
//! - mortality brackets such as `male_5_9` or `female_85_plus`
//!
//! Anything else is ignored. Empty cells become `None`.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use lifespan_types::{AgeBracket, AttributeKey, CountryYearRecord, Gender, MortalityBracket};
use tracing::{debug, info};

use crate::cells::{open, optional_number, year};
use crate::error::DataError;

const FILE: &str = "who_life_exp.csv";

/// What a header column feeds.
#[derive(Debug, Clone, PartialEq)]
enum Column {
    Country,
    CountryCode,
    Region,
    Year,
    LifeExpect,
    LifeExpectancy(Gender),
    Attribute(AttributeKey),
    Bracket(Gender, AgeBracket),
    Ignored,
}

fn classify(header: &str) -> Column {
    match header.trim() {
        "country" => Column::Country,
        "country_code" => Column::CountryCode,
        "region" => Column::Region,
        "year" => Column::Year,
        "life_expect" => Column::LifeExpect,
        "life_expectancy_male" => Column::LifeExpectancy(Gender::Male),
        "life_expectancy_female" => Column::LifeExpectancy(Gender::Female),
        other => other
            .parse::<AttributeKey>()
            .map(Column::Attribute)
            .ok()
            .or_else(|| {
                AgeBracket::parse_column(other).map(|(gender, bracket)| Column::Bracket(gender, bracket))
            })
            .unwrap_or(Column::Ignored),
    }
}

/// Load `who_life_exp.csv` from disk.
///
/// # Errors
///
/// Fails if the file cannot be read, a required column is missing, or a
/// numeric cell does not parse.
pub fn load_life_table(path: &Path) -> Result<Vec<CountryYearRecord>, DataError> {
    let records = load_life_table_from_reader(open(path)?)?;
    info!(path = %path.display(), rows = records.len(), "life table loaded");
    Ok(records)
}

/// Load the life table from any reader.
///
/// # Errors
///
/// See [`load_life_table`].
pub fn load_life_table_from_reader<R: Read>(
    reader: R,
) -> Result<Vec<CountryYearRecord>, DataError> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers: Vec<(String, Column)> = csv
        .headers()?
        .iter()
        .map(|h| (h.trim().to_owned(), classify(h)))
        .collect();

    for (required, column) in [("country", Column::Country), ("year", Column::Year)] {
        if !headers.iter().any(|(_, c)| *c == column) {
            return Err(DataError::MissingColumn {
                file: FILE,
                column: required,
            });
        }
    }
    let ignored: Vec<&str> = headers
        .iter()
        .filter(|(_, c)| *c == Column::Ignored)
        .map(|(h, _)| h.as_str())
        .collect();
    if !ignored.is_empty() {
        debug!(columns = ?ignored, "ignoring life-table columns");
    }

    let mut records = Vec::new();
    for (index, result) in csv.records().enumerate() {
        let row = index.saturating_add(1);
        let record = result?;

        let mut out = CountryYearRecord {
            country: String::new(),
            country_code: String::new(),
            region: String::new(),
            year: 0,
            life_expect: None,
            life_expectancy_male: None,
            life_expectancy_female: None,
            indicators: BTreeMap::new(),
            mortality: Vec::new(),
        };

        for ((name, column), value) in headers.iter().zip(record.iter()) {
            match column {
                Column::Country => value.trim().clone_into(&mut out.country),
                Column::CountryCode => value.trim().clone_into(&mut out.country_code),
                Column::Region => value.trim().clone_into(&mut out.region),
                Column::Year => out.year = year(FILE, row, name, value)?,
                Column::LifeExpect => out.life_expect = optional_number(FILE, row, name, value)?,
                Column::LifeExpectancy(Gender::Male) => {
                    out.life_expectancy_male = optional_number(FILE, row, name, value)?;
                }
                Column::LifeExpectancy(Gender::Female) => {
                    out.life_expectancy_female = optional_number(FILE, row, name, value)?;
                }
                Column::Attribute(key) => {
                    if let Some(v) = optional_number(FILE, row, name, value)? {
                        out.indicators.insert(*key, v);
                    }
                }
                Column::Bracket(gender, bracket) => out.mortality.push(MortalityBracket {
                    gender: *gender,
                    bracket: *bracket,
                    column: name.clone(),
                    probability: optional_number(FILE, row, name, value)?,
                }),
                Column::Ignored => {}
            }
        }

        if out.country.is_empty() {
            return Err(DataError::EmptyCell {
                file: FILE,
                row,
                column: "country".to_owned(),
            });
        }
        records.push(out);
    }
    Ok(records)
}
