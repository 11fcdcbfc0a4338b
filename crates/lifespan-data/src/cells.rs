//! Cell-level parsing shared by the CSV loaders.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::DataError;

/// Open `path` for reading.
pub(crate) fn open(path: &Path) -> Result<File, DataError> {
    File::open(path).map_err(|source| DataError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// An optional number: empty cells are `None`.
pub(crate) fn optional_number(
    file: &'static str,
    row: usize,
    column: &str,
    value: &str,
) -> Result<Option<f64>, DataError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| DataError::InvalidNumber {
            file,
            row,
            column: column.to_owned(),
            value: value.to_owned(),
        })
}

/// A required year. Accepts `2015` and `2015.0`.
pub(crate) fn year(
    file: &'static str,
    row: usize,
    column: &str,
    value: &str,
) -> Result<i32, DataError> {
    let invalid = || DataError::InvalidNumber {
        file,
        row,
        column: column.to_owned(),
        value: value.to_owned(),
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DataError::EmptyCell {
            file,
            row,
            column: column.to_owned(),
        });
    }
    if let Ok(year) = trimmed.parse::<i32>() {
        return Ok(year);
    }
    let float = trimmed.parse::<f64>().map_err(|_err| invalid())?;
    if float.fract().abs() > 0.0 || !(-9999.0..=9999.0).contains(&float) {
        return Err(invalid());
    }
    #[allow(clippy::cast_possible_truncation)]
    let year = float as i32;
    Ok(year)
}

/// Date notations seen in the hosts file.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// A calendar date in ISO (`2000-09-15`) or US (`9/15/2000`) notation.
/// Timestamps keep only their date part.
pub(crate) fn date(
    file: &'static str,
    row: usize,
    column: &'static str,
    value: &str,
) -> Result<NaiveDate, DataError> {
    let trimmed = value.trim();
    let day = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(day, format).ok())
        .ok_or_else(|| DataError::InvalidDate {
            file,
            row,
            column,
            value: value.to_owned(),
        })
}
