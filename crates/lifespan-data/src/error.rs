//! Error types for the data loaders.
//!
//! Every loader reports through [`DataError`], naming the file and, where it
//! applies, the row and column that could not be read.

use std::path::PathBuf;

use lifespan_types::UnknownVariant;

/// Errors that can occur while loading input files.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// A file could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        /// The file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The CSV reader failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The topology file is not valid JSON of the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column is absent from the header.
    #[error("{file}: missing column {column:?}")]
    MissingColumn {
        /// Logical file name.
        file: &'static str,
        /// The column.
        column: &'static str,
    },

    /// A required cell is empty.
    #[error("{file} row {row}: empty {column:?}")]
    EmptyCell {
        /// Logical file name.
        file: &'static str,
        /// One-based data row.
        row: usize,
        /// The column.
        column: String,
    },

    /// A numeric cell does not parse.
    #[error("{file} row {row}: {column:?} is not a number: {value:?}")]
    InvalidNumber {
        /// Logical file name.
        file: &'static str,
        /// One-based data row.
        row: usize,
        /// The column.
        column: String,
        /// The cell text.
        value: String,
    },

    /// A date cell does not parse.
    #[error("{file} row {row}: {column:?} is not a date: {value:?}")]
    InvalidDate {
        /// Logical file name.
        file: &'static str,
        /// One-based data row.
        row: usize,
        /// The column.
        column: &'static str,
        /// The cell text.
        value: String,
    },

    /// An enum cell holds an unknown spelling.
    #[error("{file} row {row}: {source}")]
    UnknownValue {
        /// Logical file name.
        file: &'static str,
        /// One-based data row.
        row: usize,
        /// The parse error.
        source: UnknownVariant,
    },
}
