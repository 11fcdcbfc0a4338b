//! Loader for the Olympic Games host list (`olympic_hosts.csv`).

use std::io::Read;
use std::path::Path;

use lifespan_types::{GameEvent, GameSeason};
use tracing::info;

use crate::cells::{date, open, year};
use crate::error::DataError;

const FILE: &str = "olympic_hosts.csv";

const START: &str = "game_start_date";
const END: &str = "game_end_date";
const YEAR: &str = "game_year";
const SEASON: &str = "game_season";

/// Load `olympic_hosts.csv` from disk.
///
/// # Errors
///
/// Fails if the file cannot be read, a column is missing, or a cell does
/// not parse.
pub fn load_games(path: &Path) -> Result<Vec<GameEvent>, DataError> {
    let games = load_games_from_reader(open(path)?)?;
    info!(path = %path.display(), games = games.len(), "olympic hosts loaded");
    Ok(games)
}

/// Load the host list from any reader. Extra columns (host city, game
/// name, ...) are ignored.
///
/// # Errors
///
/// See [`load_games`].
pub fn load_games_from_reader<R: Read>(reader: R) -> Result<Vec<GameEvent>, DataError> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers()?.clone();
    let position = |column: &'static str| {
        headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or(DataError::MissingColumn { file: FILE, column })
    };
    let start_at = position(START)?;
    let end_at = position(END)?;
    let year_at = position(YEAR)?;
    let season_at = position(SEASON)?;

    let mut games = Vec::new();
    for (index, result) in csv.records().enumerate() {
        let row = index.saturating_add(1);
        let record = result?;
        let cell = |at: usize| record.get(at).unwrap_or_default();

        let season = cell(season_at)
            .parse::<GameSeason>()
            .map_err(|source| DataError::UnknownValue {
                file: FILE,
                row,
                source,
            })?;
        games.push(GameEvent {
            start_date: date(FILE, row, START, cell(start_at))?,
            end_date: date(FILE, row, END, cell(end_at))?,
            year: year(FILE, row, YEAR, cell(year_at))?,
            season,
        });
    }
    Ok(games)
}
