//! Life in weeks: one cell per week of expected life, marked with whether it
//! has passed and whether it overlaps an Olympic Games.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use lifespan_types::{GameEvent, GameSeason, WEEKS_PER_YEAR, WeekCell, WeekGrid};

/// Errors raised while building the week grid.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeekGridError {
    /// Life expectancy is not a positive finite number.
    #[error("invalid life expectancy: {value}")]
    InvalidLifeExpectancy {
        /// The rejected value.
        value: f64,
    },

    /// A game closes before it opens.
    #[error("{season:?} games of {year} end before they start")]
    InvertedGame {
        /// Edition year.
        year: i32,
        /// Edition season.
        season: GameSeason,
    },

    /// Week arithmetic left chrono's supported range.
    #[error("week {week} is out of the supported date range")]
    DateOutOfRange {
        /// Zero-based week number.
        week: u32,
    },
}

/// A half-open `[start, end)` time span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Inclusive start.
    pub start: NaiveDateTime,
    /// Exclusive end.
    pub end: NaiveDateTime,
}

impl Span {
    /// Whether the two spans share any instant.
    ///
    /// Checks each endpoint of one span against the other in both
    /// directions, which also catches full containment either way.
    pub fn overlaps(self, other: Self) -> bool {
        let contains_start = |s: Self, t: NaiveDateTime| s.start <= t && t < s.end;
        let contains_end = |s: Self, t: NaiveDateTime| s.start < t && t <= s.end;
        contains_start(self, other.start)
            || contains_end(self, other.end)
            || contains_start(other, self.start)
            || contains_end(other, self.end)
    }
}

/// Span of a game, closing day included.
///
/// # Errors
///
/// Returns [`WeekGridError::InvertedGame`] when the end precedes the start.
pub fn game_span(game: &GameEvent) -> Result<Span, WeekGridError> {
    let inverted = WeekGridError::InvertedGame {
        year: game.year,
        season: game.season,
    };
    if game.end_date < game.start_date {
        return Err(inverted);
    }
    let end = game.end_date.succ_opt().ok_or(inverted)?;
    Ok(Span {
        start: game.start_date.and_time(NaiveTime::MIN),
        end: end.and_time(NaiveTime::MIN),
    })
}

/// Number of grid rows: one per started year of life expectancy.
///
/// # Errors
///
/// Fails for a non-positive or absurdly large life expectancy.
pub fn row_count(life_expectancy: f64) -> Result<u32, WeekGridError> {
    if !life_expectancy.is_finite() || life_expectancy <= 0.0 || life_expectancy > 1000.0 {
        return Err(WeekGridError::InvalidLifeExpectancy {
            value: life_expectancy,
        });
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rows = life_expectancy.ceil() as u32;
    Ok(rows)
}

/// Build the `ceil(L) × 52` week grid.
///
/// Week `k` (row-major) spans `[dob + k weeks, dob + k + 1 weeks)`. Cells
/// overlapping a game take the season of the last such game in `games`.
/// In-game cells are numbered densely in row-major order, with passed and
/// upcoming weeks counted separately.
///
/// # Errors
///
/// See [`WeekGridError`].
pub fn build_week_grid(
    dob: NaiveDate,
    life_expectancy: f64,
    games: &[GameEvent],
    now: NaiveDateTime,
) -> Result<WeekGrid, WeekGridError> {
    let rows = row_count(life_expectancy)?;
    let spans = games
        .iter()
        .map(|g| game_span(g).map(|span| (span, g.season)))
        .collect::<Result<Vec<_>, _>>()?;

    let birth = dob.and_time(NaiveTime::MIN);
    let week_start = |week: u32| {
        birth
            .checked_add_signed(TimeDelta::weeks(i64::from(week)))
            .ok_or(WeekGridError::DateOutOfRange { week })
    };

    let mut passed_index = 0_u32;
    let mut upcoming_index = 0_u32;
    let mut grid = Vec::new();

    for row in 0..rows {
        let mut cells = Vec::new();
        for column in 0..WEEKS_PER_YEAR {
            let week = row.saturating_mul(WEEKS_PER_YEAR).saturating_add(column);
            let span = Span {
                start: week_start(week)?,
                end: week_start(week.saturating_add(1))?,
            };

            let season = spans
                .iter()
                .filter(|(game, _)| span.overlaps(*game))
                .map(|(_, season)| *season)
                .next_back();
            let passed = span.start < now;
            let index = season.map(|_| {
                let counter = if passed {
                    &mut passed_index
                } else {
                    &mut upcoming_index
                };
                let current = *counter;
                *counter = counter.saturating_add(1);
                current
            });

            cells.push(WeekCell {
                passed,
                in_game: season.is_some(),
                season,
                index,
            });
        }
        grid.push(cells);
    }

    Ok(WeekGrid { rows: grid })
}
