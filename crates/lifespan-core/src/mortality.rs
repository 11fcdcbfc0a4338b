//! Mortality calendar: per-day probability of death from birth to the
//! estimated date of death.
//!
//! # Algorithm
//!
//! 1. Brackets are sorted by lower bound.
//! 2. The date of death is birth (at midnight) plus `L × 365.25` days.
//! 3. Walking the brackets in order, each bracket owns the birth-relative
//!    years from where the previous bracket stopped up to the year before
//!    the next bracket starts. Every real day of those years that lies in
//!    `[dob, dod)` gets the bracket's probability.
//! 4. The first bracket whose upper bound reaches the lifespan in years (or
//!    that has no upper bound) is terminal: it owns every remaining year up
//!    to the date of death and later brackets are ignored.
//!
//! Each day keeps its real date plus a display date in [`REFERENCE_YEAR`],
//! a leap year, so rows of different years line up on one x axis.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use lifespan_types::{
    AgeBracket, LifeSummary, MortalityAnnotation, MortalityAnnotations, MortalityCalendar,
    MortalityDay,
};

use crate::lifetable::BracketProbability;

/// Average days per year used to turn life expectancy into elapsed time.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Year every display date is mapped onto.
pub const REFERENCE_YEAR: i32 = 2024;

/// Age of the early-childhood annotation.
pub const UNDER_FIVE_AGE: u32 = 5;

/// Age of the adult annotation (capped by life expectancy).
pub const UNDER_SIXTY_AGE: u32 = 60;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Errors raised while building a mortality calendar.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MortalityError {
    /// Life expectancy is not a positive finite number.
    #[error("invalid life expectancy: {value}")]
    InvalidLifeExpectancy {
        /// The rejected value.
        value: f64,
    },

    /// Date arithmetic left chrono's supported range.
    #[error("date out of range while {context}")]
    DateOutOfRange {
        /// What was being computed.
        context: &'static str,
    },

    /// The life table row has no brackets for the gender.
    #[error("life table has no mortality brackets")]
    NoBrackets,

    /// The youngest bracket does not start at birth.
    #[error("youngest mortality bracket starts at age {lowest}, not 0")]
    NoBracketFromBirth {
        /// Lower bound of the youngest bracket.
        lowest: u32,
    },

    /// A bracket needed for the calendar has an empty cell.
    #[error("mortality bracket {bracket:?} has no probability")]
    MissingProbability {
        /// The bracket.
        bracket: AgeBracket,
    },

    /// A bracket probability is negative or not finite.
    #[error("mortality bracket {bracket:?} has invalid probability {value}")]
    InvalidProbability {
        /// The bracket.
        bracket: AgeBracket,
        /// The rejected value.
        value: f64,
    },

    /// The brackets stop before the lifespan and none is open-ended.
    #[error("mortality brackets end at age {last_upper}, lifespan is {lifespan_years} years")]
    IncompleteTable {
        /// Upper bound of the oldest bracket.
        last_upper: u32,
        /// Lifespan in calendar years.
        lifespan_years: u32,
    },
}

/// Everything the calendar heatmap derives from one life-table row.
#[derive(Debug, Clone, PartialEq)]
pub struct MortalityProfile {
    /// Estimated date of death.
    pub date_of_death: NaiveDateTime,
    /// `dod.year - dob.year`.
    pub lifespan_years: u32,
    /// Per-day probabilities.
    pub calendar: MortalityCalendar,
    /// Under-5 and under-60 markers.
    pub annotations: MortalityAnnotations,
}

/// Elapsed time for a life expectancy given in years.
fn lifespan_delta(life_expectancy: f64) -> Result<TimeDelta, MortalityError> {
    if !life_expectancy.is_finite() || life_expectancy <= 0.0 {
        return Err(MortalityError::InvalidLifeExpectancy {
            value: life_expectancy,
        });
    }
    let ms = (life_expectancy * DAYS_PER_YEAR * MS_PER_DAY).round();
    // 1e15 ms is ~31,000 years; anything beyond is not a lifespan.
    if ms > 1e15 {
        return Err(MortalityError::InvalidLifeExpectancy {
            value: life_expectancy,
        });
    }
    #[allow(clippy::cast_possible_truncation)]
    let ms = ms as i64;
    TimeDelta::try_milliseconds(ms).ok_or(MortalityError::DateOutOfRange {
        context: "converting life expectancy",
    })
}

/// Estimated date of death: `dob + life_expectancy × 365.25` days.
///
/// # Errors
///
/// Fails for a non-positive life expectancy or an unrepresentable date.
pub fn date_of_death(dob: NaiveDate, life_expectancy: f64) -> Result<NaiveDateTime, MortalityError> {
    let delta = lifespan_delta(life_expectancy)?;
    dob.and_time(NaiveTime::MIN)
        .checked_add_signed(delta)
        .ok_or(MortalityError::DateOutOfRange {
            context: "computing date of death",
        })
}

/// Age today and share of life lived, for the calendar caption.
///
/// # Errors
///
/// Fails for a non-positive life expectancy.
pub fn life_summary(
    dob: NaiveDate,
    life_expectancy: f64,
    now: NaiveDateTime,
) -> Result<LifeSummary, MortalityError> {
    let lifespan = lifespan_delta(life_expectancy)?;
    let elapsed = now.signed_duration_since(dob.and_time(NaiveTime::MIN));

    #[allow(clippy::cast_precision_loss)]
    let elapsed_ms = elapsed.num_milliseconds() as f64;
    #[allow(clippy::cast_precision_loss)]
    let lifespan_ms = lifespan.num_milliseconds() as f64;

    let age_years = elapsed_ms / (DAYS_PER_YEAR * MS_PER_DAY);
    Ok(LifeSummary {
        age_years: (age_years * 10.0).round() / 10.0,
        life_lived_fraction: elapsed_ms / lifespan_ms,
    })
}

fn probability_of(b: &BracketProbability) -> Result<f64, MortalityError> {
    let value = b.probability.ok_or(MortalityError::MissingProbability { bracket: b.bracket })?;
    if !value.is_finite() || value < 0.0 {
        return Err(MortalityError::InvalidProbability {
            bracket: b.bracket,
            value,
        });
    }
    Ok(value)
}

/// A run of birth-relative years sharing one probability.
#[derive(Debug, Clone, Copy, PartialEq)]
struct YearSpan {
    first: u32,
    last: u32,
    probability: f64,
}

/// Assign birth-relative years `0..=lifespan_years` to brackets.
fn year_spans(
    sorted: &[BracketProbability],
    lifespan_years: u32,
) -> Result<Vec<YearSpan>, MortalityError> {
    let mut spans = Vec::new();
    let mut cursor = 0_u32;

    for (position, b) in sorted.iter().enumerate() {
        let first = b.bracket.lower.max(cursor);

        if b.bracket.reaches(lifespan_years) {
            spans.push(YearSpan {
                first,
                last: lifespan_years.max(first),
                probability: probability_of(b)?,
            });
            return Ok(spans);
        }

        let Some(next) = sorted.get(position.saturating_add(1)) else {
            return Err(MortalityError::IncompleteTable {
                last_upper: b.bracket.upper.unwrap_or(b.bracket.lower),
                lifespan_years,
            });
        };

        // Overlapping brackets (0-1 then 1-4) hand the shared year to the
        // later one; gaps stay with the earlier one.
        if next.bracket.lower <= first {
            continue;
        }
        let last = next.bracket.lower.saturating_sub(1);
        spans.push(YearSpan {
            first,
            last,
            probability: probability_of(b)?,
        });
        cursor = next.bracket.lower;
    }

    Err(MortalityError::NoBrackets)
}

/// Same month and day in [`REFERENCE_YEAR`].
fn display_date(date: NaiveDate) -> Result<NaiveDate, MortalityError> {
    NaiveDate::from_ymd_opt(REFERENCE_YEAR, date.month(), date.day()).ok_or(
        MortalityError::DateOutOfRange {
            context: "mapping to reference year",
        },
    )
}

fn year_start(year: i32) -> Result<NaiveDate, MortalityError> {
    NaiveDate::from_ymd_opt(year, 1, 1).ok_or(MortalityError::DateOutOfRange {
        context: "locating year start",
    })
}

fn year_end(year: i32) -> Result<NaiveDate, MortalityError> {
    NaiveDate::from_ymd_opt(year, 12, 31).ok_or(MortalityError::DateOutOfRange {
        context: "locating year end",
    })
}

fn annotations(
    sorted: &[BracketProbability],
    dob: NaiveDate,
    dod: NaiveDateTime,
    life_expectancy: f64,
) -> Result<MortalityAnnotations, MortalityError> {
    let under_five_probability = sorted
        .iter()
        .take(2)
        .map(probability_of)
        .sum::<Result<f64, _>>()?;

    let sixtieth_year = dob.year().saturating_add(60);
    let (under_sixty_probability, age_threshold) = if life_expectancy < 60.0 {
        let mut total = 0.0;
        for b in sorted {
            total += probability_of(b)?;
            if b.bracket.upper.is_none_or(|upper| f64::from(upper) > life_expectancy) {
                break;
            }
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let threshold = life_expectancy.floor() as u32;
        (total, threshold)
    } else {
        let total = sorted
            .iter()
            .filter(|b| b.bracket.lower < UNDER_SIXTY_AGE)
            .map(probability_of)
            .sum::<Result<f64, _>>()?;
        (total, UNDER_SIXTY_AGE)
    };

    Ok(MortalityAnnotations {
        under_five: MortalityAnnotation {
            year: dob.year().saturating_add(5),
            probability: under_five_probability,
            age_threshold: UNDER_FIVE_AGE,
        },
        under_sixty: MortalityAnnotation {
            year: dod.year().min(sixtieth_year),
            probability: under_sixty_probability,
            age_threshold,
        },
    })
}

/// Build the mortality calendar and annotations for one person.
///
/// `brackets` need not be sorted. `now` decides which days are marked as
/// lived.
///
/// # Errors
///
/// See [`MortalityError`]; every variant is a data-shape problem the caller
/// should surface rather than retry.
pub fn build_profile(
    brackets: &[BracketProbability],
    dob: NaiveDate,
    life_expectancy: f64,
    now: NaiveDateTime,
) -> Result<MortalityProfile, MortalityError> {
    let mut sorted = brackets.to_vec();
    sorted.sort_by_key(|b| b.bracket);

    let lowest = sorted.first().ok_or(MortalityError::NoBrackets)?.bracket.lower;
    if lowest != 0 {
        return Err(MortalityError::NoBracketFromBirth { lowest });
    }

    let dod = date_of_death(dob, life_expectancy)?;
    let lifespan_years = u32::try_from(dod.year().saturating_sub(dob.year())).map_err(|_err| {
        MortalityError::DateOutOfRange {
            context: "computing lifespan years",
        }
    })?;

    let total_days = dod
        .signed_duration_since(dob.and_time(NaiveTime::MIN))
        .num_days();
    let last_day = if total_days > 0 {
        dob.checked_add_signed(TimeDelta::days(total_days.saturating_sub(1)))
    } else {
        None
    };

    let mut years: BTreeMap<u32, Vec<MortalityDay>> = BTreeMap::new();
    if let Some(last_day) = last_day {
        for span in year_spans(&sorted, lifespan_years)? {
            for offset in span.first..=span.last {
                let year = dob.year().saturating_add_unsigned(offset);
                let from = year_start(year)?.max(dob);
                let to = year_end(year)?.min(last_day);
                if from > to {
                    continue;
                }
                let days = years.entry(offset).or_default();
                for date in from.iter_days().take_while(|d| *d <= to) {
                    days.push(MortalityDay {
                        date,
                        display_date: display_date(date)?,
                        probability: span.probability,
                        lived: date.and_time(NaiveTime::MIN) < now,
                    });
                }
            }
        }
    }

    let calendar = MortalityCalendar {
        birth_year: dob.year(),
        years,
    };
    let annotations = annotations(&sorted, dob, dod, life_expectancy)?;

    Ok(MortalityProfile {
        date_of_death: dod,
        lifespan_years,
        calendar,
        annotations,
    })
}
