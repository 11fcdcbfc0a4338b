//! Derived data: the outputs of the core transforms.
//!
//! Rebuilt from scratch whenever the inputs they depend on change; never
//! persisted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::GameSeason;

// ---------------------------------------------------------------------------
// Mortality calendar
// ---------------------------------------------------------------------------

/// One day of a person's life with its bracket's probability of death.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MortalityDay {
    /// Actual calendar date.
    pub date: NaiveDate,
    /// Same month and day in the reference year, for x-axis alignment.
    pub display_date: NaiveDate,
    /// Probability of death of the bracket covering this day.
    pub probability: f64,
    /// Whether the day lies between birth and today.
    pub lived: bool,
}

/// Per-day mortality from birth to the estimated date of death.
///
/// Keyed by birth-relative year: key `0` is the birth year, key `k` the
/// calendar year `birth_year + k`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MortalityCalendar {
    /// Calendar year of key `0`.
    pub birth_year: i32,
    /// Days grouped by birth-relative year, in date order.
    pub years: BTreeMap<u32, Vec<MortalityDay>>,
}

impl MortalityCalendar {
    /// Number of days covered.
    pub fn total_days(&self) -> usize {
        self.years.values().map(Vec::len).sum()
    }

    /// The last covered day.
    pub fn last_day(&self) -> Option<&MortalityDay> {
        self.years.values().next_back().and_then(|days| days.last())
    }

    /// Iterate every day in date order.
    pub fn days(&self) -> impl Iterator<Item = &MortalityDay> {
        self.years.values().flatten()
    }

    /// Largest probability in the calendar, `0.0` when empty.
    pub fn max_probability(&self) -> f64 {
        self.days().map(|d| d.probability).fold(0.0, f64::max)
    }
}

/// A "x% don't live past age y" marker on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MortalityAnnotation {
    /// Calendar year the marker is drawn at.
    pub year: i32,
    /// Summed bracket probability up to the threshold.
    pub probability: f64,
    /// Age the marker refers to.
    pub age_threshold: u32,
}

/// The two annotations drawn on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MortalityAnnotations {
    /// Dying before age 5.
    pub under_five: MortalityAnnotation,
    /// Dying before 60, or before the life expectancy when that is lower.
    pub under_sixty: MortalityAnnotation,
}

// ---------------------------------------------------------------------------
// Regression
// ---------------------------------------------------------------------------

/// How a regression curve was fitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RegressionMethod {
    /// Least-squares polynomial of the given order.
    Polynomial {
        /// Highest power of x.
        order: u8,
    },
    /// Locally weighted linear smoothing.
    Loess {
        /// Fraction of points in each local neighbourhood.
        bandwidth: f64,
    },
}

/// A point on a fitted curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CurvePoint {
    /// Life expectancy.
    pub x: f64,
    /// Fitted attribute value.
    pub y: f64,
}

/// A fitted curve ready for a line generator.
///
/// `points` is empty when there was nothing to fit; the overlay then draws
/// nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RegressionCurve {
    /// Fitting method that produced the curve.
    pub method: RegressionMethod,
    /// Points ordered by x.
    pub points: Vec<CurvePoint>,
    /// Polynomial coefficients in the mean-centred basis, lowest power first.
    pub coefficients: Vec<f64>,
    /// Coefficient of determination for polynomial fits.
    pub r_squared: Option<f64>,
}

impl RegressionCurve {
    /// A curve with no points.
    pub const fn empty(method: RegressionMethod) -> Self {
        Self {
            method,
            points: Vec::new(),
            coefficients: Vec::new(),
            r_squared: None,
        }
    }

    /// Whether there is anything to draw.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Week grid
// ---------------------------------------------------------------------------

/// Number of columns in the week grid.
pub const WEEKS_PER_YEAR: u32 = 52;

/// One week of life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WeekCell {
    /// The week started before now.
    pub passed: bool,
    /// The week overlaps an Olympic Games.
    pub in_game: bool,
    /// Season of the overlapping Games.
    pub season: Option<GameSeason>,
    /// Dense ordinal among in-game cells of the same `passed` partition.
    pub index: Option<u32>,
}

/// Rows of 52 week cells, one row per year of life expectancy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WeekGrid {
    /// Cells in row-major order, grouped by year of age.
    pub rows: Vec<Vec<WeekCell>>,
}

impl WeekGrid {
    /// Iterate all cells row by row.
    pub fn cells(&self) -> impl Iterator<Item = &WeekCell> {
        self.rows.iter().flatten()
    }

    /// Count the cells matching a predicate.
    pub fn count(&self, predicate: impl Fn(&WeekCell) -> bool) -> usize {
        self.cells().filter(|c| predicate(c)).count()
    }
}
