//! The loaded input tables, bundled for the views.

use std::collections::BTreeSet;

use lifespan_types::{BandwidthTable, CountryShape, CountryYearRecord, GameEvent};
use serde::{Deserialize, Serialize};

/// Every table the dashboard reads. Immutable after loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// WHO life-expectancy rows, one per country and year.
    pub life_table: Vec<CountryYearRecord>,
    /// LOESS bandwidths by year and attribute.
    pub bandwidths: BandwidthTable,
    /// Olympic Games editions.
    pub games: Vec<GameEvent>,
    /// World map countries with their HDI series.
    pub shapes: Vec<CountryShape>,
}

impl Dataset {
    /// Rows observed in `year`.
    pub fn rows_for_year(&self, year: i32) -> impl Iterator<Item = &CountryYearRecord> {
        self.life_table.iter().filter(move |r| r.year == year)
    }

    /// Distinct country names of the life table, sorted.
    pub fn countries(&self) -> BTreeSet<&str> {
        self.life_table.iter().map(|r| r.country.as_str()).collect()
    }

    /// Distinct years of the life table, sorted.
    pub fn years(&self) -> BTreeSet<i32> {
        self.life_table.iter().map(|r| r.year).collect()
    }
}
