//! Input records, as handed over by the data loaders.
//!
//! These are immutable once loaded. The core never re-reads files; it only
//! looks rows up in these structures.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AttributeKey, Gender, GameSeason};

// ---------------------------------------------------------------------------
// Life table
// ---------------------------------------------------------------------------

/// An age range, in whole years, of a mortality bracket.
///
/// `upper` is `None` for open-ended brackets such as "85+". Brackets order
/// by lower bound first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgeBracket {
    /// Youngest age covered.
    pub lower: u32,
    /// Oldest age covered, inclusive. `None` means unbounded.
    pub upper: Option<u32>,
}

impl AgeBracket {
    /// Parse a life-table column such as `male_5_9` or `female_85_plus`.
    ///
    /// The gender prefix must be followed by an underscore. The first run
    /// of digits is the lower bound, the second (if any) the upper bound; a
    /// single number means an open-ended bracket. Returns `None` for
    /// columns that are not mortality brackets.
    pub fn parse_column(column: &str) -> Option<(Gender, Self)> {
        let (gender, rest) = Gender::ALL.into_iter().find_map(|gender| {
            column
                .strip_prefix(gender.as_str())
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|rest| (gender, rest))
        })?;

        let mut numbers = rest
            .split(|c: char| !c.is_ascii_digit())
            .filter(|run| !run.is_empty())
            .map(str::parse::<u32>);

        let lower = numbers.next()?.ok()?;
        let upper = match numbers.next() {
            Some(parsed) => Some(parsed.ok()?),
            None => None,
        };
        if upper.is_some_and(|upper| upper < lower) {
            return None;
        }
        Some((gender, Self { lower, upper }))
    }

    /// Whether the bracket reaches or passes `age`.
    pub fn reaches(self, age: u32) -> bool {
        self.upper.is_none_or(|upper| upper >= age)
    }
}

/// Probability of dying within one age bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MortalityBracket {
    /// Which gender's column this came from.
    pub gender: Gender,
    /// Parsed age range.
    pub bracket: AgeBracket,
    /// Column name in the life table, kept for diagnostics.
    pub column: String,
    /// Probability of death in the range. `None` when the cell was empty.
    pub probability: Option<f64>,
}

/// One country-year row of the WHO life-expectancy table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CountryYearRecord {
    /// Country name as used by every selector.
    pub country: String,
    /// ISO country code.
    pub country_code: String,
    /// WHO region.
    pub region: String,
    /// Observation year.
    pub year: i32,
    /// Life expectancy for both genders (scatter x axis).
    pub life_expect: Option<f64>,
    /// Male life expectancy at birth.
    pub life_expectancy_male: Option<f64>,
    /// Female life expectancy at birth.
    pub life_expectancy_female: Option<f64>,
    /// Health indicators that have a value for this row.
    pub indicators: BTreeMap<AttributeKey, f64>,
    /// Mortality brackets for both genders, in column order.
    pub mortality: Vec<MortalityBracket>,
}

impl CountryYearRecord {
    /// Indicator value, if the cell was filled.
    pub fn indicator(&self, key: AttributeKey) -> Option<f64> {
        self.indicators.get(&key).copied()
    }

    /// Life expectancy at birth for one gender.
    pub const fn life_expectancy_for(&self, gender: Gender) -> Option<f64> {
        match gender {
            Gender::Male => self.life_expectancy_male,
            Gender::Female => self.life_expectancy_female,
        }
    }

    /// Mortality brackets for one gender, in column order.
    pub fn brackets_for(&self, gender: Gender) -> impl Iterator<Item = &MortalityBracket> {
        self.mortality.iter().filter(move |b| b.gender == gender)
    }
}

// ---------------------------------------------------------------------------
// Regression bandwidths
// ---------------------------------------------------------------------------

/// LOESS bandwidths, one row per year starting at [`BandwidthTable::BASE_YEAR`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BandwidthTable {
    /// Row `i` holds the bandwidths for year `BASE_YEAR + i`.
    pub rows: Vec<BTreeMap<AttributeKey, f64>>,
}

impl BandwidthTable {
    /// Year of row 0.
    pub const BASE_YEAR: i32 = 2000;

    /// Bandwidth for `(year, attribute)`, if the table has one.
    pub fn get(&self, year: i32, attribute: AttributeKey) -> Option<f64> {
        let offset = year.checked_sub(Self::BASE_YEAR)?;
        let row = usize::try_from(offset).ok()?;
        self.rows.get(row)?.get(&attribute).copied()
    }
}

// ---------------------------------------------------------------------------
// Olympic Games
// ---------------------------------------------------------------------------

/// One Olympic Games edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameEvent {
    /// Opening day.
    pub start_date: NaiveDate,
    /// Closing day, inclusive.
    pub end_date: NaiveDate,
    /// Edition year.
    pub year: i32,
    /// Summer or Winter.
    pub season: GameSeason,
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

/// One country of the world map with its HDI series.
///
/// The geometry itself stays with the browser; only the name and the
/// per-year HDI value are needed here. A missing value is stored as `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CountryShape {
    /// `properties.name` of the geometry.
    pub name: String,
    /// HDI by year.
    pub hdi: BTreeMap<i32, f64>,
}

impl CountryShape {
    /// First year with HDI data.
    pub const FIRST_HDI_YEAR: i32 = 2000;
    /// Last year with HDI data.
    pub const LAST_HDI_YEAR: i32 = 2016;

    /// HDI for a year, `0.0` when absent.
    pub fn hdi_for(&self, year: i32) -> f64 {
        self.hdi.get(&year).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_bracket_reaches_any_age() {
        let open = AgeBracket {
            lower: 85,
            upper: None,
        };
        assert!(open.reaches(120));
        let closed = AgeBracket {
            lower: 80,
            upper: Some(84),
        };
        assert!(closed.reaches(84));
        assert!(!closed.reaches(85));
    }

    #[test]
    fn bracket_columns_parse() {
        assert_eq!(
            AgeBracket::parse_column("male_5_9"),
            Some((
                Gender::Male,
                AgeBracket {
                    lower: 5,
                    upper: Some(9)
                }
            ))
        );
        assert_eq!(
            AgeBracket::parse_column("female_85_plus"),
            Some((
                Gender::Female,
                AgeBracket {
                    lower: 85,
                    upper: None
                }
            ))
        );
        assert_eq!(AgeBracket::parse_column("life_expectancy_male"), None);
        assert_eq!(AgeBracket::parse_column("male_"), None);
        assert_eq!(AgeBracket::parse_column("malefactor_1_4"), None);
    }

    #[test]
    fn brackets_order_by_lower_bound() {
        let mut brackets = [
            AgeBracket {
                lower: 10,
                upper: Some(14),
            },
            AgeBracket {
                lower: 1,
                upper: Some(4),
            },
            AgeBracket {
                lower: 5,
                upper: Some(9),
            },
        ];
        brackets.sort();
        let lowers: Vec<u32> = brackets.iter().map(|b| b.lower).collect();
        assert_eq!(lowers, vec![1, 5, 10]);
    }

    #[test]
    fn bandwidth_lookup_is_year_relative() {
        let mut row = BTreeMap::new();
        row.insert(AttributeKey::Bmi, 0.4);
        let table = BandwidthTable {
            rows: vec![BTreeMap::new(), row],
        };
        assert_eq!(table.get(2001, AttributeKey::Bmi), Some(0.4));
        assert_eq!(table.get(2000, AttributeKey::Bmi), None);
        assert_eq!(table.get(1999, AttributeKey::Bmi), None);
    }

    #[test]
    fn missing_hdi_is_zero() {
        let shape = CountryShape {
            name: "Atlantis".to_owned(),
            hdi: BTreeMap::new(),
        };
        assert!(shape.hdi_for(2010).abs() < f64::EPSILON);
    }
}
