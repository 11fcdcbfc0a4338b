//! Small in-memory dataset shared by the unit tests.

#![allow(clippy::unwrap_used, clippy::cast_precision_loss)]

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use lifespan_types::{
    AgeBracket, AttributeKey, BandwidthTable, CountryShape, CountryYearRecord, GameEvent,
    GameSeason, Gender, MortalityBracket,
};

use crate::dataset::Dataset;
use crate::views::RenderContext;

/// Countries with a row for every fixture year: (name, male, female).
pub const COUNTRIES: [(&str, f64, f64); 4] = [
    ("Canada", 80.2, 84.1),
    ("Peru", 72.5, 77.9),
    ("Chad", 51.7, 54.5),
    ("Japan", 81.1, 87.1),
];

/// Years with rows.
pub const YEARS: [i32; 3] = [2000, 2005, 2015];

fn mortality(gender: Gender, scale: f64) -> Vec<MortalityBracket> {
    let mut columns = vec![format!("{gender}_0_1"), format!("{gender}_1_4")];
    for lower in (5..=80).step_by(5) {
        columns.push(format!("{gender}_{lower}_{}", lower + 4));
    }
    columns.push(format!("{gender}_85_plus"));

    columns
        .into_iter()
        .map(|column| {
            let (_, bracket) = AgeBracket::parse_column(&column).unwrap();
            let probability = if bracket.upper.is_none() {
                1.0
            } else {
                (f64::from(bracket.lower) / 1000.0 + 0.002) * scale
            };
            MortalityBracket {
                gender,
                bracket,
                column,
                probability: Some(probability),
            }
        })
        .collect()
}

/// One life-table row with every attribute filled.
pub fn record(country: &str, year: i32, male: f64, female: f64) -> CountryYearRecord {
    let both = (male + female) / 2.0;
    let indicators = AttributeKey::ALL
        .iter()
        .enumerate()
        .map(|(i, attr)| (*attr, both * (i as f64 + 1.0) / 10.0 + f64::from(year - 2000)))
        .collect();

    let mut mortality_rows = mortality(Gender::Male, 1.0);
    mortality_rows.extend(mortality(Gender::Female, 0.8));

    CountryYearRecord {
        country: country.to_owned(),
        country_code: country.get(..3).unwrap_or(country).to_uppercase(),
        region: "Test".to_owned(),
        year,
        life_expect: Some(both),
        life_expectancy_male: Some(male),
        life_expectancy_female: Some(female),
        indicators,
        mortality: mortality_rows,
    }
}

/// Bandwidth 0.5 for every attribute, 2000..=2016.
pub fn bandwidths() -> BandwidthTable {
    let row: BTreeMap<AttributeKey, f64> = AttributeKey::ALL.iter().map(|a| (*a, 0.5)).collect();
    BandwidthTable {
        rows: vec![row; 17],
    }
}

/// Two Games editions.
pub fn games() -> Vec<GameEvent> {
    vec![
        GameEvent {
            start_date: date(2000, 9, 15),
            end_date: date(2000, 10, 1),
            year: 2000,
            season: GameSeason::Summer,
        },
        GameEvent {
            start_date: date(2002, 2, 8),
            end_date: date(2002, 2, 24),
            year: 2002,
            season: GameSeason::Winter,
        },
    ]
}

/// Map shapes; "Atlantis" has no HDI at all.
pub fn shapes() -> Vec<CountryShape> {
    let mut out: Vec<CountryShape> = COUNTRIES
        .iter()
        .enumerate()
        .map(|(i, (name, _, _))| CountryShape {
            name: (*name).to_owned(),
            hdi: (CountryShape::FIRST_HDI_YEAR..=CountryShape::LAST_HDI_YEAR)
                .map(|y| (y, 0.4 + i as f64 * 0.1 + f64::from(y - 2000) * 0.001))
                .collect(),
        })
        .collect();
    out.push(CountryShape {
        name: "Atlantis".to_owned(),
        hdi: BTreeMap::new(),
    });
    out
}

/// The complete fixture dataset.
pub fn dataset() -> Dataset {
    let life_table = COUNTRIES
        .iter()
        .flat_map(|(name, male, female)| {
            YEARS.iter().map(move |y| record(name, *y, *male, *female))
        })
        .collect();
    Dataset {
        life_table,
        bandwidths: bandwidths(),
        games: games(),
        shapes: shapes(),
    }
}

/// A date, panicking on invalid input.
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Fixed "today" for reproducible models.
pub fn now() -> NaiveDateTime {
    date(2024, 6, 1).and_time(NaiveTime::MIN)
}

/// Render context at [`now`].
pub fn render() -> RenderContext {
    RenderContext {
        now: now(),
        curve_samples: 50,
    }
}
