//! Life-table lookups.
//!
//! The personal views read one row of the WHO table: the one for the
//! country of residence and the heatmap year. A missing row is a broken
//! precondition of those views and is reported, never papered over.

use lifespan_types::{AgeBracket, CountryYearRecord, Gender};
use tracing::debug;

use crate::state::{SharedState, StateError};

/// Errors raised while looking up life-table data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LifeTableError {
    /// No row for the country and year.
    #[error("no life-table row for {country} in {year}")]
    MissingRow {
        /// Requested country.
        country: String,
        /// Requested year.
        year: i32,
    },

    /// The row exists but has no life expectancy for the gender.
    #[error("no {gender} life expectancy for {country} in {year}")]
    MissingLifeExpectancy {
        /// Country of the row.
        country: String,
        /// Year of the row.
        year: i32,
        /// Requested gender.
        gender: Gender,
    },

    /// The looked-up value was rejected by the state.
    #[error("life expectancy rejected: {source}")]
    Rejected {
        /// The underlying state error.
        #[from]
        source: StateError,
    },
}

/// One bracket of a row, narrowed to a gender.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketProbability {
    /// Age range.
    pub bracket: AgeBracket,
    /// Probability of death in the range, if the cell was filled.
    pub probability: Option<f64>,
}

/// Find the row for `country` and `year`.
///
/// # Errors
///
/// Returns [`LifeTableError::MissingRow`] when there is none.
pub fn find_row<'a>(
    records: &'a [CountryYearRecord],
    country: &str,
    year: i32,
) -> Result<&'a CountryYearRecord, LifeTableError> {
    records
        .iter()
        .find(|r| r.country == country && r.year == year)
        .ok_or_else(|| LifeTableError::MissingRow {
            country: country.to_owned(),
            year,
        })
}

/// The gender's brackets of `row`, sorted by lower bound.
pub fn sorted_brackets(row: &CountryYearRecord, gender: Gender) -> Vec<BracketProbability> {
    let mut brackets: Vec<BracketProbability> = row
        .brackets_for(gender)
        .map(|b| BracketProbability {
            bracket: b.bracket,
            probability: b.probability,
        })
        .collect();
    brackets.sort_by_key(|b| b.bracket);
    brackets
}

/// Life expectancy at birth for `gender` from `row`.
///
/// # Errors
///
/// Returns [`LifeTableError::MissingLifeExpectancy`] for an empty cell.
pub fn life_expectancy(row: &CountryYearRecord, gender: Gender) -> Result<f64, LifeTableError> {
    row.life_expectancy_for(gender)
        .ok_or_else(|| LifeTableError::MissingLifeExpectancy {
            country: row.country.clone(),
            year: row.year,
            gender,
        })
}

/// Look up the life expectancy for the state's country, heatmap year and
/// gender, and store it in the state.
///
/// Returns the stored value.
///
/// # Errors
///
/// Fails if the row or the value is missing, or the value is not a
/// positive number.
pub fn update_life_expectancy(
    state: &mut SharedState,
    records: &[CountryYearRecord],
) -> Result<f64, LifeTableError> {
    let row = find_row(
        records,
        state.country_of_residence(),
        state.heatmap_data_year(),
    )?;
    let years = life_expectancy(row, state.gender())?;
    state.set_life_expectancy(years)?;
    debug!(
        country = state.country_of_residence(),
        year = state.heatmap_data_year(),
        gender = %state.gender(),
        life_expectancy = years,
        "life expectancy updated"
    );
    Ok(years)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::BTreeMap;

    use lifespan_types::MortalityBracket;

    use super::*;

    fn bracket(gender: Gender, column: &str, probability: f64) -> MortalityBracket {
        let (parsed_gender, bracket) = AgeBracket::parse_column(column).unwrap();
        assert_eq!(parsed_gender, gender);
        MortalityBracket {
            gender,
            bracket,
            column: column.to_owned(),
            probability: Some(probability),
        }
    }

    fn row(country: &str, year: i32, male: f64, female: f64) -> CountryYearRecord {
        CountryYearRecord {
            country: country.to_owned(),
            country_code: "XXX".to_owned(),
            region: "Test".to_owned(),
            year,
            life_expect: Some((male + female) / 2.0),
            life_expectancy_male: Some(male),
            life_expectancy_female: Some(female),
            indicators: BTreeMap::new(),
            mortality: vec![
                bracket(Gender::Male, "male_10_14", 0.003),
                bracket(Gender::Male, "male_0_1", 0.005),
                bracket(Gender::Female, "female_0_1", 0.004),
                bracket(Gender::Male, "male_1_4", 0.001),
            ],
        }
    }

    #[test]
    fn find_row_matches_country_and_year() {
        let records = vec![row("Canada", 2014, 79.0, 83.0), row("Canada", 2015, 80.2, 84.1)];
        let found = find_row(&records, "Canada", 2015).unwrap();
        assert_eq!(found.year, 2015);
    }

    #[test]
    fn missing_row_is_an_error() {
        let records = vec![row("Canada", 2015, 80.2, 84.1)];
        let err = find_row(&records, "Canada", 2016).unwrap_err();
        assert_eq!(
            err,
            LifeTableError::MissingRow {
                country: "Canada".to_owned(),
                year: 2016
            }
        );
    }

    #[test]
    fn brackets_sort_numerically_per_gender() {
        let r = row("Canada", 2015, 80.2, 84.1);
        let sorted = sorted_brackets(&r, Gender::Male);
        let lowers: Vec<u32> = sorted.iter().map(|b| b.bracket.lower).collect();
        assert_eq!(lowers, vec![0, 1, 10]);
        assert_eq!(sorted_brackets(&r, Gender::Female).len(), 1);
    }

    #[test]
    fn update_uses_gender_column() {
        let records = vec![row("Canada", 2015, 80.2, 84.1)];
        let mut state = SharedState::default();
        let years = update_life_expectancy(&mut state, &records).unwrap();
        assert!((years - 80.2).abs() < 1e-9);

        state.set_gender(Gender::Female);
        let years = update_life_expectancy(&mut state, &records).unwrap();
        assert!((years - 84.1).abs() < 1e-9);
        assert!((state.life_expectancy_years() - 84.1).abs() < 1e-9);
    }

    #[test]
    fn empty_life_expectancy_cell_fails() {
        let mut r = row("Canada", 2015, 80.2, 84.1);
        r.life_expectancy_male = None;
        let mut state = SharedState::default();
        let err = update_life_expectancy(&mut state, &[r]).unwrap_err();
        assert!(matches!(err, LifeTableError::MissingLifeExpectancy { .. }));
    }
}
