//! The shared dashboard state.
//!
//! [`SharedState`] is the one record every view reads. It is passed
//! explicitly to handlers and transforms; nothing holds it globally. Each
//! setter bumps [`SharedState::version`] when the value actually changes, so
//! a view can tell whether it is looking at the state it last derived from.
//!
//! Mutation happens only inside dispatcher handlers, one at a time, so a
//! handler always sees everything earlier handlers wrote.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use lifespan_types::{AttributeKey, Gender, StageChange, ViewStage};
use serde::{Deserialize, Serialize};

use crate::config::DefaultsConfig;

/// Errors raised by state mutations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateError {
    /// A stage index outside 0..=2.
    #[error("view stage {index} out of range (max {max})", max = ViewStage::MAX_INDEX)]
    StageOutOfRange {
        /// The rejected index.
        index: u8,
    },

    /// A life expectancy that is not a positive finite number.
    #[error("invalid life expectancy: {value}")]
    InvalidLifeExpectancy {
        /// The rejected value.
        value: f64,
    },
}

/// Current selections across every view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedState {
    /// Incremented on every effective mutation.
    version: u64,
    /// Year for the map and the scatter plots.
    selected_year: i32,
    /// Attribute of the main scatter plot.
    selected_attribute: AttributeKey,
    /// Countries selected on the map or the scatter plot.
    selected_countries: BTreeSet<String>,
    /// Date of birth.
    dob: NaiveDate,
    /// Gender.
    gender: Gender,
    /// Country of residence.
    country_of_residence: String,
    /// Life-table year for the personal views.
    heatmap_data_year: i32,
    /// Life expectancy looked up for gender, country, and heatmap year.
    life_expectancy_years: f64,
    /// Regression overlay visibility.
    regression_enabled: bool,
    /// Week-grid stage.
    view_stage: ViewStage,
}

impl SharedState {
    /// Initial state from configured defaults.
    ///
    /// Life expectancy starts at zero; the dashboard looks it up right
    /// after construction.
    pub fn from_defaults(defaults: &DefaultsConfig) -> Self {
        Self {
            version: 0,
            selected_year: defaults.selected_year,
            selected_attribute: defaults.attribute,
            selected_countries: BTreeSet::new(),
            dob: defaults.dob,
            gender: defaults.gender,
            country_of_residence: defaults.country.clone(),
            heatmap_data_year: defaults.heatmap_year,
            life_expectancy_years: 0.0,
            regression_enabled: defaults.regression_enabled,
            view_stage: ViewStage::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Mutation counter.
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Year for the map and the scatter plots.
    pub const fn selected_year(&self) -> i32 {
        self.selected_year
    }

    /// Attribute of the main scatter plot.
    pub const fn selected_attribute(&self) -> AttributeKey {
        self.selected_attribute
    }

    /// Countries currently selected.
    pub const fn selected_countries(&self) -> &BTreeSet<String> {
        &self.selected_countries
    }

    /// Whether `country` is part of the selection.
    pub fn is_selected(&self, country: &str) -> bool {
        self.selected_countries.contains(country)
    }

    /// Date of birth.
    pub const fn dob(&self) -> NaiveDate {
        self.dob
    }

    /// Gender.
    pub const fn gender(&self) -> Gender {
        self.gender
    }

    /// Country of residence.
    pub fn country_of_residence(&self) -> &str {
        &self.country_of_residence
    }

    /// Life-table year for the personal views.
    pub const fn heatmap_data_year(&self) -> i32 {
        self.heatmap_data_year
    }

    /// Current life expectancy in years.
    pub const fn life_expectancy_years(&self) -> f64 {
        self.life_expectancy_years
    }

    /// Regression overlay visibility.
    pub const fn regression_enabled(&self) -> bool {
        self.regression_enabled
    }

    /// Week-grid stage.
    pub const fn view_stage(&self) -> ViewStage {
        self.view_stage
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    const fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Set the date of birth.
    pub fn set_dob(&mut self, dob: NaiveDate) {
        if self.dob != dob {
            self.dob = dob;
            self.bump();
        }
    }

    /// Set the gender.
    pub fn set_gender(&mut self, gender: Gender) {
        if self.gender != gender {
            self.gender = gender;
            self.bump();
        }
    }

    /// Set the country of residence.
    pub fn set_country_of_residence(&mut self, country: &str) {
        if self.country_of_residence != country {
            country.clone_into(&mut self.country_of_residence);
            self.bump();
        }
    }

    /// Set the year for the map and the scatter plots.
    pub fn set_selected_year(&mut self, year: i32) {
        if self.selected_year != year {
            self.selected_year = year;
            self.bump();
        }
    }

    /// Set the attribute of the main scatter plot.
    pub fn set_selected_attribute(&mut self, attribute: AttributeKey) {
        if self.selected_attribute != attribute {
            self.selected_attribute = attribute;
            self.bump();
        }
    }

    /// Add `country` to the selection, or remove it if already present.
    ///
    /// Returns whether the country is selected afterwards.
    pub fn toggle_country(&mut self, country: &str) -> bool {
        let selected = if self.selected_countries.remove(country) {
            false
        } else {
            self.selected_countries.insert(country.to_owned());
            true
        };
        self.bump();
        selected
    }

    /// Drop the whole selection.
    pub fn clear_countries(&mut self) {
        if !self.selected_countries.is_empty() {
            self.selected_countries.clear();
            self.bump();
        }
    }

    /// Show or hide the regression overlay.
    pub fn set_regression_enabled(&mut self, enabled: bool) {
        if self.regression_enabled != enabled {
            self.regression_enabled = enabled;
            self.bump();
        }
    }

    /// Jump to a week-grid stage by index.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::StageOutOfRange`] for an index above 2.
    pub fn set_view_stage(&mut self, index: u8) -> Result<(), StateError> {
        let stage = ViewStage::from_index(index).ok_or(StateError::StageOutOfRange { index })?;
        self.apply_stage(stage);
        Ok(())
    }

    /// Apply a previous/next/set request; steps saturate at the ends.
    pub fn change_view_stage(&mut self, change: StageChange) {
        let stage = match change {
            StageChange::Set(stage) => stage,
            StageChange::Previous => self.view_stage.previous(),
            StageChange::Next => self.view_stage.next(),
        };
        self.apply_stage(stage);
    }

    fn apply_stage(&mut self, stage: ViewStage) {
        if self.view_stage != stage {
            self.view_stage = stage;
            self.bump();
        }
    }

    /// Store a freshly looked-up life expectancy.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidLifeExpectancy`] unless `years` is
    /// finite and positive.
    pub fn set_life_expectancy(&mut self, years: f64) -> Result<(), StateError> {
        if !years.is_finite() || years <= 0.0 {
            return Err(StateError::InvalidLifeExpectancy { value: years });
        }
        if (self.life_expectancy_years - years).abs() > f64::EPSILON {
            self.life_expectancy_years = years;
            self.bump();
        }
        Ok(())
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::from_defaults(&DefaultsConfig::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_load() {
        let state = SharedState::default();
        assert_eq!(state.version(), 0);
        assert_eq!(state.dob(), NaiveDate::from_ymd_opt(1998, 1, 1).unwrap());
        assert_eq!(state.gender(), Gender::Male);
        assert_eq!(state.country_of_residence(), "Canada");
        assert_eq!(state.heatmap_data_year(), 2015);
        assert_eq!(state.selected_year(), 2000);
        assert!(state.selected_countries().is_empty());
        assert!(state.regression_enabled());
        assert_eq!(state.view_stage(), ViewStage::LifeInWeeks);
    }

    #[test]
    fn unchanged_value_keeps_version() {
        let mut state = SharedState::default();
        state.set_gender(Gender::Male);
        state.set_selected_year(2000);
        state.clear_countries();
        assert_eq!(state.version(), 0);

        state.set_gender(Gender::Female);
        assert_eq!(state.version(), 1);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut state = SharedState::default();
        assert!(state.toggle_country("Peru"));
        assert!(state.is_selected("Peru"));
        assert!(!state.toggle_country("Peru"));
        assert!(!state.is_selected("Peru"));
        assert_eq!(state.version(), 2);
    }

    #[test]
    fn stage_index_is_validated() {
        let mut state = SharedState::default();
        assert_eq!(
            state.set_view_stage(3),
            Err(StateError::StageOutOfRange { index: 3 })
        );
        assert!(state.set_view_stage(2).is_ok());
        assert_eq!(state.view_stage(), ViewStage::GamesRegrouped);
    }

    #[test]
    fn stage_steps_saturate() {
        let mut state = SharedState::default();
        state.change_view_stage(StageChange::Previous);
        assert_eq!(state.view_stage(), ViewStage::LifeInWeeks);
        assert_eq!(state.version(), 0);
        state.change_view_stage(StageChange::Next);
        state.change_view_stage(StageChange::Next);
        state.change_view_stage(StageChange::Next);
        assert_eq!(state.view_stage(), ViewStage::GamesRegrouped);
        assert_eq!(state.version(), 2);
    }

    #[test]
    fn life_expectancy_must_be_positive() {
        let mut state = SharedState::default();
        assert!(state.set_life_expectancy(0.0).is_err());
        assert!(state.set_life_expectancy(f64::NAN).is_err());
        assert!(state.set_life_expectancy(81.9).is_ok());
        assert!((state.life_expectancy_years() - 81.9).abs() < 1e-9);
    }
}
