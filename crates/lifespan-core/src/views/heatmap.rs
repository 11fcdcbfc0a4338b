//! Calendar heatmap of the per-day probability of death.

use lifespan_types::HeatmapModel;
use tracing::debug;

use crate::dataset::Dataset;
use crate::lifetable::{find_row, sorted_brackets};
use crate::mortality::{build_profile, life_summary};
use crate::state::SharedState;
use crate::views::{RenderContext, Rendered, View, ViewError};

/// Personal mortality calendar for the state's person.
#[derive(Debug, Default)]
pub struct HeatmapView {
    rendered: Rendered<HeatmapModel>,
}

impl HeatmapView {
    /// View name.
    pub const NAME: &'static str = "heatmap";

    /// A view that has not refreshed yet.
    pub const fn new() -> Self {
        Self {
            rendered: Rendered::new(),
        }
    }
}

impl View for HeatmapView {
    type Model = HeatmapModel;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn refresh(
        &mut self,
        state: &SharedState,
        data: &Dataset,
        ctx: &RenderContext,
    ) -> Result<(), ViewError> {
        let country = state.country_of_residence();
        let row = find_row(&data.life_table, country, state.heatmap_data_year())?;
        let brackets = sorted_brackets(row, state.gender());
        let life_expectancy = state.life_expectancy_years();

        let profile = build_profile(&brackets, state.dob(), life_expectancy, ctx.now)?;
        let summary = life_summary(state.dob(), life_expectancy, ctx.now)?;

        debug!(
            view = Self::NAME,
            version = state.version(),
            days = profile.calendar.total_days(),
            lifespan_years = profile.lifespan_years,
            "heatmap refreshed"
        );

        let model = HeatmapModel {
            country: country.to_owned(),
            gender: state.gender(),
            dob: state.dob(),
            life_expectancy,
            date_of_death: profile.date_of_death,
            lifespan_years: profile.lifespan_years,
            color_max: profile.calendar.max_probability(),
            calendar: profile.calendar,
            annotations: profile.annotations,
            summary,
        };
        self.rendered.store(model, state.version());
        Ok(())
    }

    fn rendered(&self) -> &Rendered<HeatmapModel> {
        &self.rendered
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lifespan_types::Gender;

    use super::*;
    use crate::fixtures;
    use crate::lifetable::update_life_expectancy;

    fn state() -> SharedState {
        let mut state = SharedState::default();
        update_life_expectancy(&mut state, &fixtures::dataset().life_table).unwrap();
        state
    }

    #[test]
    fn refresh_builds_calendar_for_state() {
        let data = fixtures::dataset();
        let state = state();
        let mut view = HeatmapView::new();
        assert!(view.model().is_none());

        view.refresh(&state, &data, &fixtures::render()).unwrap();
        let model = view.model().unwrap();
        assert_eq!(model.country, "Canada");
        assert_eq!(model.gender, Gender::Male);
        assert!((model.life_expectancy - 80.2).abs() < 1e-9);
        assert_eq!(model.calendar.birth_year, 1998);
        assert!(model.color_max > 0.0);
        assert!(model.calendar.days().any(|d| d.lived));
        assert!(model.calendar.days().any(|d| !d.lived));
        assert_eq!(view.rendered().version(), Some(state.version()));
    }

    #[test]
    fn missing_row_fails_and_keeps_model() {
        let data = fixtures::dataset();
        let mut state = state();
        let mut view = HeatmapView::new();
        view.refresh(&state, &data, &fixtures::render()).unwrap();

        state.set_country_of_residence("Narnia");
        let err = view.refresh(&state, &data, &fixtures::render()).unwrap_err();
        assert!(matches!(err, ViewError::LifeTable { .. }));
        assert_eq!(view.model().unwrap().country, "Canada");
        assert_eq!(view.rendered().refreshes(), 1);
    }
}
