//! World map coloured by HDI for the selected year.

use lifespan_types::MapModel;
use tracing::debug;

use crate::dataset::Dataset;
use crate::hdi::map_model;
use crate::state::SharedState;
use crate::views::{RenderContext, Rendered, View, ViewError};

/// Choropleth of the Human Development Index.
#[derive(Debug, Default)]
pub struct MapView {
    rendered: Rendered<MapModel>,
}

impl MapView {
    /// View name.
    pub const NAME: &'static str = "map";

    /// A view that has not refreshed yet.
    pub const fn new() -> Self {
        Self {
            rendered: Rendered::new(),
        }
    }
}

impl View for MapView {
    type Model = MapModel;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn refresh(
        &mut self,
        state: &SharedState,
        data: &Dataset,
        _ctx: &RenderContext,
    ) -> Result<(), ViewError> {
        let model = map_model(
            &data.shapes,
            state.selected_year(),
            state.selected_countries(),
        );
        debug!(
            view = Self::NAME,
            version = state.version(),
            year = model.year,
            countries = model.countries.len(),
            "map refreshed"
        );
        self.rendered.store(model, state.version());
        Ok(())
    }

    fn rendered(&self) -> &Rendered<MapModel> {
        &self.rendered
    }
}
