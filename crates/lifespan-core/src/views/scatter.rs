//! Life expectancy against one health attribute, with a regression overlay.

use lifespan_types::{AttributeKey, CountryYearRecord, ScatterModel, ScatterPoint};
use tracing::debug;

use crate::dataset::Dataset;
use crate::regression::regression_curve;
use crate::state::SharedState;
use crate::views::{RenderContext, Rendered, View, ViewError, extent};

/// Fill opacity of every point when nothing is selected.
pub const IDLE_OPACITY: f64 = 0.3;
/// Fill opacity of selected points.
pub const SELECTED_OPACITY: f64 = 0.65;
/// Fill opacity of points dimmed by a selection elsewhere.
pub const DIMMED_OPACITY: f64 = 0.15;
/// Stroke width of selected points.
pub const SELECTED_STROKE: f64 = 0.8;

/// `[min, max]` life expectancy over the whole table.
pub(crate) fn life_expectancy_domain(records: &[CountryYearRecord]) -> Option<(f64, f64)> {
    extent(records.iter().filter_map(|r| r.life_expect))
}

/// `[0, max]` of an attribute over the whole table.
pub(crate) fn attribute_domain(
    records: &[CountryYearRecord],
    attribute: AttributeKey,
) -> Option<(f64, f64)> {
    extent(records.iter().filter_map(|r| r.indicator(attribute))).map(|(_, hi)| (0.0, hi))
}

/// Main scatter plot.
#[derive(Debug, Default)]
pub struct ScatterView {
    rendered: Rendered<ScatterModel>,
}

impl ScatterView {
    /// View name.
    pub const NAME: &'static str = "scatter";

    /// A view that has not refreshed yet.
    pub const fn new() -> Self {
        Self {
            rendered: Rendered::new(),
        }
    }
}

fn point(record: &CountryYearRecord, x: f64, y: f64, state: &SharedState) -> ScatterPoint {
    let (highlighted, fill_opacity, stroke_width) = if state.selected_countries().is_empty() {
        (true, IDLE_OPACITY, 0.0)
    } else if state.is_selected(&record.country) {
        (true, SELECTED_OPACITY, SELECTED_STROKE)
    } else {
        (false, DIMMED_OPACITY, 0.0)
    };
    ScatterPoint {
        country: record.country.clone(),
        x,
        y,
        highlighted,
        fill_opacity,
        stroke_width,
    }
}

impl View for ScatterView {
    type Model = ScatterModel;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn refresh(
        &mut self,
        state: &SharedState,
        data: &Dataset,
        ctx: &RenderContext,
    ) -> Result<(), ViewError> {
        let year = state.selected_year();
        let attribute = state.selected_attribute();

        let curve = regression_curve(
            &data.life_table,
            &data.bandwidths,
            year,
            attribute,
            ctx.curve_samples,
        )?;

        let points: Vec<ScatterPoint> = data
            .rows_for_year(year)
            .filter_map(|r| Some(point(r, r.life_expect?, r.indicator(attribute)?, state)))
            .collect();

        let curve_opacity = if !state.regression_enabled() {
            0.0
        } else if state.selected_countries().is_empty() {
            0.5
        } else {
            0.7
        };

        debug!(
            view = Self::NAME,
            version = state.version(),
            year,
            %attribute,
            points = points.len(),
            "scatter refreshed"
        );

        let model = ScatterModel {
            attribute,
            label: attribute.label().to_owned(),
            year,
            points,
            x_domain: life_expectancy_domain(&data.life_table),
            y_domain: attribute_domain(&data.life_table, attribute),
            curve,
            curve_opacity,
        };
        self.rendered.store(model, state.version());
        Ok(())
    }

    fn rendered(&self) -> &Rendered<ScatterModel> {
        &self.rendered
    }
}
