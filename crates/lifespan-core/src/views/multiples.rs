//! Small multiples: one mini scatter per health attribute.
//!
//! Clicking an inactive panel selects its attribute for the main scatter
//! plot.

use lifespan_types::{AttributeKey, DashboardEvent, MultiplePanel, MultiplesModel, PanelPoint};
use tracing::debug;

use crate::dataset::Dataset;
use crate::state::SharedState;
use crate::views::scatter::{attribute_domain, life_expectancy_domain};
use crate::views::{RenderContext, Rendered, View, ViewError};

/// Grid of per-attribute panels.
#[derive(Debug, Default)]
pub struct MultiplesView {
    rendered: Rendered<MultiplesModel>,
}

impl MultiplesView {
    /// View name.
    pub const NAME: &'static str = "multiples";

    /// A view that has not refreshed yet.
    pub const fn new() -> Self {
        Self {
            rendered: Rendered::new(),
        }
    }

    /// Event to publish when the panel for `attribute` is clicked.
    ///
    /// `None` when that panel is already the active one.
    pub fn click_event(&self, attribute: AttributeKey) -> Option<DashboardEvent> {
        let active = self
            .rendered
            .model()
            .and_then(|m| m.panels.iter().find(|p| p.attribute == attribute))
            .is_some_and(|p| p.active);
        (!active).then_some(DashboardEvent::SelectAttribute(attribute))
    }
}

impl View for MultiplesView {
    type Model = MultiplesModel;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn refresh(
        &mut self,
        state: &SharedState,
        data: &Dataset,
        _ctx: &RenderContext,
    ) -> Result<(), ViewError> {
        let year = state.selected_year();
        let x_domain = life_expectancy_domain(&data.life_table);

        let panels = AttributeKey::ALL
            .iter()
            .map(|&attribute| MultiplePanel {
                attribute,
                label: attribute.label().to_owned(),
                active: attribute == state.selected_attribute(),
                points: data
                    .rows_for_year(year)
                    .filter_map(|r| {
                        Some(PanelPoint {
                            country: r.country.clone(),
                            x: r.life_expect?,
                            y: r.indicator(attribute)?,
                        })
                    })
                    .collect(),
                x_domain,
                y_domain: attribute_domain(&data.life_table, attribute),
            })
            .collect();

        debug!(view = Self::NAME, version = state.version(), year, "multiples refreshed");
        self.rendered
            .store(MultiplesModel { year, panels }, state.version());
        Ok(())
    }

    fn rendered(&self) -> &Rendered<MultiplesModel> {
        &self.rendered
    }
}
