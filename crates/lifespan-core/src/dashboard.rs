//! Dashboard wiring: state, data, views, and the handlers that connect them.
//!
//! Every interaction is a [`DashboardEvent`] handed to
//! [`Dashboard::publish`]. For each event name one state-mutation handler is
//! registered first, followed by a refresh handler for every view that
//! depends on what changed:
//!
//! | Event | Mutation | Views refreshed |
//! |---|---|---|
//! | `changeDob` | dob | heatmap, weeks |
//! | `changeGender` | gender, life expectancy | heatmap, weeks |
//! | `changeCountry` | country, life expectancy | heatmap, weeks |
//! | `dataSelection` | toggle first country | map, scatter |
//! | `mapSelection` | toggle first country | map, scatter |
//! | `selectAttribute` | attribute | scatter, multiples |
//! | `clearData` | clear countries | map, scatter |
//! | `changeYear` | selected year | map, scatter, multiples |
//! | `toggleRegression` | regression flag | scatter |
//! | `changeViewStage` | stage | weeks |

use chrono::Utc;
use lifespan_types::{
    AttributeKey, DashboardEvent, EventName, HeatmapModel, MapModel, MultiplesModel,
    ScatterModel, WeekGridModel,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::DashboardConfig;
use crate::dataset::Dataset;
use crate::dispatch::Dispatcher;
use crate::lifetable::{LifeTableError, update_life_expectancy};
use crate::regression::select_method;
use crate::state::{SharedState, StateError};
use crate::views::{
    HeatmapView, MapView, MultiplesView, RenderContext, ScatterView, View, ViewError,
    WeekGridView,
};

/// Errors raised by dashboard handlers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    /// A state mutation was rejected.
    #[error("state error: {source}")]
    State {
        /// The underlying error.
        #[from]
        source: StateError,
    },

    /// The life table has no usable row for the new selection.
    #[error("life table error: {source}")]
    LifeTable {
        /// The underlying error.
        #[from]
        source: LifeTableError,
    },

    /// A view failed to refresh.
    #[error("{view} view failed: {source}")]
    View {
        /// Name of the failing view.
        view: &'static str,
        /// The underlying error.
        source: ViewError,
    },

    /// A handler received an event other than the one it subscribed to.
    #[error("handler for {expected} received {received}")]
    UnexpectedEvent {
        /// Event the handler subscribed to.
        expected: EventName,
        /// Event it got.
        received: EventName,
    },
}

/// All view controllers.
#[derive(Debug, Default)]
pub struct Views {
    /// Mortality calendar.
    pub heatmap: HeatmapView,
    /// Main scatter plot.
    pub scatter: ScatterView,
    /// Small multiples.
    pub multiples: MultiplesView,
    /// HDI world map.
    pub map: MapView,
    /// Life in weeks.
    pub weeks: WeekGridView,
}

impl Views {
    /// Names of every view, in refresh order at startup.
    pub const NAMES: [&'static str; 5] = [
        HeatmapView::NAME,
        ScatterView::NAME,
        MultiplesView::NAME,
        MapView::NAME,
        WeekGridView::NAME,
    ];
}

/// What handlers operate on.
#[derive(Debug)]
pub struct Session {
    /// The shared selections.
    pub state: SharedState,
    /// Loaded tables.
    pub data: Dataset,
    /// Per-refresh inputs.
    pub render: RenderContext,
    /// View controllers.
    pub views: Views,
}

/// Serialisable picture of the whole dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Current selections.
    pub state: SharedState,
    /// Mortality calendar model.
    pub heatmap: Option<HeatmapModel>,
    /// Scatter plot model.
    pub scatter: Option<ScatterModel>,
    /// Small multiples model.
    pub multiples: Option<MultiplesModel>,
    /// Map model.
    pub map: Option<MapModel>,
    /// Week grid model.
    pub weeks: Option<WeekGridModel>,
}

type Handler = fn(&mut Session, &DashboardEvent) -> Result<(), DashboardError>;

/// The running dashboard.
#[derive(Debug)]
pub struct Dashboard {
    session: Session,
    dispatcher: Dispatcher<Session, DashboardError>,
}

impl Dashboard {
    /// Build the dashboard from loaded data and configuration.
    ///
    /// Looks up the default life expectancy, registers every handler, and
    /// refreshes every view once.
    ///
    /// # Errors
    ///
    /// Fails when the default selection has no life-table row or a view
    /// cannot render from the defaults.
    pub fn new(data: Dataset, config: &DashboardConfig) -> Result<Self, DashboardError> {
        let render = RenderContext {
            now: config.render.now.unwrap_or_else(|| Utc::now().naive_utc()),
            curve_samples: config.render.curve_samples,
        };
        let mut state = SharedState::from_defaults(&config.defaults);
        let life_expectancy = update_life_expectancy(&mut state, &data.life_table)?;

        info!(
            rows = data.life_table.len(),
            games = data.games.len(),
            shapes = data.shapes.len(),
            country = state.country_of_residence(),
            life_expectancy,
            "dashboard starting"
        );

        let mut dashboard = Self {
            session: Session {
                state,
                data,
                render,
                views: Views::default(),
            },
            dispatcher: Dispatcher::new(),
        };
        dashboard.register_handlers();
        dashboard.refresh_all()?;
        Ok(dashboard)
    }

    fn register_handlers(&mut self) {
        let table: [(EventName, Handler, &[Handler]); 10] = [
            (EventName::ChangeDob, change_dob, &[refresh_heatmap, refresh_weeks]),
            (EventName::ChangeGender, change_gender, &[refresh_heatmap, refresh_weeks]),
            (EventName::ChangeCountry, change_country, &[refresh_heatmap, refresh_weeks]),
            (EventName::DataSelection, data_selection, &[refresh_map, refresh_scatter]),
            (EventName::MapSelection, map_selection, &[refresh_map, refresh_scatter]),
            (
                EventName::SelectAttribute,
                select_attribute,
                &[refresh_scatter, refresh_multiples],
            ),
            (EventName::ClearData, clear_data, &[refresh_map, refresh_scatter]),
            (
                EventName::ChangeYear,
                change_year,
                &[refresh_map, refresh_scatter, refresh_multiples],
            ),
            (EventName::ToggleRegression, toggle_regression, &[refresh_scatter]),
            (EventName::ChangeViewStage, change_view_stage, &[refresh_weeks]),
        ];

        for (event, mutate, refreshes) in table {
            self.dispatcher.subscribe(event, mutate);
            for refresh in refreshes {
                self.dispatcher.subscribe(event, *refresh);
            }
        }
    }

    fn refresh_all(&mut self) -> Result<(), DashboardError> {
        let s = &mut self.session;
        refresh(&mut s.views.heatmap, &s.state, &s.data, &s.render)?;
        refresh(&mut s.views.scatter, &s.state, &s.data, &s.render)?;
        refresh(&mut s.views.multiples, &s.state, &s.data, &s.render)?;
        refresh(&mut s.views.map, &s.state, &s.data, &s.render)?;
        refresh(&mut s.views.weeks, &s.state, &s.data, &s.render)?;
        Ok(())
    }

    /// Dispatch one interaction.
    ///
    /// Returns how many handlers ran.
    ///
    /// # Errors
    ///
    /// Returns the first handler error. Handlers after it do not run, so
    /// views later in the list keep their previous model.
    pub fn publish(&mut self, event: &DashboardEvent) -> Result<usize, DashboardError> {
        debug!(event = %event.name(), version = self.session.state.version(), "publish");
        self.dispatcher.publish(&mut self.session, event)
    }

    /// Click on the small multiple for `attribute`.
    ///
    /// Publishes `selectAttribute` unless that panel is already active.
    /// Returns how many handlers ran.
    ///
    /// # Errors
    ///
    /// See [`Dashboard::publish`].
    pub fn click_multiple(&mut self, attribute: AttributeKey) -> Result<usize, DashboardError> {
        match self.session.views.multiples.click_event(attribute) {
            Some(event) => self.publish(&event),
            None => Ok(0),
        }
    }

    /// Current selections.
    pub const fn state(&self) -> &SharedState {
        &self.session.state
    }

    /// Loaded tables.
    pub const fn data(&self) -> &Dataset {
        &self.session.data
    }

    /// View controllers.
    pub const fn views(&self) -> &Views {
        &self.session.views
    }

    /// Names of every view.
    pub const fn view_names(&self) -> [&'static str; 5] {
        Views::NAMES
    }

    /// Number of handlers registered for `event`.
    pub fn handler_count(&self, event: EventName) -> usize {
        self.dispatcher.handler_count(event)
    }

    /// Every view model plus the state.
    pub fn snapshot(&self) -> DashboardSnapshot {
        let views = &self.session.views;
        DashboardSnapshot {
            state: self.session.state.clone(),
            heatmap: views.heatmap.model().cloned(),
            scatter: views.scatter.model().cloned(),
            multiples: views.multiples.model().cloned(),
            map: views.map.model().cloned(),
            weeks: views.weeks.model().cloned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Mutation handlers
// ---------------------------------------------------------------------------

const fn unexpected(expected: EventName, event: &DashboardEvent) -> DashboardError {
    DashboardError::UnexpectedEvent {
        expected,
        received: event.name(),
    }
}

/// Apply a change that affects the life expectancy, restoring the previous
/// state if the new selection has no life-table row.
fn change_person(
    s: &mut Session,
    mutate: impl FnOnce(&mut SharedState),
) -> Result<(), DashboardError> {
    let previous = s.state.clone();
    mutate(&mut s.state);
    if let Err(err) = update_life_expectancy(&mut s.state, &s.data.life_table) {
        s.state = previous;
        return Err(err.into());
    }
    Ok(())
}

/// Reject `attribute` in `year` when the scatter overlay has no fitting
/// method for it. Runs before the state is touched.
fn check_regression(
    s: &Session,
    attribute: AttributeKey,
    year: i32,
) -> Result<(), DashboardError> {
    select_method(attribute, year, &s.data.bandwidths)
        .map(|_| ())
        .map_err(|source| DashboardError::View {
            view: ScatterView::NAME,
            source: source.into(),
        })
}

fn change_dob(s: &mut Session, event: &DashboardEvent) -> Result<(), DashboardError> {
    let DashboardEvent::ChangeDob(dob) = event else {
        return Err(unexpected(EventName::ChangeDob, event));
    };
    s.state.set_dob(*dob);
    Ok(())
}

fn change_gender(s: &mut Session, event: &DashboardEvent) -> Result<(), DashboardError> {
    let DashboardEvent::ChangeGender(gender) = event else {
        return Err(unexpected(EventName::ChangeGender, event));
    };
    change_person(s, |state| state.set_gender(*gender))
}

fn change_country(s: &mut Session, event: &DashboardEvent) -> Result<(), DashboardError> {
    let DashboardEvent::ChangeCountry(country) = event else {
        return Err(unexpected(EventName::ChangeCountry, event));
    };
    change_person(s, |state| state.set_country_of_residence(country))
}

fn data_selection(s: &mut Session, event: &DashboardEvent) -> Result<(), DashboardError> {
    let DashboardEvent::DataSelection(active) = event else {
        return Err(unexpected(EventName::DataSelection, event));
    };
    toggle_first(s, active);
    Ok(())
}

fn map_selection(s: &mut Session, event: &DashboardEvent) -> Result<(), DashboardError> {
    let DashboardEvent::MapSelection(active) = event else {
        return Err(unexpected(EventName::MapSelection, event));
    };
    toggle_first(s, active);
    Ok(())
}

/// Toggle the first active country; an empty list changes nothing.
fn toggle_first(s: &mut Session, active: &[String]) {
    if let Some(first) = active.first() {
        let selected = s.state.toggle_country(first);
        debug!(country = %first, selected, "country toggled");
    }
}

fn select_attribute(s: &mut Session, event: &DashboardEvent) -> Result<(), DashboardError> {
    let DashboardEvent::SelectAttribute(attribute) = event else {
        return Err(unexpected(EventName::SelectAttribute, event));
    };
    check_regression(s, *attribute, s.state.selected_year())?;
    s.state.set_selected_attribute(*attribute);
    Ok(())
}

fn clear_data(s: &mut Session, event: &DashboardEvent) -> Result<(), DashboardError> {
    if !matches!(event, DashboardEvent::ClearData) {
        return Err(unexpected(EventName::ClearData, event));
    }
    s.state.clear_countries();
    Ok(())
}

fn change_year(s: &mut Session, event: &DashboardEvent) -> Result<(), DashboardError> {
    let DashboardEvent::ChangeYear(year) = event else {
        return Err(unexpected(EventName::ChangeYear, event));
    };
    check_regression(s, s.state.selected_attribute(), *year)?;
    s.state.set_selected_year(*year);
    Ok(())
}

fn toggle_regression(s: &mut Session, event: &DashboardEvent) -> Result<(), DashboardError> {
    let DashboardEvent::ToggleRegression(enabled) = event else {
        return Err(unexpected(EventName::ToggleRegression, event));
    };
    s.state.set_regression_enabled(*enabled);
    Ok(())
}

fn change_view_stage(s: &mut Session, event: &DashboardEvent) -> Result<(), DashboardError> {
    let DashboardEvent::ChangeViewStage(change) = event else {
        return Err(unexpected(EventName::ChangeViewStage, event));
    };
    s.state.change_view_stage(*change);
    Ok(())
}

// ---------------------------------------------------------------------------
// Refresh handlers
// ---------------------------------------------------------------------------

fn refresh<V: View>(
    view: &mut V,
    state: &SharedState,
    data: &Dataset,
    render: &RenderContext,
) -> Result<(), DashboardError> {
    debug!(view = view.name(), version = state.version(), "refreshing view");
    view.refresh(state, data, render)
        .map_err(|source| DashboardError::View {
            view: view.name(),
            source,
        })
}

fn refresh_heatmap(s: &mut Session, _event: &DashboardEvent) -> Result<(), DashboardError> {
    refresh(&mut s.views.heatmap, &s.state, &s.data, &s.render)
}

fn refresh_scatter(s: &mut Session, _event: &DashboardEvent) -> Result<(), DashboardError> {
    refresh(&mut s.views.scatter, &s.state, &s.data, &s.render)
}

fn refresh_multiples(s: &mut Session, _event: &DashboardEvent) -> Result<(), DashboardError> {
    refresh(&mut s.views.multiples, &s.state, &s.data, &s.render)
}

fn refresh_map(s: &mut Session, _event: &DashboardEvent) -> Result<(), DashboardError> {
    refresh(&mut s.views.map, &s.state, &s.data, &s.render)
}

fn refresh_weeks(s: &mut Session, _event: &DashboardEvent) -> Result<(), DashboardError> {
    refresh(&mut s.views.weeks, &s.state, &s.data, &s.render)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lifespan_types::{Gender, StageChange, ViewStage};

    use super::*;
    use crate::fixtures;

    fn dashboard() -> Dashboard {
        let mut config = DashboardConfig::default();
        config.render.now = Some(fixtures::now());
        Dashboard::new(fixtures::dataset(), &config).unwrap()
    }

    fn refreshes(d: &Dashboard) -> [u64; 5] {
        let v = d.views();
        [
            v.heatmap.rendered().refreshes(),
            v.scatter.rendered().refreshes(),
            v.multiples.rendered().refreshes(),
            v.map.rendered().refreshes(),
            v.weeks.rendered().refreshes(),
        ]
    }

    #[test]
    fn startup_renders_every_view() {
        let d = dashboard();
        assert_eq!(refreshes(&d), [1; 5]);
        let snapshot = d.snapshot();
        assert!(snapshot.heatmap.is_some());
        assert!(snapshot.weeks.is_some());
        assert_eq!(d.view_names().len(), 5);
    }

    #[test]
    fn every_event_has_handlers() {
        let d = dashboard();
        for event in EventName::ALL {
            assert!(d.handler_count(event) >= 2, "{event}");
        }
        assert_eq!(d.handler_count(EventName::ChangeYear), 4);
        assert_eq!(d.handler_count(EventName::ToggleRegression), 2);
    }

    #[test]
    fn year_change_skips_personal_views() {
        let mut d = dashboard();
        let ran = d.publish(&DashboardEvent::ChangeYear(2005)).unwrap();
        assert_eq!(ran, 4);
        assert_eq!(refreshes(&d), [1, 2, 2, 2, 1]);
        assert_eq!(d.snapshot().map.unwrap().year, 2005);
    }

    #[test]
    fn selection_toggles_first_entry_only() {
        let mut d = dashboard();
        d.publish(&DashboardEvent::MapSelection(vec![
            "Peru".to_owned(),
            "Chad".to_owned(),
        ]))
        .unwrap();
        assert!(d.state().is_selected("Peru"));
        assert!(!d.state().is_selected("Chad"));

        d.publish(&DashboardEvent::DataSelection(vec!["Peru".to_owned()]))
            .unwrap();
        assert!(d.state().selected_countries().is_empty());

        let before = d.state().version();
        d.publish(&DashboardEvent::DataSelection(Vec::new())).unwrap();
        assert_eq!(d.state().version(), before);
    }

    #[test]
    fn unknown_country_is_rolled_back() {
        let mut d = dashboard();
        let before = d.state().clone();
        let err = d
            .publish(&DashboardEvent::ChangeCountry("Narnia".to_owned()))
            .unwrap_err();
        assert!(matches!(err, DashboardError::LifeTable { .. }));
        assert_eq!(d.state(), &before);
        assert_eq!(refreshes(&d), [1; 5]);
    }

    #[test]
    fn gender_change_updates_life_expectancy() {
        let mut d = dashboard();
        d.publish(&DashboardEvent::ChangeGender(Gender::Female))
            .unwrap();
        assert!((d.state().life_expectancy_years() - 84.1).abs() < 1e-9);
        let heatmap = d.snapshot().heatmap.unwrap();
        assert_eq!(heatmap.gender, Gender::Female);
    }

    #[test]
    fn stage_and_regression_go_through_dispatch() {
        let mut d = dashboard();
        d.publish(&DashboardEvent::ChangeViewStage(StageChange::Next))
            .unwrap();
        assert_eq!(d.state().view_stage(), ViewStage::GamesOverlay);
        assert_eq!(d.snapshot().weeks.unwrap().stage, ViewStage::GamesOverlay);

        d.publish(&DashboardEvent::ToggleRegression(false)).unwrap();
        assert!(d.snapshot().scatter.unwrap().curve_opacity.abs() < 1e-12);
    }

    #[test]
    fn year_without_bandwidth_is_rejected_whole() {
        let mut d = dashboard();
        let before = d.state().clone();
        let err = d.publish(&DashboardEvent::ChangeYear(2030)).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::View {
                view: ScatterView::NAME,
                source: ViewError::Regression { .. }
            }
        ));
        assert_eq!(d.state(), &before);
        assert_eq!(refreshes(&d), [1; 5]);

        let snapshot = d.snapshot();
        assert_eq!(snapshot.map.unwrap().year, 2000);
        assert_eq!(snapshot.scatter.unwrap().year, 2000);
        assert_eq!(snapshot.multiples.unwrap().year, 2000);

        // Later events still apply cleanly.
        d.publish(&DashboardEvent::MapSelection(vec!["Peru".to_owned()]))
            .unwrap();
        assert!(d.state().is_selected("Peru"));
        let scatter = d.snapshot().scatter.unwrap();
        assert!(scatter.points.iter().any(|p| p.highlighted));
    }

    #[test]
    fn attribute_without_bandwidth_is_rejected_whole() {
        let mut data = fixtures::dataset();
        data.bandwidths
            .rows
            .first_mut()
            .unwrap()
            .remove(&AttributeKey::Alcohol);
        let mut config = DashboardConfig::default();
        config.render.now = Some(fixtures::now());
        let mut d = Dashboard::new(data, &config).unwrap();

        let before = d.state().clone();
        assert!(d.click_multiple(AttributeKey::Alcohol).is_err());
        assert_eq!(d.state(), &before);
        assert_eq!(d.state().selected_attribute(), AttributeKey::Bmi);
        assert_eq!(refreshes(&d), [1; 5]);
        let multiples = d.snapshot().multiples.unwrap();
        let active: Vec<AttributeKey> = multiples
            .panels
            .iter()
            .filter(|p| p.active)
            .map(|p| p.attribute)
            .collect();
        assert_eq!(active, vec![AttributeKey::Bmi]);
    }

    #[test]
    fn selection_handlers_name_their_own_event() {
        let mut d = dashboard();
        let err = map_selection(&mut d.session, &DashboardEvent::DataSelection(Vec::new()))
            .unwrap_err();
        assert_eq!(
            err,
            DashboardError::UnexpectedEvent {
                expected: EventName::MapSelection,
                received: EventName::DataSelection,
            }
        );
        let err = data_selection(&mut d.session, &DashboardEvent::ClearData).unwrap_err();
        assert_eq!(
            err,
            DashboardError::UnexpectedEvent {
                expected: EventName::DataSelection,
                received: EventName::ClearData,
            }
        );
    }

    #[test]
    fn clicking_multiples_selects_attribute_once() {
        let mut d = dashboard();
        assert_eq!(d.click_multiple(AttributeKey::Bmi).unwrap(), 0);
        assert_eq!(d.click_multiple(AttributeKey::Alcohol).unwrap(), 3);
        assert_eq!(d.state().selected_attribute(), AttributeKey::Alcohol);
        assert_eq!(d.click_multiple(AttributeKey::Alcohol).unwrap(), 0);
    }
}
