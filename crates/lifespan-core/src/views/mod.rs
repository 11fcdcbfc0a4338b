//! View controllers.
//!
//! Each view turns the shared state and the dataset into a serialisable
//! model for the browser to draw. Views never talk to each other; the
//! dispatcher decides which of them refresh on which event.
//!
//! A refresh always re-derives the whole model. Each view records the state
//! version it derived from, so a stale model is easy to spot.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::lifetable::LifeTableError;
use crate::mortality::MortalityError;
use crate::regression::RegressionError;
use crate::state::SharedState;
use crate::weeks::WeekGridError;

pub mod heatmap;
pub mod map;
pub mod multiples;
pub mod scatter;
pub mod week_grid;

pub use heatmap::HeatmapView;
pub use map::MapView;
pub use multiples::MultiplesView;
pub use scatter::ScatterView;
pub use week_grid::WeekGridView;

/// Errors raised while refreshing a view.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewError {
    /// Life-table lookup failed.
    #[error("life table: {source}")]
    LifeTable {
        /// The underlying error.
        #[from]
        source: LifeTableError,
    },

    /// The mortality calendar could not be built.
    #[error("mortality calendar: {source}")]
    Mortality {
        /// The underlying error.
        #[from]
        source: MortalityError,
    },

    /// The regression overlay could not be fitted.
    #[error("regression: {source}")]
    Regression {
        /// The underlying error.
        #[from]
        source: RegressionError,
    },

    /// The week grid could not be built.
    #[error("week grid: {source}")]
    WeekGrid {
        /// The underlying error.
        #[from]
        source: WeekGridError,
    },
}

/// Per-refresh inputs that are not part of the shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    /// The instant treated as "today".
    pub now: NaiveDateTime,
    /// Samples per polynomial curve.
    pub curve_samples: usize,
}

/// A view controller.
pub trait View {
    /// What the browser draws.
    type Model: Serialize;

    /// Stable name, used in logs and snapshots.
    fn name(&self) -> &'static str;

    /// Re-derive the model from the current state.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] when the inputs break a data precondition. The
    /// previous model is kept in that case.
    fn refresh(
        &mut self,
        state: &SharedState,
        data: &Dataset,
        ctx: &RenderContext,
    ) -> Result<(), ViewError>;

    /// Bookkeeping of past refreshes.
    fn rendered(&self) -> &Rendered<Self::Model>;

    /// The latest model, if the view has refreshed at least once.
    fn model(&self) -> Option<&Self::Model> {
        self.rendered().model()
    }
}

/// Latest model of a view plus refresh bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered<M> {
    model: Option<M>,
    version: Option<u64>,
    refreshes: u64,
}

impl<M> Rendered<M> {
    /// Nothing rendered yet.
    pub const fn new() -> Self {
        Self {
            model: None,
            version: None,
            refreshes: 0,
        }
    }

    /// Replace the model with one derived from state `version`.
    pub fn store(&mut self, model: M, version: u64) {
        self.model = Some(model);
        self.version = Some(version);
        self.refreshes = self.refreshes.wrapping_add(1);
    }

    /// The latest model.
    pub const fn model(&self) -> Option<&M> {
        self.model.as_ref()
    }

    /// State version of the latest model.
    pub const fn version(&self) -> Option<u64> {
        self.version
    }

    /// Number of successful refreshes.
    pub const fn refreshes(&self) -> u64 {
        self.refreshes
    }
}

impl<M> Default for Rendered<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// `[min, max]` of a sequence, `None` when it is empty.
pub(crate) fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
