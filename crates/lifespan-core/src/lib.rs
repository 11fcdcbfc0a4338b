//! Shared state, event dispatch, and derived-data transforms for the
//! lifespan dashboard.
//!
//! The browser views are thin: every number they draw is derived here from
//! the [`SharedState`] and the loaded [`Dataset`]. Interactions arrive as
//! events, run through the [`Dispatcher`], and refresh the affected views.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `lifespan-config.yaml`.
//! - [`state`] -- The versioned shared state.
//! - [`dispatch`] -- Named-event publish/subscribe.
//! - [`dataset`] -- The loaded input tables.
//! - [`lifetable`] -- Life-table row lookups and life expectancy updates.
//! - [`mortality`] -- Per-day mortality calendar and annotations.
//! - [`regression`] -- Polynomial and LOESS curves for the scatter overlay.
//! - [`weeks`] -- Week grid with Olympic Games occupancy.
//! - [`hdi`] -- HDI colour scale for the world map.
//! - [`views`] -- [`View`] trait and the five view controllers.
//! - [`dashboard`] -- [`Dashboard`], which wires everything together.
//!
//! [`SharedState`]: state::SharedState
//! [`Dataset`]: dataset::Dataset
//! [`Dispatcher`]: dispatch::Dispatcher
//! [`View`]: views::View
//! [`Dashboard`]: dashboard::Dashboard

pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod dispatch;
pub mod hdi;
pub mod lifetable;
pub mod mortality;
pub mod regression;
pub mod state;
pub mod views;
pub mod weeks;

#[cfg(test)]
mod fixtures;
