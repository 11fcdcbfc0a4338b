//! Shared type definitions for the lifespan dashboard.
//!
//! This crate is the single source of truth for the records the loaders
//! produce, the data the core derives, and the view models the browser
//! draws. Types flow to `TypeScript` via `ts-rs` so the views bind to the
//! same shapes.
//!
//! # Modules
//!
//! - [`enums`] -- Gender, health attributes, Games seasons, stages, event names
//! - [`records`] -- Life-table rows, bandwidths, Games, map shapes
//! - [`derived`] -- Mortality calendar, regression curves, week grid
//! - [`events`] -- Event payloads published by the controls
//! - [`views`] -- Per-view models

pub mod derived;
pub mod enums;
pub mod events;
pub mod records;
pub mod views;

// Re-export all public types at crate root for convenience.
pub use derived::{
    CurvePoint, MortalityAnnotation, MortalityAnnotations, MortalityCalendar, MortalityDay,
    RegressionCurve, RegressionMethod, WEEKS_PER_YEAR, WeekCell, WeekGrid,
};
pub use enums::{AttributeKey, EventName, GameSeason, Gender, UnknownVariant, ViewStage};
pub use events::{DashboardEvent, StageChange};
pub use records::{
    AgeBracket, BandwidthTable, CountryShape, CountryYearRecord, GameEvent, MortalityBracket,
};
pub use views::{
    CellTone, Fill, HeatmapModel, LegendStop, LifeSummary, MapCountry, MapModel, MultiplePanel,
    MultiplesModel, PanelPoint, PlacedCell, ScatterModel, ScatterPoint, WeekBand, WeekGridModel,
    WeekSummary,
};
