//! View models: what each browser view needs to draw, already derived.
//!
//! The browser binds these to SVG elements. Nothing here knows about
//! pixels; positions are in data units or grid coordinates.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::derived::{MortalityAnnotations, MortalityCalendar, RegressionCurve, WeekCell};
use crate::enums::{AttributeKey, Gender, ViewStage};

// ---------------------------------------------------------------------------
// Heatmap (life-expectancy calendar)
// ---------------------------------------------------------------------------

/// Caption figures under the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LifeSummary {
    /// Age today in years, one decimal.
    pub age_years: f64,
    /// Share of the expected lifespan already lived, 0 to 1 (not clamped).
    pub life_lived_fraction: f64,
}

/// Everything the calendar heatmap draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HeatmapModel {
    /// Country of residence the life table row came from.
    pub country: String,
    /// Gender whose brackets were used.
    pub gender: Gender,
    /// Date of birth.
    pub dob: NaiveDate,
    /// Life expectancy in years.
    pub life_expectancy: f64,
    /// Estimated date and time of death.
    #[ts(as = "String")]
    pub date_of_death: NaiveDateTime,
    /// Calendar years from birth year to death year.
    pub lifespan_years: u32,
    /// Per-day probabilities.
    pub calendar: MortalityCalendar,
    /// Under-5 and under-60 markers.
    pub annotations: MortalityAnnotations,
    /// Upper end of the colour scale.
    pub color_max: f64,
    /// Caption figures.
    pub summary: LifeSummary,
}

// ---------------------------------------------------------------------------
// Scatter plot and small multiples
// ---------------------------------------------------------------------------

/// A country dot on the main scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScatterPoint {
    /// Country name.
    pub country: String,
    /// Life expectancy.
    pub x: f64,
    /// Attribute value.
    pub y: f64,
    /// Selected, or nothing is selected (hover enabled).
    pub highlighted: bool,
    /// Fill opacity.
    pub fill_opacity: f64,
    /// Outline width; non-zero only for selected countries.
    pub stroke_width: f64,
}

/// Everything the main scatter plot draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScatterModel {
    /// Attribute on the y axis.
    pub attribute: AttributeKey,
    /// Axis label of the attribute.
    pub label: String,
    /// Selected year.
    pub year: i32,
    /// Dots for the selected year.
    pub points: Vec<ScatterPoint>,
    /// Life-expectancy extent over all years.
    pub x_domain: Option<(f64, f64)>,
    /// Zero to the attribute maximum over all years.
    pub y_domain: Option<(f64, f64)>,
    /// Fitted curve.
    pub curve: RegressionCurve,
    /// Overlay opacity; zero when the overlay is switched off.
    pub curve_opacity: f64,
}

/// A dot on a small multiple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PanelPoint {
    /// Country name.
    pub country: String,
    /// Life expectancy.
    pub x: f64,
    /// Attribute value.
    pub y: f64,
}

/// One small-multiple panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MultiplePanel {
    /// Attribute of the panel.
    pub attribute: AttributeKey,
    /// Axis label.
    pub label: String,
    /// Whether the main scatter plot currently shows this attribute.
    pub active: bool,
    /// Dots for the selected year.
    pub points: Vec<PanelPoint>,
    /// Life-expectancy extent over all years.
    pub x_domain: Option<(f64, f64)>,
    /// Zero to the attribute maximum over all years.
    pub y_domain: Option<(f64, f64)>,
}

/// All small multiples, in attribute order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MultiplesModel {
    /// Selected year.
    pub year: i32,
    /// One panel per attribute.
    pub panels: Vec<MultiplePanel>,
}

// ---------------------------------------------------------------------------
// Choropleth map
// ---------------------------------------------------------------------------

/// How a country is filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Fill {
    /// Position on the colour ramp, 0 to 1.
    Scaled(f64),
    /// No HDI for the year; drawn as a hatch pattern.
    NoData,
}

/// One country on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MapCountry {
    /// Country name.
    pub name: String,
    /// HDI for the selected year, `0.0` for no data.
    pub hdi: f64,
    /// Fill.
    pub fill: Fill,
    /// Part of the cross-view selection.
    pub selected: bool,
}

/// A colour-legend stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LegendStop {
    /// Value at the stop, one decimal.
    pub value: f64,
    /// Offset along the legend in percent.
    pub offset: u8,
}

/// Everything the choropleth map draws.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MapModel {
    /// Selected year.
    pub year: i32,
    /// HDI extent across every country, zeros included.
    pub extent: Option<(f64, f64)>,
    /// Countries in input order.
    pub countries: Vec<MapCountry>,
    /// Legend start and end.
    pub legend: Vec<LegendStop>,
}

// ---------------------------------------------------------------------------
// Life in weeks
// ---------------------------------------------------------------------------

/// Colour class of a week cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CellTone {
    /// Lived (grey).
    Lived,
    /// Still ahead (green).
    Remaining,
    /// Summer Games week (red).
    Summer,
    /// Winter Games week (navy).
    Winter,
}

/// Regrouping band used in the last stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum WeekBand {
    /// Games weeks already lived.
    Passed,
    /// Games weeks still ahead.
    NotPassed,
}

/// A week cell with its position for the current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlacedCell {
    /// Underlying occupancy.
    pub cell: WeekCell,
    /// Row: year of age, or row inside the band when regrouped.
    pub row: u32,
    /// Column: week of the year.
    pub column: u32,
    /// Band, only when regrouped.
    pub band: Option<WeekBand>,
    /// Hidden cells fade out in the regrouped stage.
    pub visible: bool,
    /// Colour class.
    pub tone: CellTone,
}

/// Week counts shown beside the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WeekSummary {
    /// Weeks started before now.
    pub weeks_lived: u32,
    /// Weeks still ahead.
    pub weeks_left: u32,
    /// Games weeks already lived.
    pub game_weeks_lived: u32,
    /// Games weeks still ahead.
    pub game_weeks_left: u32,
}

/// Everything the week grid draws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WeekGridModel {
    /// Current stage.
    pub stage: ViewStage,
    /// Caption for the stage.
    pub description: String,
    /// Number of grid rows (years).
    pub rows: u32,
    /// Number of grid columns (weeks).
    pub columns: u32,
    /// Every cell, row-major.
    pub cells: Vec<PlacedCell>,
    /// Counts.
    pub summary: WeekSummary,
}
