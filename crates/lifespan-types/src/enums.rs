//! Enumeration types for the lifespan dashboard.
//!
//! Every enum here has a stable wire spelling that matches the column names
//! and control values the browser layer already uses (`male`, `basic_water`,
//! `changeDob`, ...). The `FromStr` impls accept exactly those spellings.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A string did not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

/// Gender used to pick life-table columns.
///
/// The life table prefixes every mortality bracket with the lowercase name
/// (`male_0_1`, `female_85_plus`) and stores life expectancy as
/// `life_expectancy_<gender>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male life-table columns.
    Male,
    /// Female life-table columns.
    Female,
}

impl Gender {
    /// Both genders, in selector order.
    pub const ALL: [Self; 2] = [Self::Male, Self::Female];

    /// Lowercase name, also the column prefix in the life table.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = UnknownVariant;

    /// Case-insensitive: the selector shows `Male`/`Female`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(UnknownVariant::new("gender", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Health attributes
// ---------------------------------------------------------------------------

/// A per-country health indicator plotted against life expectancy.
///
/// Serialized names are the CSV column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum AttributeKey {
    /// Mean body-mass index.
    #[serde(rename = "bmi")]
    Bmi,
    /// Alcohol consumption.
    #[serde(rename = "alcohol")]
    Alcohol,
    /// Share of population using basic drinking water.
    #[serde(rename = "basic_water")]
    BasicWater,
    /// Thinness among children aged 5 to 19.
    #[serde(rename = "age5-19thinness")]
    Age5To19Thinness,
    /// Obesity among children aged 5 to 19.
    #[serde(rename = "age5-19obesity")]
    Age5To19Obesity,
    /// Health expenditure as a share of GDP.
    #[serde(rename = "che_gdp")]
    CheGdp,
    /// Prevalence of HIV.
    #[serde(rename = "une_hiv")]
    UneHiv,
    /// Gross national income per capita.
    #[serde(rename = "une_gni")]
    UneGni,
    /// Medical doctors per 10,000 population.
    #[serde(rename = "doctors")]
    Doctors,
}

impl AttributeKey {
    /// All attributes in small-multiple panel order.
    pub const ALL: [Self; 9] = [
        Self::Bmi,
        Self::Alcohol,
        Self::BasicWater,
        Self::Age5To19Thinness,
        Self::Age5To19Obesity,
        Self::CheGdp,
        Self::UneHiv,
        Self::UneGni,
        Self::Doctors,
    ];

    /// Column name in the life-expectancy and bandwidth tables.
    pub const fn column(self) -> &'static str {
        match self {
            Self::Bmi => "bmi",
            Self::Alcohol => "alcohol",
            Self::BasicWater => "basic_water",
            Self::Age5To19Thinness => "age5-19thinness",
            Self::Age5To19Obesity => "age5-19obesity",
            Self::CheGdp => "che_gdp",
            Self::UneHiv => "une_hiv",
            Self::UneGni => "une_gni",
            Self::Doctors => "doctors",
        }
    }

    /// Axis and tooltip label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bmi => "BMI",
            Self::Alcohol => "Alcohol consumption %",
            Self::BasicWater => "Population using basic drinking water %",
            Self::Age5To19Thinness => "Thinness percentage among children",
            Self::Age5To19Obesity => "Obesity percentage among children",
            Self::CheGdp => "Health expenditure percentage to GDP",
            Self::UneHiv => "Prevalence of HIV",
            Self::UneGni => "GNI per capita",
            Self::Doctors => "Medical doctors per 10,000 populations",
        }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for AttributeKey {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.column() == s)
            .ok_or_else(|| UnknownVariant::new("attribute", s))
    }
}

// ---------------------------------------------------------------------------
// Olympic seasons
// ---------------------------------------------------------------------------

/// Season of an Olympic Games edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum GameSeason {
    /// Summer Games.
    Summer,
    /// Winter Games.
    Winter,
}

impl FromStr for GameSeason {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Summer" | "summer" => Ok(Self::Summer),
            "Winter" | "winter" => Ok(Self::Winter),
            _ => Err(UnknownVariant::new("game season", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Week-grid stages
// ---------------------------------------------------------------------------

/// Which of the three "life in weeks" views is shown.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum ViewStage {
    /// Weeks lived versus weeks left.
    #[default]
    LifeInWeeks,
    /// Olympic weeks overlaid on the grid.
    GamesOverlay,
    /// Olympic weeks regrouped into lived and remaining bands.
    GamesRegrouped,
}

impl ViewStage {
    /// Highest stage index.
    pub const MAX_INDEX: u8 = 2;

    /// Numeric stage, 0 through 2.
    pub const fn index(self) -> u8 {
        match self {
            Self::LifeInWeeks => 0,
            Self::GamesOverlay => 1,
            Self::GamesRegrouped => 2,
        }
    }

    /// Stage for a numeric index, or `None` past [`Self::MAX_INDEX`].
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::LifeInWeeks),
            1 => Some(Self::GamesOverlay),
            2 => Some(Self::GamesRegrouped),
            _ => None,
        }
    }

    /// The following stage, saturating at the last one.
    pub const fn next(self) -> Self {
        match self {
            Self::LifeInWeeks => Self::GamesOverlay,
            Self::GamesOverlay | Self::GamesRegrouped => Self::GamesRegrouped,
        }
    }

    /// The preceding stage, saturating at the first one.
    pub const fn previous(self) -> Self {
        match self {
            Self::LifeInWeeks | Self::GamesOverlay => Self::LifeInWeeks,
            Self::GamesRegrouped => Self::GamesOverlay,
        }
    }

    /// Caption shown under the grid.
    pub const fn description(self) -> &'static str {
        match self {
            Self::LifeInWeeks => {
                "The first view shows how many weeks you have lived (grey) and how many weeks you have left (green)."
            }
            Self::GamesOverlay => {
                "The second view overlaps an important event in your lifetime. Let's use the Summer (red) and Winter Olympics (blue) as a proxy."
            }
            Self::GamesRegrouped => {
                "In the final view, you can see how many weeks you've already spent with Olympics, and how many weeks of Olympics you have left."
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher vocabulary
// ---------------------------------------------------------------------------

/// Name of a dashboard event. Handlers subscribe by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    /// Date of birth picker changed.
    ChangeDob,
    /// Gender selector changed.
    ChangeGender,
    /// Country-of-residence selector changed.
    ChangeCountry,
    /// A scatter point was clicked.
    DataSelection,
    /// A map country was clicked.
    MapSelection,
    /// A small-multiple panel was clicked.
    SelectAttribute,
    /// Click on empty scatter space.
    ClearData,
    /// Year selector changed.
    ChangeYear,
    /// Regression overlay selector changed.
    ToggleRegression,
    /// Previous/next buttons of the week grid.
    ChangeViewStage,
}

impl EventName {
    /// Every event name, in registration-table order.
    pub const ALL: [Self; 10] = [
        Self::ChangeDob,
        Self::ChangeGender,
        Self::ChangeCountry,
        Self::DataSelection,
        Self::MapSelection,
        Self::SelectAttribute,
        Self::ClearData,
        Self::ChangeYear,
        Self::ToggleRegression,
        Self::ChangeViewStage,
    ];

    /// Wire spelling (`changeDob`, `clearData`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChangeDob => "changeDob",
            Self::ChangeGender => "changeGender",
            Self::ChangeCountry => "changeCountry",
            Self::DataSelection => "dataSelection",
            Self::MapSelection => "mapSelection",
            Self::SelectAttribute => "selectAttribute",
            Self::ClearData => "clearData",
            Self::ChangeYear => "changeYear",
            Self::ToggleRegression => "toggleRegression",
            Self::ChangeViewStage => "changeViewStage",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("event name", s))
    }
}
