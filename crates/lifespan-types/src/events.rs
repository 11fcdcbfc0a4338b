//! Event payloads published by the browser controls.
//!
//! Serialized adjacently tagged, e.g.
//! `{"event": "changeGender", "payload": "female"}`, which is also the
//! shape of entries in a replay script.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AttributeKey, EventName, Gender, ViewStage};

/// How the week-grid stage should move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub enum StageChange {
    /// Jump to a stage.
    Set(ViewStage),
    /// "Previous" button.
    Previous,
    /// "Next" button.
    Next,
}

/// A user interaction, with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum DashboardEvent {
    /// New date of birth.
    ChangeDob(NaiveDate),
    /// New gender.
    ChangeGender(Gender),
    /// New country of residence.
    ChangeCountry(String),
    /// Scatter points currently marked active; the first one is toggled.
    DataSelection(Vec<String>),
    /// Map countries currently marked active; the first one is toggled.
    MapSelection(Vec<String>),
    /// Attribute of the clicked small multiple.
    SelectAttribute(AttributeKey),
    /// Drop every selected country.
    ClearData,
    /// New selected year.
    ChangeYear(i32),
    /// Show or hide the regression overlay.
    ToggleRegression(bool),
    /// Move the week-grid stage.
    ChangeViewStage(StageChange),
}

impl DashboardEvent {
    /// The name handlers are subscribed under.
    pub const fn name(&self) -> EventName {
        match self {
            Self::ChangeDob(_) => EventName::ChangeDob,
            Self::ChangeGender(_) => EventName::ChangeGender,
            Self::ChangeCountry(_) => EventName::ChangeCountry,
            Self::DataSelection(_) => EventName::DataSelection,
            Self::MapSelection(_) => EventName::MapSelection,
            Self::SelectAttribute(_) => EventName::SelectAttribute,
            Self::ClearData => EventName::ClearData,
            Self::ChangeYear(_) => EventName::ChangeYear,
            Self::ToggleRegression(_) => EventName::ToggleRegression,
            Self::ChangeViewStage(_) => EventName::ChangeViewStage,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_is_adjacently_tagged() {
        let event = DashboardEvent::ChangeGender(Gender::Female);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "changeGender");
        assert_eq!(json["payload"], "female");
    }

    #[test]
    fn unit_event_parses_without_payload() {
        let event: DashboardEvent = serde_json::from_str(r#"{"event":"clearData"}"#).unwrap();
        assert_eq!(event, DashboardEvent::ClearData);
        assert_eq!(event.name(), EventName::ClearData);
    }

    #[test]
    fn stage_change_parses() {
        let event: DashboardEvent =
            serde_json::from_str(r#"{"event":"changeViewStage","payload":"next"}"#).unwrap();
        assert_eq!(event, DashboardEvent::ChangeViewStage(StageChange::Next));
    }

    #[test]
    fn dob_parses_iso_date() {
        let event: DashboardEvent =
            serde_json::from_str(r#"{"event":"changeDob","payload":"1990-06-15"}"#).unwrap();
        assert_eq!(
            event,
            DashboardEvent::ChangeDob(NaiveDate::from_ymd_opt(1990, 6, 15).unwrap())
        );
    }
}
