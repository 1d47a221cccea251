//! Immutable render snapshot published after every event.

use chrono::{Datelike, Weekday};
use serde::Serialize;
use storeloc_core::{Location, LocationId};

use crate::view::ViewPhase;

pub const EMPTY_MESSAGE: &str = "No locations available";
pub const NO_MATCHES_MESSAGE: &str = "No locations match your search";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderFrame {
    pub title: String,
    /// The map/list toggle lives in the header.
    pub toggle_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: LocationId,
    pub name: String,
    pub address: String,
    pub category: &'static str,
    pub phone: Option<String>,
    pub hours_today: Option<String>,
    pub open_now: bool,
    pub plottable: bool,
    pub selected: bool,
}

impl ListItem {
    /// `None` for a record without identity; the directory assigns one to
    /// every record, so this only filters foreign input.
    #[must_use]
    pub fn from_location(location: &Location, today: Weekday, selected: bool) -> Option<Self> {
        Some(Self {
            id: location.identity()?.clone(),
            name: location.name.clone(),
            address: location.address.clone(),
            category: location.category.label(),
            phone: location.phone.clone(),
            hours_today: location.hours.get(today).map(str::to_string),
            open_now: location.hours.is_open_on(today),
            plottable: location.is_plottable(),
            selected,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapFrame {
    pub markers: usize,
    pub zoom: u8,
    pub ready: bool,
    pub failed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub phase: ViewPhase,
    pub header: Option<HeaderFrame>,
    /// Widget name, when the banner is enabled.
    pub banner: Option<String>,
    pub accent: String,
    pub notice: bool,
    pub list: Vec<ListItem>,
    pub empty_message: Option<&'static str>,
    pub map: Option<MapFrame>,
    pub selected: Option<LocationId>,
    pub error: Option<String>,
}

impl Frame {
    /// Nothing rendered at all.
    #[must_use]
    pub fn hidden() -> Self {
        Self::bare(ViewPhase::Hidden, String::new())
    }

    /// Loading indicator only.
    #[must_use]
    pub fn loading(accent: String) -> Self {
        Self::bare(ViewPhase::Loading, accent)
    }

    fn bare(phase: ViewPhase, accent: String) -> Self {
        Self {
            phase,
            header: None,
            banner: None,
            accent,
            notice: false,
            list: Vec::new(),
            empty_message: None,
            map: None,
            selected: None,
            error: None,
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.phase != ViewPhase::Hidden
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.phase != ViewPhase::Loading
    }
}

pub(crate) fn today() -> Weekday {
    chrono::Local::now().weekday()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn list_item_reports_hours_heuristic() {
        let location: Location = serde_json::from_value(json!({
            "id": 7,
            "name": "Downtown",
            "category": "Restaurant",
            "hours": {"monday": "11am - 10pm", "tuesday": "Closed"}
        }))
        .unwrap();

        let monday = ListItem::from_location(&location, Weekday::Mon, true).unwrap();
        assert!(monday.open_now);
        assert!(monday.selected);
        assert_eq!(monday.category, "restaurant");
        assert_eq!(monday.id, LocationId::new("7"));

        let tuesday = ListItem::from_location(&location, Weekday::Tue, false).unwrap();
        assert!(!tuesday.open_now);
        assert_eq!(tuesday.hours_today.as_deref(), Some("Closed"));
    }

    #[test]
    fn hidden_frame_serializes_phase() {
        let value = serde_json::to_value(Frame::hidden()).unwrap();
        assert_eq!(value["phase"], "hidden");
        assert_eq!(value["list"], json!([]));
    }
}
