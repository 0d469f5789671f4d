//! Widget options.
//!
//! Every options struct deserializes with serde (missing fields take their
//! defaults) and can also be read from the marker attributes of a host
//! element. Attribute parsing never fails: malformed values fall back to the
//! default, or to NaN for chart numbers.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_FUTURE_YEARS;
use crate::dom::{Document, ElementId};
use crate::prelude::*;

pub const CALENDAR_MARKER: &str = "use-calendar";
pub const CALENDAR_POSITION: &str = "calendar-position";

pub const SELECT_POPUP_MARKER: &str = "custom-select";
pub const SELECT_POPUP_PLACEHOLDER: &str = "custom-select-placeholder";
pub const SELECT_POPUP_ACTIVE_CLASS: &str = "custom-select-active-class";

pub const SELECT_TABS_MARKER: &str = "select-tabs";
pub const SELECT_TABS_CONTAINER_CLASS: &str = "select-tabs-container-class";
pub const SELECT_TABS_ACTIVE_CLASS: &str = "select-tabs-active-class";
pub const SELECT_TABS_OPTION_CLASS: &str = "select-tabs-option-class";

pub const CHART_MARKER: &str = "append-chart";
pub const CHART_WIDTH: &str = "chart-width";
pub const CHART_HEIGHT: &str = "chart-height";
pub const CHART_LABELS: &str = "chart-labels";
pub const CHART_DATA_NUMBERS: &str = "chart-data-numbers";

/// Non-empty attribute value, treating empty strings as absent
fn non_empty<'a>(doc: &'a Document, element: ElementId, name: &str) -> Option<&'a str> {
    doc.attribute(element, name).filter(|value| !value.is_empty())
}

/// Where the calendar opens relative to its host field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Top-aligned, to the right of the field
    #[default]
    #[display(fmt = "right")]
    Right,
    /// Left-aligned, below the field
    #[display(fmt = "behind")]
    Behind,
}

impl Position {
    /// Any keyword other than `right` places the calendar below the field.
    pub fn from_keyword(keyword: &str) -> Self {
        if keyword == "right" {
            Self::Right
        } else {
            Self::Behind
        }
    }
}

/// CSS classes of the nodes the calendar generates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarClasses {
    pub calendar: String,
    pub header: String,
    pub days_container: String,
    pub toolbar: String,
    pub week_row: String,
    pub select: String,
    pub select_active: String,
    pub disabled_day: String,
}

impl Default for CalendarClasses {
    fn default() -> Self {
        Self {
            calendar: "calendar".to_owned(),
            header: "calendar__header".to_owned(),
            days_container: "calendar__days".to_owned(),
            toolbar: "calendar__toolbar".to_owned(),
            week_row: "calendar__days-row".to_owned(),
            select: "calendar__select".to_owned(),
            select_active: "calendar__select--active".to_owned(),
            disabled_day: "calendar__disabled-day".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarOptions {
    pub position: Position,
    /// Years offered after the current one
    pub future_years: i32,
    pub classes: CalendarClasses,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            position: Position::Right,
            future_years: DEFAULT_FUTURE_YEARS,
            classes: CalendarClasses::default(),
        }
    }
}

impl CalendarOptions {
    /// Reads `calendar-position`; everything else keeps its default.
    pub fn from_element(doc: &Document, element: ElementId) -> Self {
        let mut options = Self::default();
        if let Some(keyword) = non_empty(doc, element, CALENDAR_POSITION) {
            options.position = Position::from_keyword(keyword);
        }
        options
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectPopupOptions {
    /// Text of an option inserted first when nothing is preselected
    pub placeholder: Option<String>,
    /// Class added to the select while the popup is open
    pub active_class: Option<String>,
    pub popup_class: String,
}

impl Default for SelectPopupOptions {
    fn default() -> Self {
        Self {
            placeholder: None,
            active_class: None,
            popup_class: "select-popup".to_owned(),
        }
    }
}

impl SelectPopupOptions {
    pub fn from_element(doc: &Document, element: ElementId) -> Self {
        Self {
            placeholder: non_empty(doc, element, SELECT_POPUP_PLACEHOLDER).map(str::to_owned),
            active_class: non_empty(doc, element, SELECT_POPUP_ACTIVE_CLASS).map(str::to_owned),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectTabsOptions {
    pub container_class: String,
    pub active_option_class: String,
    pub option_class: String,
}

impl Default for SelectTabsOptions {
    fn default() -> Self {
        Self {
            container_class: "input-option-selector".to_owned(),
            active_option_class: "input-option-selector__selected".to_owned(),
            option_class: "input-option-selector__option".to_owned(),
        }
    }
}

impl SelectTabsOptions {
    pub fn from_element(doc: &Document, element: ElementId) -> Self {
        let defaults = Self::default();
        let read = |name: &str, fallback: String| {
            non_empty(doc, element, name).map_or(fallback, str::to_owned)
        };
        Self {
            container_class: read(SELECT_TABS_CONTAINER_CLASS, defaults.container_class),
            active_option_class: read(SELECT_TABS_ACTIVE_CLASS, defaults.active_option_class),
            option_class: read(SELECT_TABS_OPTION_CLASS, defaults.option_class),
        }
    }
}

/// Data and canvas size of a line chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub width: f64,
    pub height: f64,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartOptions {
    /// Reads `chart-width`, `chart-height`, `chart-labels` and
    /// `chart-data-numbers`. Missing attributes read as empty strings.
    pub fn from_element(doc: &Document, element: ElementId) -> Self {
        let read = |name: &str| doc.attribute(element, name).unwrap_or_default();
        Self {
            width: parse_number(read(CHART_WIDTH)),
            height: parse_number(read(CHART_HEIGHT)),
            labels: parse_labels(read(CHART_LABELS)),
            values: parse_numbers(read(CHART_DATA_NUMBERS)),
        }
    }
}

/// Lenient number parsing: surrounding whitespace is ignored, a blank string
/// is zero and anything unparseable is NaN.
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// Comma-separated numbers, each parsed with [`parse_number`].
pub fn parse_numbers(text: &str) -> Vec<f64> {
    text.split(',').map(parse_number).collect()
}

/// Comma-separated labels with whitespace trimmed and quote characters removed.
pub fn parse_labels(text: &str) -> Vec<String> {
    text.split(',')
        .map(|label| label.trim().replace(['\'', '"'], ""))
        .collect()
}
