//! Headless form widgets that attach themselves to marked host elements.
//!
//! Widgets render into a [`Document`], an arena mirroring the host's form
//! elements. The host feeds input as [`UiEvent`]s through the managers and
//! replays the [`DispatchedEvent`]s the widgets leave behind.
//!
//! ```
//! use form_widgets::{Document, SelectTabsManager, SELECT_TABS_MARKER, UiEvent};
//!
//! let mut doc = Document::new();
//! let select = doc.create_element("select");
//! doc.set_attribute(select, SELECT_TABS_MARKER, "true").unwrap();
//! for text in ["Week", "Month"] {
//!     let option = doc.create_element("option");
//!     doc.set_text(option, text).unwrap();
//!     doc.append_child(select, option).unwrap();
//! }
//! let body = doc.body();
//! doc.append_child(body, select).unwrap();
//!
//! let mut tabs = SelectTabsManager::new();
//! assert_eq!(tabs.attach(&mut doc, body).unwrap(), 1);
//!
//! let month = tabs.get(select).unwrap().tabs()[1];
//! tabs.dispatch(&mut doc, &UiEvent::Click(month)).unwrap();
//! assert_eq!(doc.value(select).unwrap(), "Month");
//! ```

mod attach;
mod calendar;
mod chart;
mod clock;
mod config;
mod consts;
mod dom;
mod error;
mod prelude;
mod select;
mod select_popup;
mod select_tabs;
mod widget;

pub use attach::{
    AttachManager, AutoAttach, CalendarManager, ChartManager, SelectPopupManager,
    SelectTabsManager, is_marked,
};
pub use calendar::{
    Calendar, CalendarGrid, DateState, DayCell, HostDate, WeekRow, days_in_month,
    first_weekday_offset, parse_host_date, popup_offset,
};
pub use chart::{Chart, ChartStyle, DrawCommand, LineChart, format_number};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::*;
pub use consts::*;
pub use dom::{
    DispatchedEvent, Document, Element, ElementId, EventKind, ListenerGuard, ListenerId, Point,
    Rect, UiEvent,
};
pub use error::{DomError, WidgetError};
pub use select::{SelectOption, extract_options, has_preselected_option, option_value, require_select};
pub use select_popup::SelectPopup;
pub use select_tabs::SelectTabs;
pub use widget::{EventFlow, Widget};

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use chrono::NaiveDate;

    use super::*;

    /// A page with one of every widget kind, as a host would mirror it.
    struct Page {
        doc: Document,
        field: ElementId,
        popup_select: ElementId,
        tabs_select: ElementId,
        chart_box: ElementId,
    }

    fn element(doc: &mut Document, parent: ElementId, tag: &str, attributes: &[(&str, &str)]) -> ElementId {
        let id = doc.create_element(tag);
        for (name, value) in attributes {
            doc.set_attribute(id, name, value).unwrap();
        }
        doc.append_child(parent, id).unwrap();
        id
    }

    fn options(doc: &mut Document, select: ElementId, texts: &[&str]) {
        for text in texts {
            let option = element(doc, select, "option", &[]);
            doc.set_text(option, text).unwrap();
        }
    }

    fn page() -> Page {
        let mut doc = Document::new();
        let body = doc.body();
        let form = element(&mut doc, body, "form", &[]);
        doc.set_rect(form, Rect::new(100.0, 50.0, 400.0, 300.0)).unwrap();

        let field = element(&mut doc, form, "input", &[(CALENDAR_MARKER, "true")]);
        doc.set_rect(field, Rect::new(120.0, 60.0, 150.0, 30.0)).unwrap();

        let popup_select = element(
            &mut doc,
            form,
            "select",
            &[
                (SELECT_POPUP_MARKER, "true"),
                (SELECT_POPUP_PLACEHOLDER, "Category"),
            ],
        );
        options(&mut doc, popup_select, &["Food", "Rent"]);
        doc.set_rect(popup_select, Rect::new(160.0, 60.0, 120.0, 24.0)).unwrap();

        let tabs_select = element(&mut doc, form, "select", &[(SELECT_TABS_MARKER, "true")]);
        options(&mut doc, tabs_select, &["Week", "Month", "Year"]);

        let chart_box = element(
            &mut doc,
            body,
            "div",
            &[
                (CHART_MARKER, "true"),
                (CHART_WIDTH, "140"),
                (CHART_HEIGHT, "140"),
                (CHART_LABELS, r#""Jan", "Feb", "Mar""#),
                (CHART_DATA_NUMBERS, "0, 50, 100"),
            ],
        );

        Page {
            doc,
            field,
            popup_select,
            tabs_select,
            chart_box,
        }
    }

    #[test]
    fn test_every_manager_attaches_its_own_widgets() {
        let mut page = page();
        let body = page.doc.body();
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let mut calendars = CalendarManager::with_context(Rc::new(FixedClock(today)));
        let mut popups = SelectPopupManager::new();
        let mut tabs = SelectTabsManager::new();
        let mut charts = ChartManager::new();

        assert_eq!(calendars.attach(&mut page.doc, body).unwrap(), 1);
        assert_eq!(popups.attach(&mut page.doc, body).unwrap(), 1);
        assert_eq!(tabs.attach(&mut page.doc, body).unwrap(), 1);
        assert_eq!(charts.attach(&mut page.doc, body).unwrap(), 1);

        assert!(calendars.contains(page.field));
        assert!(popups.contains(page.popup_select));
        assert!(tabs.contains(page.tabs_select));
        assert!(charts.contains(page.chart_box));
        assert!(popups.get(page.popup_select).unwrap().has_placeholder());
    }

    #[test]
    fn test_pick_date_then_category() {
        let mut page = page();
        let body = page.doc.body();
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let mut calendars = CalendarManager::with_context(Rc::new(FixedClock(today)));
        let mut popups = SelectPopupManager::new();
        calendars.attach(&mut page.doc, body).unwrap();
        popups.attach(&mut page.doc, body).unwrap();

        calendars.dispatch(&mut page.doc, &UiEvent::Click(page.field)).unwrap();
        let day = calendars.get(page.field).unwrap().day_link(20).unwrap();
        calendars.dispatch(&mut page.doc, &UiEvent::PointerDown(day)).unwrap();
        popups.dispatch(&mut page.doc, &UiEvent::PointerDown(day)).unwrap();
        calendars.dispatch(&mut page.doc, &UiEvent::Click(day)).unwrap();
        assert_eq!(page.doc.value(page.field).unwrap(), "20/3/2024");

        let flow = popups
            .dispatch(&mut page.doc, &UiEvent::PointerDown(page.popup_select))
            .unwrap();
        assert_eq!(flow, EventFlow::DefaultPrevented);
        let rent = popups.get(page.popup_select).unwrap().links()[1];
        popups.dispatch(&mut page.doc, &UiEvent::Click(rent)).unwrap();
        assert_eq!(page.doc.value(page.popup_select).unwrap(), "Rent");

        let changed: Vec<ElementId> = page.doc.take_events().iter().map(|e| e.target).collect();
        assert_eq!(changed, vec![page.field, page.popup_select]);

        calendars.detach_all(&mut page.doc).unwrap();
        popups.detach_all(&mut page.doc).unwrap();
        assert_eq!(page.doc.listener_count(), 0);
    }

    #[test]
    fn test_errors_display() {
        let mut doc = Document::new();
        let input = doc.create_element("input");
        assert_eq!(
            WidgetError::NotASelect(input).to_string(),
            format!("Provided element {input} is not a select element")
        );
        doc.destroy(input).unwrap();
        let err = WidgetError::from(doc.get(input).unwrap_err());
        assert_eq!(err.to_string(), format!("Unknown element: {input}"));
    }
}
