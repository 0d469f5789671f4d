//! Tab strip standing in for a hidden `<select>`.

use tracing::debug;

use crate::config::SelectTabsOptions;
use crate::dom::{Document, ElementId, UiEvent};
use crate::error::WidgetError;
use crate::select::{SelectOption, extract_options, require_select};
use crate::widget::{EventFlow, Widget, require_parent, require_target};

/// One rendered tab and the option it stands for
#[derive(Debug, Clone, PartialEq, Eq)]
struct Tab {
    element: ElementId,
    option: SelectOption,
}

/// Renders every option of a select as a clickable tab.
///
/// The select itself is hidden but keeps its value in sync, so forms and
/// `change` listeners bound to it keep working.
#[derive(Debug)]
pub struct SelectTabs {
    target: ElementId,
    options: SelectTabsOptions,
    container: ElementId,
    tabs: Vec<Tab>,
    /// The select's inline `display` before it was hidden
    display: Option<String>,
}

impl SelectTabs {
    /// # Errors
    /// Returns `WidgetError::MissingTarget` if `target` is not in the document,
    /// `WidgetError::NotASelect` if it is not a select and
    /// `WidgetError::Detached` if it has no parent.
    pub fn new(
        doc: &mut Document,
        target: ElementId,
        options: SelectTabsOptions,
    ) -> Result<Self, WidgetError> {
        require_target(doc, target, Self::NAME)?;
        require_select(doc, target)?;
        require_parent(doc, target, Self::NAME)?;

        let display = doc.style(target, "display").map(str::to_owned);
        doc.set_style(target, "display", "none")?;
        let container = doc.create_element("div");
        doc.set_class_name(container, &options.container_class)?;
        doc.insert_after(target, container)?;

        let mut tabs = Vec::new();
        for option in extract_options(doc, target)? {
            let element = doc.create_element("div");
            let link = doc.create_element("a");
            doc.set_text(link, &option.text)?;
            doc.append_child(element, link)?;
            if option.active {
                doc.add_class(element, &options.active_option_class)?;
            } else {
                doc.set_class_name(element, &options.option_class)?;
            }
            doc.append_child(container, element)?;
            tabs.push(Tab { element, option });
        }

        debug!(element = %target, tabs = tabs.len(), "select tabs attached");
        Ok(Self {
            target,
            options,
            container,
            tabs,
            display,
        })
    }

    pub const fn container(&self) -> ElementId {
        self.container
    }

    /// Tab elements in option order
    pub fn tabs(&self) -> Vec<ElementId> {
        self.tabs.iter().map(|tab| tab.element).collect()
    }

    /// Value of the active tab
    pub fn active_value(&self) -> Option<&str> {
        self.tabs
            .iter()
            .find(|tab| tab.option.active)
            .map(|tab| tab.option.value.as_str())
    }

    /// Index of the tab containing `node`
    fn tab_at(&self, doc: &Document, node: ElementId) -> Option<usize> {
        self.tabs
            .iter()
            .position(|tab| doc.contains(tab.element, node))
    }

    fn activate(&mut self, doc: &mut Document, index: usize) -> Result<(), WidgetError> {
        let Some((element, value)) = self
            .tabs
            .get(index)
            .map(|tab| (tab.element, tab.option.value.clone()))
        else {
            return Ok(());
        };

        let active_tabs = doc.query(self.container, |node| {
            node.has_class(&self.options.active_option_class)
        });
        for tab in active_tabs {
            doc.set_class_name(tab, &self.options.option_class)?;
        }
        doc.set_class_name(element, &self.options.active_option_class)?;
        doc.set_value(self.target, &value)?;
        for tab in &mut self.tabs {
            tab.option.active = tab.option.value == value;
        }
        doc.dispatch_change(self.target)?;
        debug!(element = %self.target, %value, "select tab activated");
        Ok(())
    }
}

impl Widget for SelectTabs {
    const NAME: &'static str = "SelectTabs";

    fn target(&self) -> ElementId {
        self.target
    }

    fn handle(&mut self, doc: &mut Document, event: &UiEvent) -> Result<EventFlow, WidgetError> {
        let UiEvent::Click(target) = *event else {
            return Ok(EventFlow::Ignored);
        };
        let Some(index) = self.tab_at(doc, target) else {
            return Ok(EventFlow::Ignored);
        };
        self.activate(doc, index)?;
        Ok(EventFlow::Handled)
    }

    /// Removes the tab strip and shows the select again.
    fn teardown(&mut self, doc: &mut Document) -> Result<(), WidgetError> {
        if doc.exists(self.container) {
            doc.destroy(self.container)?;
        }
        if doc.exists(self.target) {
            match &self.display {
                Some(display) => doc.set_style(self.target, "display", display)?,
                None => doc.remove_style(self.target, "display")?,
            }
        }
        self.tabs.clear();
        debug!(element = %self.target, "select tabs detached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::EventKind;
    use crate::select::tests::select_with;

    fn periods(doc: &mut Document) -> ElementId {
        select_with(
            doc,
            &[
                (Some("week"), "Week", false),
                (Some("month"), "Month", true),
                (Some("year"), "Year", false),
            ],
        )
    }

    fn tab_text(doc: &Document, tab: ElementId) -> String {
        let link = doc.get(tab).unwrap().children()[0];
        doc.get(link).unwrap().text().to_owned()
    }

    #[test]
    fn test_new_renders_tabs_after_hidden_select() {
        let mut doc = Document::new();
        let select = periods(&mut doc);
        let tabs = SelectTabs::new(&mut doc, select, SelectTabsOptions::default()).unwrap();

        assert_eq!(doc.style(select, "display"), Some("none"));
        let body = doc.get(doc.body()).unwrap().children().to_vec();
        assert_eq!(body, vec![select, tabs.container()]);
        assert!(doc.has_class(tabs.container(), "input-option-selector"));

        let elements = tabs.tabs();
        let texts: Vec<String> = elements.iter().map(|&tab| tab_text(&doc, tab)).collect();
        assert_eq!(texts, vec!["Week", "Month", "Year"]);
        assert_eq!(
            doc.get(elements[0]).unwrap().class_name(),
            "input-option-selector__option"
        );
        assert_eq!(
            doc.get(elements[1]).unwrap().class_name(),
            "input-option-selector__selected"
        );
        assert_eq!(tabs.active_value(), Some("month"));
    }

    #[test]
    fn test_click_activates_tab_and_emits_change() {
        let mut doc = Document::new();
        let select = periods(&mut doc);
        let mut tabs = SelectTabs::new(&mut doc, select, SelectTabsOptions::default()).unwrap();
        let elements = tabs.tabs();

        // click lands on the inner link
        let link = doc.get(elements[2]).unwrap().children()[0];
        let flow = tabs.handle(&mut doc, &UiEvent::Click(link)).unwrap();
        assert_eq!(flow, EventFlow::Handled);

        assert_eq!(doc.value(select).unwrap(), "year");
        assert_eq!(tabs.active_value(), Some("year"));
        assert!(doc.has_class(elements[2], "input-option-selector__selected"));
        assert_eq!(
            doc.get(elements[1]).unwrap().class_name(),
            "input-option-selector__option"
        );

        let events = doc.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target, select);
        assert_eq!(events[0].kind, EventKind::Change);
        assert!(events[0].bubbles && events[0].cancelable);
    }

    #[test]
    fn test_exactly_one_active_tab_after_clicks() {
        let mut doc = Document::new();
        let select = periods(&mut doc);
        let mut tabs = SelectTabs::new(&mut doc, select, SelectTabsOptions::default()).unwrap();
        for &tab in &tabs.tabs() {
            tabs.handle(&mut doc, &UiEvent::Click(tab)).unwrap();
            let active = doc.query(tabs.container(), |element| {
                element.has_class("input-option-selector__selected")
            });
            assert_eq!(active, vec![tab]);
        }
    }

    #[test]
    fn test_custom_classes() {
        let mut doc = Document::new();
        let select = periods(&mut doc);
        let options = SelectTabsOptions {
            container_class: "tabs".to_owned(),
            active_option_class: "tabs__on".to_owned(),
            option_class: "tabs__off".to_owned(),
        };
        let tabs = SelectTabs::new(&mut doc, select, options).unwrap();
        assert!(doc.has_class(tabs.container(), "tabs"));
        assert!(doc.has_class(tabs.tabs()[1], "tabs__on"));
        assert!(doc.has_class(tabs.tabs()[0], "tabs__off"));
    }

    #[test]
    fn test_clicks_elsewhere_ignored() {
        let mut doc = Document::new();
        let select = periods(&mut doc);
        let mut tabs = SelectTabs::new(&mut doc, select, SelectTabsOptions::default()).unwrap();
        let body = doc.body();
        let container = tabs.container();
        let first = tabs.tabs()[0];
        assert_eq!(
            tabs.handle(&mut doc, &UiEvent::Click(body)).unwrap(),
            EventFlow::Ignored
        );
        assert_eq!(
            tabs.handle(&mut doc, &UiEvent::Click(container)).unwrap(),
            EventFlow::Ignored
        );
        assert_eq!(
            tabs.handle(&mut doc, &UiEvent::PointerDown(first)).unwrap(),
            EventFlow::Ignored
        );
        assert!(doc.take_events().is_empty());
    }

    #[test]
    fn test_teardown_removes_tabs_and_shows_select() {
        let mut doc = Document::new();
        let select = periods(&mut doc);
        let nodes = doc.node_count();
        let mut tabs = SelectTabs::new(&mut doc, select, SelectTabsOptions::default()).unwrap();
        let container = tabs.container();
        tabs.teardown(&mut doc).unwrap();

        assert!(!doc.exists(container));
        assert_eq!(doc.style(select, "display"), None);
        assert_eq!(doc.node_count(), nodes);
        let body = doc.body();
        assert_eq!(doc.get(body).unwrap().children(), &[select]);
    }

    #[test]
    fn test_teardown_restores_inline_display() {
        let mut doc = Document::new();
        let select = periods(&mut doc);
        doc.set_style(select, "display", "inline-block").unwrap();
        let mut tabs = SelectTabs::new(&mut doc, select, SelectTabsOptions::default()).unwrap();
        assert_eq!(doc.style(select, "display"), Some("none"));
        tabs.teardown(&mut doc).unwrap();
        assert_eq!(doc.style(select, "display"), Some("inline-block"));
    }

    #[test]
    fn test_rejects_non_select_and_detached() {
        let mut doc = Document::new();
        let input = doc.create_element("input");
        doc.append_child(doc.body(), input).unwrap();
        assert_eq!(
            SelectTabs::new(&mut doc, input, SelectTabsOptions::default()).unwrap_err(),
            WidgetError::NotASelect(input)
        );

        let select = doc.create_element("select");
        assert_eq!(
            SelectTabs::new(&mut doc, select, SelectTabsOptions::default()).unwrap_err(),
            WidgetError::Detached {
                widget: "SelectTabs",
                element: select
            }
        );
    }
}
