//! Custom dropdown replacing the native popup of a `<select>`.

use tracing::debug;

use crate::config::SelectPopupOptions;
use crate::dom::{Document, ElementId, ListenerGuard, UiEvent};
use crate::error::WidgetError;
use crate::select::{extract_options, has_preselected_option};
use crate::widget::{EventFlow, Widget, px, require_parent, require_target};

#[derive(Debug)]
struct OpenPopup {
    root: ElementId,
    /// Option links and the value each one commits
    links: Vec<(ElementId, String)>,
}

/// Dropdown bound to a `<select>`.
///
/// Pointer-down on the select toggles a list of option links under it;
/// clicking a link commits its value and dispatches `change` on the select.
/// The document-level listener is held from construction until
/// [`Widget::teardown`].
#[derive(Debug)]
pub struct SelectPopup {
    target: ElementId,
    options: SelectPopupOptions,
    has_placeholder: bool,
    width: f64,
    listener: Option<ListenerGuard>,
    popup: Option<OpenPopup>,
}

impl SelectPopup {
    /// # Errors
    /// Returns `WidgetError::MissingTarget` if `target` is not in the document
    /// and `WidgetError::NotASelect` if a placeholder is requested for a
    /// non-select element.
    pub fn new(
        doc: &mut Document,
        target: ElementId,
        options: SelectPopupOptions,
    ) -> Result<Self, WidgetError> {
        require_target(doc, target, Self::NAME)?;

        let mut has_placeholder = false;
        if let Some(text) = &options.placeholder {
            has_placeholder = add_placeholder(doc, target, text)?;
        }

        doc.set_style(target, "appearance", "none")?;
        let width = doc.rect(target)?.width;
        doc.set_style(target, "width", &px(width))?;

        debug!(element = %target, has_placeholder, "select popup attached");
        Ok(Self {
            target,
            options,
            has_placeholder,
            width,
            listener: Some(doc.listen_pointer_down()),
            popup: None,
        })
    }

    pub const fn is_open(&self) -> bool {
        self.popup.is_some()
    }

    pub const fn has_placeholder(&self) -> bool {
        self.has_placeholder
    }

    /// Root node of the popup, while open
    pub fn popup(&self) -> Option<ElementId> {
        self.popup.as_ref().map(|popup| popup.root)
    }

    /// Option links in display order, while open
    pub fn links(&self) -> Vec<ElementId> {
        self.popup
            .as_ref()
            .map(|popup| popup.links.iter().map(|(link, _)| *link).collect())
            .unwrap_or_default()
    }

    fn open(&mut self, doc: &mut Document) -> Result<(), WidgetError> {
        let parent = require_parent(doc, self.target, Self::NAME)?;
        if let Some(class) = &self.options.active_class {
            doc.add_class(self.target, class)?;
        }

        let root = doc.create_element("div");
        doc.set_class_name(root, &self.options.popup_class)?;

        let skip = usize::from(self.has_placeholder);
        let mut links = Vec::new();
        for option in extract_options(doc, self.target)?.into_iter().skip(skip) {
            let link = doc.create_element("a");
            doc.set_text(link, &option.text)?;
            doc.append_child(root, link)?;
            links.push((link, option.value));
        }

        let field = doc.rect(self.target)?;
        let parent = doc.rect(parent)?;
        doc.set_style(root, "top", &px(field.bottom() - parent.top))?;
        doc.set_style(root, "left", &px(field.left - parent.left))?;
        doc.set_style(root, "width", &px(self.width))?;
        doc.insert_after(self.target, root)?;

        debug!(element = %self.target, options = links.len(), "select popup opened");
        self.popup = Some(OpenPopup { root, links });
        Ok(())
    }

    fn close(&mut self, doc: &mut Document) -> Result<(), WidgetError> {
        let Some(popup) = self.popup.take() else {
            return Ok(());
        };
        if doc.exists(self.target) {
            if let Some(class) = &self.options.active_class {
                doc.remove_class(self.target, class)?;
            }
        }
        if doc.exists(popup.root) {
            doc.destroy(popup.root)?;
        }
        debug!(element = %self.target, "select popup closed");
        Ok(())
    }

    fn commit(&mut self, doc: &mut Document, value: &str) -> Result<(), WidgetError> {
        doc.set_value(self.target, value)?;
        self.close(doc)?;
        doc.dispatch_change(self.target)?;
        debug!(element = %self.target, %value, "select popup committed");
        Ok(())
    }
}

/// Inserts `text` as a preselected first option unless an option is already
/// marked `selected`. Returns whether it inserted one.
fn add_placeholder(doc: &mut Document, select: ElementId, text: &str) -> Result<bool, WidgetError> {
    if has_preselected_option(doc, select)? {
        return Ok(false);
    }
    let placeholder = doc.create_element("option");
    doc.set_text(placeholder, text)?;
    doc.set_attribute(placeholder, "selected", "")?;
    let first = doc.get(select)?.children().first().copied();
    doc.insert_before(select, placeholder, first)?;
    doc.set_value(select, text)?;
    Ok(true)
}

impl Widget for SelectPopup {
    const NAME: &'static str = "SelectPopup";

    fn target(&self) -> ElementId {
        self.target
    }

    fn handle(&mut self, doc: &mut Document, event: &UiEvent) -> Result<EventFlow, WidgetError> {
        if self.listener.is_none() {
            return Ok(EventFlow::Ignored);
        }
        match *event {
            UiEvent::PointerDown(target) if target == self.target => {
                if self.is_open() {
                    self.close(doc)?;
                } else {
                    self.open(doc)?;
                }
                Ok(EventFlow::DefaultPrevented)
            }
            UiEvent::PointerDown(target) => {
                let outside = self
                    .popup
                    .as_ref()
                    .is_some_and(|popup| !doc.contains(popup.root, target));
                if !outside {
                    return Ok(EventFlow::Ignored);
                }
                self.close(doc)?;
                Ok(EventFlow::Handled)
            }
            UiEvent::Click(target) => {
                let value = self.popup.as_ref().and_then(|popup| {
                    popup
                        .links
                        .iter()
                        .find_map(|(link, value)| (*link == target).then(|| value.clone()))
                });
                let Some(value) = value else {
                    return Ok(EventFlow::Ignored);
                };
                self.commit(doc, &value)?;
                Ok(EventFlow::Handled)
            }
            UiEvent::PointerMove { .. } | UiEvent::Change(_) => Ok(EventFlow::Ignored),
        }
    }

    fn teardown(&mut self, doc: &mut Document) -> Result<(), WidgetError> {
        self.close(doc)?;
        if let Some(listener) = self.listener.take() {
            doc.release_listener(listener);
        }
        debug!(element = %self.target, "select popup detached");
        Ok(())
    }
}
