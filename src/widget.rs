use crate::dom::{Document, ElementId, UiEvent};
use crate::error::WidgetError;

/// What a widget did with an event.
///
/// Ordered so that merging the outcomes of several widgets keeps the
/// strongest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EventFlow {
    /// The event was not meant for this widget
    #[default]
    Ignored,
    /// The widget reacted to the event
    Handled,
    /// The widget reacted and the host must suppress the native default
    /// action (e.g. the browser's own select popup)
    DefaultPrevented,
}

impl EventFlow {
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        self.max(other)
    }
}

/// Behavior attached to one host element.
pub trait Widget {
    /// Name used in errors and logs
    const NAME: &'static str;

    /// The host element the widget is attached to
    fn target(&self) -> ElementId;

    /// Reacts to one input event. Events for other elements are ignored.
    ///
    /// # Errors
    /// Returns `WidgetError` if the document no longer holds an element the
    /// widget relies on.
    fn handle(&mut self, doc: &mut Document, event: &UiEvent) -> Result<EventFlow, WidgetError>;

    /// Releases document-level listeners and removes transient nodes.
    ///
    /// # Errors
    /// Returns `WidgetError` if the document rejects the cleanup.
    fn teardown(&mut self, doc: &mut Document) -> Result<(), WidgetError>;
}

/// Fails with `MissingTarget` unless `element` is live in `doc`.
pub(crate) fn require_target(
    doc: &Document,
    element: ElementId,
    widget: &'static str,
) -> Result<(), WidgetError> {
    if doc.exists(element) {
        Ok(())
    } else {
        Err(WidgetError::MissingTarget { widget, element })
    }
}

/// Parent of `element`, or `Detached` if it has none.
pub(crate) fn require_parent(
    doc: &Document,
    element: ElementId,
    widget: &'static str,
) -> Result<ElementId, WidgetError> {
    doc.get(element)?
        .parent()
        .ok_or(WidgetError::Detached { widget, element })
}

/// CSS pixel length
pub(crate) fn px(value: f64) -> String {
    format!("{value}px")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_flow_merge_keeps_strongest() {
        assert_eq!(EventFlow::Ignored.merge(EventFlow::Handled), EventFlow::Handled);
        assert_eq!(
            EventFlow::DefaultPrevented.merge(EventFlow::Handled),
            EventFlow::DefaultPrevented
        );
        assert_eq!(EventFlow::default(), EventFlow::Ignored);
    }

    #[test]
    fn test_require_target_and_parent() {
        let mut doc = Document::new();
        let input = doc.create_element("input");
        assert!(require_target(&doc, input, "Test").is_ok());
        assert_eq!(
            require_parent(&doc, input, "Test"),
            Err(WidgetError::Detached {
                widget: "Test",
                element: input
            })
        );

        doc.append_child(doc.body(), input).unwrap();
        assert_eq!(require_parent(&doc, input, "Test"), Ok(doc.body()));

        doc.destroy(input).unwrap();
        assert_eq!(
            require_target(&doc, input, "Test"),
            Err(WidgetError::MissingTarget {
                widget: "Test",
                element: input
            })
        );
    }

    #[test]
    fn test_px() {
        assert_eq!(px(10.0), "10px");
        assert_eq!(px(12.5), "12.5px");
        assert_eq!(px(-3.0), "-3px");
    }
}
