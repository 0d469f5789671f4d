use crate::dom::ElementId;

/// Error type for document operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The id does not name a live element (never created, or destroyed).
    #[error("Unknown element: {0}")]
    UnknownElement(ElementId),
}

/// Error type for widget construction and event handling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    /// The target element is not present in the document.
    #[error("{widget}: target element {element} is required")]
    MissingTarget { widget: &'static str, element: ElementId },

    /// The target element has no parent to anchor generated nodes to.
    #[error("{widget}: target element {element} is not attached to a parent")]
    Detached { widget: &'static str, element: ElementId },

    /// A select-only operation was invoked on another kind of element.
    #[error("Provided element {0} is not a select element")]
    NotASelect(ElementId),

    /// Error from the underlying document.
    #[error(transparent)]
    Dom(#[from] DomError),
}
