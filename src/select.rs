//! Reading `<option>` lists off host select elements.

use crate::dom::{Document, Element, ElementId};
use crate::error::WidgetError;

/// One `<option>` of a host select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub element: ElementId,
    pub value: String,
    pub text: String,
    pub active: bool,
}

/// An option's value: its `value` attribute, or its text when it has none.
pub fn option_value(option: &Element) -> &str {
    option.attribute("value").unwrap_or_else(|| option.text())
}

/// Fails with `NotASelect` unless `element` is a `<select>`.
///
/// # Errors
/// Returns `WidgetError::NotASelect` for other elements and
/// `WidgetError::Dom` for stale ids.
pub fn require_select(doc: &Document, element: ElementId) -> Result<(), WidgetError> {
    if doc.get(element)?.is("select") {
        Ok(())
    } else {
        Err(WidgetError::NotASelect(element))
    }
}

/// `<option>` elements of a select in document order (including those in
/// `<optgroup>`s).
fn option_elements(doc: &Document, select: ElementId) -> Vec<ElementId> {
    doc.query(select, |element| element.is("option"))
}

/// True if any option carries the `selected` attribute.
///
/// # Errors
/// Returns `WidgetError::NotASelect` if `element` is not a select.
pub fn has_preselected_option(doc: &Document, element: ElementId) -> Result<bool, WidgetError> {
    require_select(doc, element)?;
    Ok(option_elements(doc, element)
        .into_iter()
        .any(|option| doc.get(option).is_ok_and(|o| o.has_attribute("selected"))))
}

/// Index of the option the select currently shows: the one matching the
/// select's value, else the last option marked `selected`, else the first.
fn selected_index(doc: &Document, select: ElementId, options: &[ElementId]) -> Option<usize> {
    let value = doc.value(select).unwrap_or_default();
    let by_value = options
        .iter()
        .position(|&o| !value.is_empty() && doc.get(o).is_ok_and(|e| option_value(e) == value));
    by_value
        .or_else(|| {
            options
                .iter()
                .rposition(|&o| doc.get(o).is_ok_and(|e| e.has_attribute("selected")))
        })
        .or_else(|| (!options.is_empty()).then_some(0))
}

/// Options of `select` with the currently shown one marked active.
///
/// # Errors
/// Returns `WidgetError::NotASelect` if `select` is not a select.
pub fn extract_options(doc: &Document, select: ElementId) -> Result<Vec<SelectOption>, WidgetError> {
    require_select(doc, select)?;
    let elements = option_elements(doc, select);
    let active = selected_index(doc, select, &elements);
    elements
        .iter()
        .enumerate()
        .map(|(index, &element)| -> Result<SelectOption, WidgetError> {
            let option = doc.get(element)?;
            Ok(SelectOption {
                element,
                value: option_value(option).to_owned(),
                text: option.text().to_owned(),
                active: Some(index) == active,
            })
        })
        .collect()
}
