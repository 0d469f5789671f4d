//! Marker-driven attachment of widgets to host elements.
//!
//! A manager owns every widget of one kind, keyed by the element it is bound
//! to. The host calls [`AttachManager::attach`] with the root of any subtree it
//! inserted and [`AttachManager::detach`] with the root of any subtree it
//! removed; the registry alone decides whether an element already has a
//! widget, so the host element is never marked.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::calendar::Calendar;
use crate::chart::{Chart, ChartStyle};
use crate::clock::{Clock, SystemClock};
use crate::config::{
    CALENDAR_MARKER, CHART_DATA_NUMBERS, CHART_HEIGHT, CHART_LABELS, CHART_MARKER, CHART_WIDTH,
    CalendarOptions, ChartOptions, SELECT_POPUP_MARKER, SELECT_TABS_MARKER, SelectPopupOptions,
    SelectTabsOptions,
};
use crate::consts::MARKER_ENABLED;
use crate::dom::{Document, ElementId, UiEvent};
use crate::error::WidgetError;
use crate::select_popup::SelectPopup;
use crate::select_tabs::SelectTabs;
use crate::widget::{EventFlow, Widget};

/// True if `element` is a `tag` element whose `marker` attribute is `"true"`.
pub fn is_marked(doc: &Document, element: ElementId, tag: &str, marker: &str) -> bool {
    doc.get(element)
        .is_ok_and(|e| e.is(tag) && e.attribute(marker) == Some(MARKER_ENABLED))
}

/// A widget that can be discovered and configured from marker attributes.
pub trait AutoAttach: Widget + Sized {
    /// Shared state handed to every widget the manager builds
    type Context;

    /// Tag of the elements this widget binds to
    const TAG: &'static str;
    /// Attribute that must be `"true"` for the widget to attach
    const MARKER: &'static str;

    fn matches(doc: &Document, element: ElementId) -> bool {
        is_marked(doc, element, Self::TAG, Self::MARKER)
    }

    /// Builds the widget from the element's configuration attributes.
    ///
    /// # Errors
    /// Returns the widget's construction error.
    fn from_element(
        doc: &mut Document,
        element: ElementId,
        context: &Self::Context,
    ) -> Result<Self, WidgetError>;
}

impl AutoAttach for Calendar {
    type Context = Rc<dyn Clock>;

    const TAG: &'static str = "input";
    const MARKER: &'static str = CALENDAR_MARKER;

    fn from_element(
        doc: &mut Document,
        element: ElementId,
        clock: &Self::Context,
    ) -> Result<Self, WidgetError> {
        let options = CalendarOptions::from_element(doc, element);
        Self::new(doc, element, options, Rc::clone(clock))
    }
}

impl AutoAttach for SelectPopup {
    type Context = ();

    const TAG: &'static str = "select";
    const MARKER: &'static str = SELECT_POPUP_MARKER;

    fn from_element(doc: &mut Document, element: ElementId, _: &()) -> Result<Self, WidgetError> {
        let options = SelectPopupOptions::from_element(doc, element);
        Self::new(doc, element, options)
    }
}

impl AutoAttach for SelectTabs {
    type Context = ();

    const TAG: &'static str = "select";
    const MARKER: &'static str = SELECT_TABS_MARKER;

    fn from_element(doc: &mut Document, element: ElementId, _: &()) -> Result<Self, WidgetError> {
        let options = SelectTabsOptions::from_element(doc, element);
        Self::new(doc, element, options)
    }
}

impl AutoAttach for Chart {
    type Context = ChartStyle;

    const TAG: &'static str = "div";
    const MARKER: &'static str = CHART_MARKER;

    /// Charts also need every data attribute present (empty is allowed).
    fn matches(doc: &Document, element: ElementId) -> bool {
        is_marked(doc, element, Self::TAG, Self::MARKER)
            && [CHART_WIDTH, CHART_HEIGHT, CHART_LABELS, CHART_DATA_NUMBERS]
                .iter()
                .all(|name| doc.attribute(element, name).is_some())
    }

    fn from_element(
        doc: &mut Document,
        element: ElementId,
        style: &Self::Context,
    ) -> Result<Self, WidgetError> {
        let options = ChartOptions::from_element(doc, element);
        Self::new(doc, element, options, style.clone())
    }
}

/// Registry of the widgets of one kind, keyed by host element.
pub struct AttachManager<W: AutoAttach> {
    context: W::Context,
    widgets: BTreeMap<ElementId, W>,
}

pub type CalendarManager = AttachManager<Calendar>;
pub type SelectPopupManager = AttachManager<SelectPopup>;
pub type SelectTabsManager = AttachManager<SelectTabs>;
pub type ChartManager = AttachManager<Chart>;

impl<W: AutoAttach> fmt::Debug for AttachManager<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachManager")
            .field("widget", &W::NAME)
            .field("elements", &self.widgets.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<W: AutoAttach> Default for AttachManager<W>
where
    W::Context: Default,
{
    fn default() -> Self {
        Self::with_context(W::Context::default())
    }
}

impl<W: AutoAttach> AttachManager<W>
where
    W::Context: Default,
{
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttachManager<Calendar> {
    /// Calendar manager reading "today" from the local clock
    pub fn with_system_clock() -> Self {
        Self::with_context(Rc::new(SystemClock))
    }
}

impl<W: AutoAttach> AttachManager<W> {
    pub fn with_context(context: W::Context) -> Self {
        Self {
            context,
            widgets: BTreeMap::new(),
        }
    }

    /// Attaches a widget to every unregistered marked element in the subtree
    /// of `root`, `root` included. Returns how many were attached.
    ///
    /// # Errors
    /// Stops at the first construction error. Widgets attached before it stay
    /// registered.
    pub fn attach(&mut self, doc: &mut Document, root: ElementId) -> Result<usize, WidgetError> {
        let view: &Document = doc;
        let candidates: Vec<ElementId> = view
            .query(root, |_| true)
            .into_iter()
            .filter(|&element| !self.widgets.contains_key(&element) && W::matches(view, element))
            .collect();

        for &element in &candidates {
            let widget = W::from_element(doc, element, &self.context)?;
            self.widgets.insert(element, widget);
        }
        if !candidates.is_empty() {
            debug!(
                widget = W::NAME,
                %root,
                attached = candidates.len(),
                total = self.widgets.len(),
                "widgets attached"
            );
        }
        Ok(candidates.len())
    }

    /// Tears down and forgets every widget bound inside the subtree of `root`,
    /// along with any whose element no longer exists. Returns how many were
    /// detached.
    ///
    /// # Errors
    /// Stops at the first teardown error. That widget is already unregistered.
    pub fn detach(&mut self, doc: &mut Document, root: ElementId) -> Result<usize, WidgetError> {
        let doomed: Vec<ElementId> = self
            .widgets
            .keys()
            .copied()
            .filter(|&element| !doc.exists(element) || doc.contains(root, element))
            .collect();

        for element in &doomed {
            if let Some(mut widget) = self.widgets.remove(element) {
                widget.teardown(doc)?;
                debug!(widget = W::NAME, %element, "widget detached");
            }
        }
        Ok(doomed.len())
    }

    /// Tears down every widget.
    ///
    /// # Errors
    /// Stops at the first teardown error.
    pub fn detach_all(&mut self, doc: &mut Document) -> Result<(), WidgetError> {
        while let Some((_, mut widget)) = self.widgets.pop_first() {
            widget.teardown(doc)?;
        }
        Ok(())
    }

    /// Forwards `event` to every widget and returns the strongest outcome.
    ///
    /// # Errors
    /// Stops at the first widget error.
    pub fn dispatch(&mut self, doc: &mut Document, event: &UiEvent) -> Result<EventFlow, WidgetError> {
        let mut flow = EventFlow::Ignored;
        for widget in self.widgets.values_mut() {
            flow = flow.merge(widget.handle(doc, event)?);
        }
        Ok(flow)
    }

    pub fn get(&self, element: ElementId) -> Option<&W> {
        self.widgets.get(&element)
    }

    pub fn get_mut(&mut self, element: ElementId) -> Option<&mut W> {
        self.widgets.get_mut(&element)
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.widgets.contains_key(&element)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Registered host elements in id order
    pub fn elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.widgets.keys().copied()
    }
}
