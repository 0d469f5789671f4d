use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use crate::calendar::date_state::DateState;
use crate::calendar::grid::{CalendarGrid, DayCell};
use crate::clock::Clock;
use crate::config::{
    CalendarClasses, CalendarOptions, Position, SELECT_POPUP_ACTIVE_CLASS, SELECT_POPUP_MARKER,
};
use crate::consts::{
    CALENDAR_BOTTOM_GAP, CALENDAR_HEADER_TEXT, CALENDAR_RIGHT_GAP, MARKER_ENABLED, MONTH_NAMES,
};
use crate::dom::{Document, ElementId, ListenerGuard, Point, Rect, UiEvent};
use crate::error::WidgetError;
use crate::widget::{EventFlow, Widget, px, require_parent, require_target};

/// Top-left corner of the popup relative to the host field's parent.
pub fn popup_offset(position: Position, field: Rect, parent: Rect) -> Point {
    match position {
        Position::Right => Point::new(
            field.right() - parent.left + CALENDAR_RIGHT_GAP,
            field.top - parent.top,
        ),
        Position::Behind => Point::new(
            field.left - parent.left,
            field.bottom() - parent.top + CALENDAR_BOTTOM_GAP,
        ),
    }
}

/// Nodes and state that only exist while the calendar is open.
#[derive(Debug)]
struct OpenCalendar {
    root: ElementId,
    days_container: ElementId,
    month_select: ElementId,
    year_select: ElementId,
    state: DateState,
    grid: CalendarGrid,
    /// Clickable day links and the day each one commits
    day_links: BTreeMap<ElementId, u32>,
    listener: ListenerGuard,
}

impl OpenCalendar {
    fn render(&mut self, doc: &mut Document, options: &CalendarOptions) -> Result<(), WidgetError> {
        self.populate_days(doc, &options.classes)?;
        self.populate_month_select(doc)?;
        self.populate_year_select(doc, options.future_years)
    }

    /// Rebuilds the day grid from scratch.
    fn populate_days(&mut self, doc: &mut Document, classes: &CalendarClasses) -> Result<(), WidgetError> {
        doc.clear_children(self.days_container)?;
        self.day_links.clear();

        if self.state.clamp_selection() {
            debug!(month = self.state.selected_month(), "clamped past month");
        }
        let grid = CalendarGrid::build(&self.state);

        for week in grid.rows() {
            let row = doc.create_element("div");
            doc.set_class_name(row, &classes.week_row)?;
            for cell in week {
                let (node, link) = render_cell(doc, cell, classes)?;
                if let (Some(link), Some(day)) = (link, cell.selectable_day()) {
                    self.day_links.insert(link, day);
                }
                doc.append_child(row, node)?;
            }
            doc.append_child(self.days_container, row)?;
        }
        self.grid = grid;
        Ok(())
    }

    fn populate_month_select(&self, doc: &mut Document) -> Result<(), WidgetError> {
        let selected = self.state.selected_month();
        let options = self
            .state
            .selectable_months()
            .map(|month| (month.to_string(), MONTH_NAMES[month as usize].to_owned(), month == selected));
        fill_select(doc, self.month_select, options)
    }

    fn populate_year_select(&self, doc: &mut Document, future_years: i32) -> Result<(), WidgetError> {
        let selected = self.state.selected_year();
        let options = self
            .state
            .selectable_years(future_years)
            .map(|year| (year.to_string(), year.to_string(), year == selected));
        fill_select(doc, self.year_select, options)
    }
}

/// One day cell: a `div`, holding an `a` with the day number unless blank.
/// Returns the cell and its link.
fn render_cell(
    doc: &mut Document,
    cell: &DayCell,
    classes: &CalendarClasses,
) -> Result<(ElementId, Option<ElementId>), WidgetError> {
    let node = doc.create_element("div");
    if cell.is_disabled() {
        doc.add_class(node, &classes.disabled_day)?;
    }
    let Some(day) = cell.day() else {
        return Ok((node, None));
    };
    let link = doc.create_element("a");
    doc.set_text(link, &day.to_string())?;
    doc.append_child(node, link)?;
    Ok((node, Some(link)))
}

/// Replaces the options of `select` with `(value, text, selected)` triples.
fn fill_select<I>(doc: &mut Document, select: ElementId, options: I) -> Result<(), WidgetError>
where
    I: IntoIterator<Item = (String, String, bool)>,
{
    doc.clear_children(select)?;
    let mut value = String::new();
    for (option_value, text, selected) in options {
        let option = doc.create_element("option");
        doc.set_attribute(option, "value", &option_value)?;
        doc.set_text(option, &text)?;
        if selected {
            doc.set_attribute(option, "selected", "")?;
            value = option_value;
        }
        doc.append_child(select, option)?;
    }
    doc.set_value(select, &value)?;
    Ok(())
}

/// Date picker bound to a text field.
///
/// A click on the field opens a popup with a month grid and month/year
/// selectors. Clicking an enabled day writes `{day}/{month}/{year}` into the
/// field and closes the popup.
pub struct Calendar {
    target: ElementId,
    options: CalendarOptions,
    clock: Rc<dyn Clock>,
    open: Option<OpenCalendar>,
}

impl std::fmt::Debug for Calendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Calendar")
            .field("target", &self.target)
            .field("options", &self.options)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

impl Calendar {
    /// Binds a calendar to `target`, which must be attached to a parent.
    ///
    /// # Errors
    /// Returns `WidgetError::MissingTarget` if `target` is not in the document
    /// and `WidgetError::Detached` if it has no parent.
    pub fn new(
        doc: &mut Document,
        target: ElementId,
        options: CalendarOptions,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, WidgetError> {
        require_target(doc, target, Self::NAME)?;
        let parent = require_parent(doc, target, Self::NAME)?;
        doc.set_style(parent, "position", "relative")?;
        debug!(element = %target, position = %options.position, "calendar attached");
        Ok(Self {
            target,
            options,
            clock,
            open: None,
        })
    }

    pub const fn options(&self) -> &CalendarOptions {
        &self.options
    }

    pub const fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Month/year being shown, while open
    pub fn state(&self) -> Option<&DateState> {
        self.open.as_ref().map(|open| &open.state)
    }

    /// Day grid being shown, while open
    pub fn grid(&self) -> Option<&CalendarGrid> {
        self.open.as_ref().map(|open| &open.grid)
    }

    /// Root node of the popup, while open
    pub fn popup(&self) -> Option<ElementId> {
        self.open.as_ref().map(|open| open.root)
    }

    pub fn month_select(&self) -> Option<ElementId> {
        self.open.as_ref().map(|open| open.month_select)
    }

    pub fn year_select(&self) -> Option<ElementId> {
        self.open.as_ref().map(|open| open.year_select)
    }

    /// Link that commits `day`, if the day is shown and enabled
    pub fn day_link(&self, day: u32) -> Option<ElementId> {
        self.open.as_ref().and_then(|open| {
            open.day_links
                .iter()
                .find_map(|(&link, &d)| (d == day).then_some(link))
        })
    }

    /// Opens the popup. Does nothing if already open.
    ///
    /// # Errors
    /// Returns `WidgetError::Detached` if the field lost its parent.
    pub fn open(&mut self, doc: &mut Document) -> Result<(), WidgetError> {
        if self.open.is_some() {
            return Ok(());
        }
        let classes = &self.options.classes;

        let mut state = DateState::new(self.clock.today());
        state.parse_host_value(doc.value(self.target)?);

        let parent = require_parent(doc, self.target, Self::NAME)?;
        let offset = popup_offset(self.options.position, doc.rect(self.target)?, doc.rect(parent)?);

        let root = doc.create_element("div");
        doc.set_class_name(root, &classes.calendar)?;
        doc.set_style(root, "top", &px(offset.y))?;
        doc.set_style(root, "left", &px(offset.x))?;
        doc.insert_after(self.target, root)?;

        let header = doc.create_element("div");
        doc.set_class_name(header, &classes.header)?;
        doc.set_text(header, CALENDAR_HEADER_TEXT)?;
        doc.append_child(root, header)?;

        let days_container = doc.create_element("div");
        doc.set_class_name(days_container, &classes.days_container)?;
        doc.append_child(root, days_container)?;

        let toolbar = doc.create_element("div");
        doc.set_class_name(toolbar, &classes.toolbar)?;
        let month_select = create_toolbar_select(doc, classes)?;
        let year_select = create_toolbar_select(doc, classes)?;
        doc.append_child(toolbar, month_select)?;
        doc.append_child(toolbar, year_select)?;
        doc.append_child(root, toolbar)?;

        let mut open = OpenCalendar {
            root,
            days_container,
            month_select,
            year_select,
            grid: CalendarGrid::build(&state),
            state,
            day_links: BTreeMap::new(),
            listener: doc.listen_pointer_down(),
        };
        let rendered = open.render(doc, &self.options);

        debug!(
            element = %self.target,
            year = open.state.selected_year(),
            month = open.state.selected_month(),
            "calendar opened"
        );
        self.open = Some(open);
        if let Err(err) = rendered {
            self.close(doc)?;
            return Err(err);
        }
        Ok(())
    }

    /// Closes the popup, removing its nodes and releasing its listener.
    /// Does nothing if already closed.
    ///
    /// # Errors
    /// Returns `WidgetError::Dom` if the popup nodes cannot be removed.
    pub fn close(&mut self, doc: &mut Document) -> Result<(), WidgetError> {
        let Some(OpenCalendar { root, listener, .. }) = self.open.take() else {
            return Ok(());
        };
        doc.release_listener(listener);
        if doc.exists(root) {
            doc.destroy(root)?;
        }
        debug!(element = %self.target, "calendar closed");
        Ok(())
    }

    /// Opens when closed, closes when open.
    ///
    /// # Errors
    /// Propagates errors from [`Calendar::open`] and [`Calendar::close`].
    pub fn toggle(&mut self, doc: &mut Document) -> Result<(), WidgetError> {
        if self.is_open() {
            self.close(doc)
        } else {
            self.open(doc)
        }
    }

    /// Writes `day` of the shown month into the field, closes and notifies
    /// listeners of the field with a `change` event.
    fn commit(&mut self, doc: &mut Document, day: u32) -> Result<(), WidgetError> {
        let Some(open) = &self.open else {
            return Ok(());
        };
        let value = open.state.format_day(day);
        doc.set_value(self.target, &value)?;
        self.close(doc)?;
        doc.dispatch_change(self.target)?;
        debug!(element = %self.target, %value, "calendar date committed");
        Ok(())
    }

    fn change_month(&mut self, doc: &mut Document) -> Result<(), WidgetError> {
        let Some(open) = self.open.as_mut() else {
            return Ok(());
        };
        if let Ok(month) = doc.value(open.month_select)?.parse::<u32>() {
            open.state.select_month(month);
        }
        open.populate_days(doc, &self.options.classes)
    }

    fn change_year(&mut self, doc: &mut Document) -> Result<(), WidgetError> {
        let Some(open) = self.open.as_mut() else {
            return Ok(());
        };
        if let Ok(year) = doc.value(open.year_select)?.parse::<i32>() {
            open.state.select_year(year);
        }
        open.populate_days(doc, &self.options.classes)?;
        open.populate_month_select(doc)
    }
}

/// Month/year `<select>` for the toolbar, marked so a select popup manager
/// picks it up.
fn create_toolbar_select(doc: &mut Document, classes: &CalendarClasses) -> Result<ElementId, WidgetError> {
    let select = doc.create_element("select");
    doc.set_class_name(select, &classes.select)?;
    doc.set_style(select, "appearance", "none")?;
    doc.set_attribute(select, SELECT_POPUP_MARKER, MARKER_ENABLED)?;
    doc.set_attribute(select, SELECT_POPUP_ACTIVE_CLASS, &classes.select_active)?;
    Ok(select)
}

impl Widget for Calendar {
    const NAME: &'static str = "Calendar";

    fn target(&self) -> ElementId {
        self.target
    }

    fn handle(&mut self, doc: &mut Document, event: &UiEvent) -> Result<EventFlow, WidgetError> {
        match *event {
            UiEvent::Click(target) if target == self.target => {
                self.toggle(doc)?;
                Ok(EventFlow::Handled)
            }
            UiEvent::Click(target) => {
                let day = self
                    .open
                    .as_ref()
                    .and_then(|open| open.day_links.get(&target).copied());
                match day {
                    Some(day) => {
                        self.commit(doc, day)?;
                        Ok(EventFlow::Handled)
                    }
                    None => Ok(EventFlow::Ignored),
                }
            }
            // The field itself is not "outside": its click toggles instead.
            UiEvent::PointerDown(target) => {
                let outside = self.open.as_ref().is_some_and(|open| {
                    target != self.target && !doc.contains(open.root, target)
                });
                if !outside {
                    return Ok(EventFlow::Ignored);
                }
                self.close(doc)?;
                Ok(EventFlow::Handled)
            }
            UiEvent::Change(target) => {
                let selects = self
                    .open
                    .as_ref()
                    .map(|open| (open.month_select, open.year_select));
                match selects {
                    Some((month_select, _)) if target == month_select => self.change_month(doc)?,
                    Some((_, year_select)) if target == year_select => self.change_year(doc)?,
                    _ => return Ok(EventFlow::Ignored),
                }
                Ok(EventFlow::Handled)
            }
            UiEvent::PointerMove { .. } => Ok(EventFlow::Ignored),
        }
    }

    fn teardown(&mut self, doc: &mut Document) -> Result<(), WidgetError> {
        self.close(doc)
    }
}
