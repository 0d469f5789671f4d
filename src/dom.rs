//! In-memory document model the widgets render into.
//!
//! The host mirrors its form elements here (tag, attributes, value and the
//! bounding box it laid them out at), forwards input as [`UiEvent`]s, and reads
//! back whatever the widgets created. Layout is never computed: rectangles are
//! whatever the host last stored with [`Document::set_rect`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{error::DomError, prelude::*};

/// Identity of an element in a [`Document`].
///
/// Slots of destroyed elements are recycled, but each reuse bumps the slot's
/// generation, so an id never names two different elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "#{index}:{generation}")]
pub struct ElementId {
    index: usize,
    generation: u32,
}

/// A point in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding box of an element, in viewport coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// A single node of the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    style: BTreeMap<String, String>,
    text: String,
    value: String,
    rect: Rect,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Space-separated class list, like `className`
    pub fn class_name(&self) -> String {
        self.classes.join(" ")
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub const fn rect(&self) -> Rect {
        self.rect
    }

    pub const fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

/// Input delivered by the host to the widgets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    /// Primary click that completed on `target`.
    Click(ElementId),
    /// Pointer pressed on `target` (fires before the click).
    PointerDown(ElementId),
    /// Pointer moved over `target`.
    PointerMove {
        target: ElementId,
        client: Point,
        page: Point,
    },
    /// The host committed a new value on a form control.
    Change(ElementId),
}

impl UiEvent {
    pub const fn target(&self) -> ElementId {
        match *self {
            Self::Click(target)
            | Self::PointerDown(target)
            | Self::Change(target)
            | Self::PointerMove { target, .. } => target,
        }
    }
}

/// Kind of a synthetic event dispatched by a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EventKind {
    #[display(fmt = "change")]
    Change,
}

/// A synthetic event a widget dispatched on a host element, for the host to
/// replay onto its native element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchedEvent {
    pub target: ElementId,
    pub kind: EventKind,
    pub bubbles: bool,
    pub cancelable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "listener-{_0}")]
pub struct ListenerId(u64);

/// Registration of a document-level pointer-down listener.
///
/// The only way to unregister is [`Document::release_listener`], which
/// consumes the guard.
#[derive(Debug)]
#[must_use = "a listener stays registered until its guard is handed back to the document"]
pub struct ListenerGuard {
    id: ListenerId,
    released: bool,
}

impl ListenerGuard {
    pub const fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if !self.released {
            warn!(listener = %self.id, "listener guard dropped without release");
        }
    }
}

/// Arena slot. `element` is `None` once destroyed, until the slot is reused.
#[derive(Debug)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

/// Arena of elements rooted at a `body` element.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Slot>,
    /// Indices of destroyed slots, reused last-in first-out
    free: Vec<usize>,
    body: ElementId,
    listeners: BTreeSet<ListenerId>,
    next_listener: u64,
    events: Vec<DispatchedEvent>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Slot {
                generation: 0,
                element: Some(Element::new("body")),
            }],
            free: Vec::new(),
            body: ElementId {
                index: 0,
                generation: 0,
            },
            listeners: BTreeSet::new(),
            next_listener: 0,
            events: Vec::new(),
        }
    }

    pub const fn body(&self) -> ElementId {
        self.body
    }

    /// Creates a detached element, reusing a destroyed slot when one is free.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let element = Some(Element::new(tag));
        if let Some(index) = self.free.pop() {
            if let Some(slot) = self.nodes.get_mut(index) {
                slot.element = element;
                return ElementId {
                    index,
                    generation: slot.generation,
                };
            }
        }
        self.nodes.push(Slot {
            generation: 0,
            element,
        });
        ElementId {
            index: self.nodes.len() - 1,
            generation: 0,
        }
    }

    /// Returns the element, or `DomError::UnknownElement` for a stale id.
    ///
    /// # Errors
    /// Returns `DomError::UnknownElement` if the id was destroyed or never created.
    pub fn get(&self, id: ElementId) -> Result<&Element, DomError> {
        self.nodes
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_ref())
            .ok_or(DomError::UnknownElement(id))
    }

    fn get_mut(&mut self, id: ElementId) -> Result<&mut Element, DomError> {
        self.nodes
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_mut())
            .ok_or(DomError::UnknownElement(id))
    }

    /// True if `id` names a live (not destroyed) element
    pub fn exists(&self, id: ElementId) -> bool {
        self.get(id).is_ok()
    }

    /// Number of live elements, connected or not
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.element.is_some()).count()
    }

    /// Number of arena slots, live or free. Stays flat while creations are
    /// balanced by destructions.
    pub fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    /// Appends `child` as the last child of `parent`, moving it if attached elsewhere.
    ///
    /// # Errors
    /// Returns `DomError::UnknownElement` if either id is stale.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Inserts `child` under `parent` before `reference`, or last when `reference` is `None`
    /// or not a child of `parent`.
    ///
    /// # Errors
    /// Returns `DomError::UnknownElement` if either id is stale.
    pub fn insert_before(
        &mut self,
        parent: ElementId,
        child: ElementId,
        reference: Option<ElementId>,
    ) -> Result<(), DomError> {
        self.get(parent)?;
        self.unlink(child)?;
        let siblings = &mut self.get_mut(parent)?.children;
        let index = reference
            .and_then(|r| siblings.iter().position(|&c| c == r))
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Inserts `child` right after `reference` in the reference's parent.
    /// Returns `false` (and leaves `child` untouched) if `reference` has no parent.
    ///
    /// # Errors
    /// Returns `DomError::UnknownElement` if either id is stale.
    pub fn insert_after(&mut self, reference: ElementId, child: ElementId) -> Result<bool, DomError> {
        let Some(parent) = self.get(reference)?.parent else {
            return Ok(false);
        };
        let next = {
            let siblings = &self.get(parent)?.children;
            siblings
                .iter()
                .position(|&c| c == reference)
                .and_then(|i| siblings.get(i + 1).copied())
        };
        self.insert_before(parent, child, next)?;
        Ok(true)
    }

    fn unlink(&mut self, id: ElementId) -> Result<(), DomError> {
        if let Some(parent) = self.get_mut(id)?.parent.take() {
            self.get_mut(parent)?.children.retain(|&c| c != id);
        }
        Ok(())
    }

    /// Detaches `id` from its parent. The subtree stays alive, so it can be
    /// re-inserted or scanned afterwards.
    ///
    /// # Errors
    /// Returns `DomError::UnknownElement` if the id is stale.
    pub fn remove(&mut self, id: ElementId) -> Result<(), DomError> {
        self.unlink(id)
    }

    /// Detaches `id` and frees it together with its whole subtree.
    ///
    /// # Errors
    /// Returns `DomError::UnknownElement` if the id is stale.
    pub fn destroy(&mut self, id: ElementId) -> Result<(), DomError> {
        self.unlink(id)?;
        for node in self.descendants(id) {
            if let Some(slot) = self.nodes.get_mut(node.index) {
                slot.element = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(node.index);
            }
        }
        Ok(())
    }

    /// Destroys every child of `id`, like assigning an empty `innerHTML`.
    ///
    /// # Errors
    /// Returns `DomError::UnknownElement` if the id is stale.
    pub fn clear_children(&mut self, id: ElementId) -> Result<(), DomError> {
        let children = self.get(id)?.children.clone();
        for child in children {
            self.destroy(child)?;
        }
        Ok(())
    }

    /// Inclusive containment: true if `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).ok().and_then(Element::parent);
        }
        false
    }

    /// True if the element is reachable from `body`
    pub fn is_connected(&self, id: ElementId) -> bool {
        self.exists(id) && self.contains(self.body, id)
    }

    /// `root` and all of its descendants in document order. Empty for a stale root.
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Ok(element) = self.get(id) else {
                continue;
            };
            out.push(id);
            stack.extend(element.children.iter().rev());
        }
        out
    }

    /// Elements in the subtree of `root` (inclusive) accepted by `predicate`.
    pub fn query<F>(&self, root: ElementId, predicate: F) -> Vec<ElementId>
    where
        F: Fn(&Element) -> bool,
    {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.get(id).is_ok_and(&predicate))
            .collect()
    }

    /// Attribute lookup that treats stale ids as having no attributes
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.get(id).ok().and_then(|e| e.attribute(name))
    }

    /// # Errors
    /// Returns `DomError::UnknownElement` if the id is stale.
    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<(), DomError> {
        self.get_mut(id)?
            .attributes
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    /// # Errors
    /// Returns `DomError::UnknownElement` if the id is stale.
    pub fn add_class(&mut self, id: ElementId, class: &str) -> Result<(), DomError> {
        let element = self.get_mut(id)?;
        if !class.is_empty() && !element.has_class(class) {
            element.classes.push(class.to_owned());
        }
        Ok(())
    }

    /// # Errors
    /// Returns `DomError::UnknownElement` if the id is stale.
    pub fn remove_class(&mut self, id: ElementId, class: &str) -> Result<(), DomError> {
        self.get_mut(id)?.classes.retain(|c| c != class);
        Ok(())
    }

    /// Replaces the class list with the whitespace-separated `class_name`.
    ///
    /// # Errors
    /// Returns `DomError::UnknownElement` if the id is stale.
    pub fn set_class_name(&mut self, id: ElementId, class_name: &str) -> Result<(), DomError> {
        self.get_mut(id)?.classes = class_name.split_whitespace().map(str::to_owned).collect();
        Ok(())
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.get(id).is_ok_and(|e| e.has_class(class))
    }

    /// # Errors
    /// Returns `DomError::UnknownElement` if the id is stale.
    pub fn set_style(&mut self, id: ElementId, property: &str, value: &str) -> Result<(), DomError> {
        self.get_mut(id)?
            .style
            .insert(property.to_owned(), value.to_owned());
        Ok(())
    }

    /// # Errors
    /// Returns `DomError::UnknownElement` if the id is stale.
    pub fn remove_style(&mut self, id: ElementId, property: &str) -> Result<(), DomError> {
        self.get_mut(id)?.style.remove(property);
        Ok(())
    }

    pub fn style(&self, id: ElementId, property: &str) -> Option<&str> {
        self.get(id).ok().and_then(|e| e.style(property))
    }

    /// # Errors
    /// Returns `DomError::UnknownElement` if the id is stale.
    pub fn set_text(&mut self, id: ElementId, text: &str) -> Result<(), DomError> {
        text.clone_into(&mut self.get_mut(id)?.text);
        Ok(())
    }

    /// # Errors
    /// Returns `DomError::UnknownElement` if the id is stale.
    pub fn set_value(&mut self, id: ElementId, value: &str) -> Result<(), DomError> {
        value.clone_into(&mut self.get_mut(id)?.value);
        Ok(())
    }

    /// # Errors
    /// Returns `DomError::UnknownElement` if the id is stale.
    pub fn value(&self, id: ElementId) -> Result<&str, DomError> {
        Ok(self.get(id)?.value())
    }

    /// Stores the bounding box the host laid the element out at.
    ///
    /// # Errors
    /// Returns `DomError::UnknownElement` if the id is stale.
    pub fn set_rect(&mut self, id: ElementId, rect: Rect) -> Result<(), DomError> {
        self.get_mut(id)?.rect = rect;
        Ok(())
    }

    /// # Errors
    /// Returns `DomError::UnknownElement` if the id is stale.
    pub fn rect(&self, id: ElementId) -> Result<Rect, DomError> {
        Ok(self.get(id)?.rect)
    }

    /// Registers a document-level pointer-down listener.
    pub fn listen_pointer_down(&mut self) -> ListenerGuard {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id);
        ListenerGuard {
            id,
            released: false,
        }
    }

    /// Unregisters the listener owned by `guard`.
    pub fn release_listener(&mut self, mut guard: ListenerGuard) {
        self.listeners.remove(&guard.id);
        guard.released = true;
    }

    pub fn is_listening(&self, guard: &ListenerGuard) -> bool {
        self.listeners.contains(&guard.id)
    }

    /// Number of registered document-level listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Records a bubbling, cancelable `change` event on `target`.
    ///
    /// # Errors
    /// Returns `DomError::UnknownElement` if the id is stale.
    pub fn dispatch_change(&mut self, target: ElementId) -> Result<(), DomError> {
        self.get(target)?;
        self.events.push(DispatchedEvent {
            target,
            kind: EventKind::Change,
            bubbles: true,
            cancelable: true,
        });
        Ok(())
    }

    /// Events dispatched since the last [`Document::take_events`]
    pub fn events(&self) -> &[DispatchedEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<DispatchedEvent> {
        std::mem::take(&mut self.events)
    }
}
