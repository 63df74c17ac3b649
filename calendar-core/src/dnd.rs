//! Drag-and-drop rescheduling: which date a drop landed on, and the event
//! that results from moving there.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;

use crate::dates::parse_date;
use crate::Event;

/// Attribute every drop target (or one of its ancestors) carries.
pub const DATE_ATTRIBUTE: &str = "data-date";

/// Drag payload key under which the dragged event's id travels.
pub const EVENT_ID_KEY: &str = "eventId";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEffect {
    None,
    Copy,
    Link,
    Move,
}

impl fmt::Display for DropEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Copy => "copy",
            Self::Link => "link",
            Self::Move => "move",
        })
    }
}

/// A node in a calendar grid that can be walked towards the root.
pub trait DropTarget: Sized {
    fn attribute(&self, name: &str) -> Option<String>;

    fn parent(&self) -> Option<Self>;
}

pub trait DropEvent {
    type Target: DropTarget;

    fn prevent_default(&mut self);

    fn stop_propagation(&mut self);

    fn current_target(&self) -> Option<Self::Target>;
}

pub trait DataTransfer {
    fn set_data(&mut self, format: &str, data: &str);

    fn set_effect_allowed(&mut self, effect: DropEffect);
}

/// In-memory drag payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragPayload {
    data: HashMap<String, String>,
    effect_allowed: Option<DropEffect>,
}

impl DragPayload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get_data(&self, format: &str) -> Option<&str> {
        self.data.get(format).map(String::as_str)
    }

    #[must_use]
    pub fn event_id(&self) -> Option<&str> {
        self.get_data(EVENT_ID_KEY)
    }

    #[must_use]
    pub fn effect_allowed(&self) -> Option<DropEffect> {
        self.effect_allowed
    }
}

impl DataTransfer for DragPayload {
    fn set_data(&mut self, format: &str, data: &str) {
        self.data.insert(format.into(), data.into());
    }

    fn set_effect_allowed(&mut self, effect: DropEffect) {
        self.effect_allowed = Some(effect);
    }
}

/// The first non-empty `data-date` found on `node` or its ancestors.
pub fn extract_date_from_drop_target<T: DropTarget>(node: Option<T>) -> Option<String> {
    let mut current = node;

    while let Some(node) = current {
        if let Some(date) = node.attribute(DATE_ATTRIBUTE).filter(|date| !date.is_empty()) {
            return Some(date);
        }
        current = node.parent();
    }

    None
}

#[must_use]
pub fn change_date_only(event: &Event, date: NaiveDate) -> Event {
    Event {
        date,
        ..event.clone()
    }
}

/// Resolves a drop into the moved event. `None` means the drop landed on a
/// cell without a (valid) date and must not trigger any update.
pub fn handle_drop<E: DropEvent>(drop_event: &mut E, event: &Event) -> Option<Event> {
    drop_event.prevent_default();
    drop_event.stop_propagation();

    let raw = extract_date_from_drop_target(drop_event.current_target())?;
    let date = parse_date(&raw).ok()?;

    Some(change_date_only(event, date))
}

pub fn handle_drag_start<D: DataTransfer>(transfer: &mut D, event_id: &str) {
    transfer.set_effect_allowed(DropEffect::Move);
    transfer.set_data(EVENT_ID_KEY, event_id);
}

#[cfg(feature = "html")]
impl DropTarget for scraper::ElementRef<'_> {
    fn attribute(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_owned)
    }

    fn parent(&self) -> Option<Self> {
        // The document node above the root element is not an element.
        std::ops::Deref::deref(self)
            .parent()
            .and_then(scraper::ElementRef::wrap)
    }
}
