//! Per-object event dispatch.
//!
//! Every content unit and container owns an [`EventDispatcher`]. Handlers are
//! shared closures; the listener list is snapshotted before dispatch, so a
//! handler may trigger further events (including on the dispatcher that is
//! currently dispatching) without holding a borrow across the call.

use core::cell::RefCell;
use core::fmt::{Debug, Formatter, Result as FmtResult};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use log::trace;
use serde_json::Value;

use crate::xapi::Statement;

/// Layout refresh request.
pub const RESIZE: &str = "resize";
/// Experience statement emitted by a unit.
pub const XAPI: &str = "xAPI";

type Listener = Rc<dyn Fn(&Event)>;
type ListenerMap = HashMap<String, Vec<Listener>>;

/// Data carried by an [`Event`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EventPayload {
    #[default]
    Empty,
    Statement(Box<Statement>),
    Data(Value),
}

/// A named event with an optional payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    name: String,
    payload: EventPayload,
}

impl Event {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            payload: EventPayload::Empty,
        }
    }

    pub fn with_payload(name: &str, payload: EventPayload) -> Self {
        Self {
            name: name.to_owned(),
            payload,
        }
    }

    /// An `xAPI` event wrapping `statement`.
    pub fn statement(statement: Statement) -> Self {
        Self::with_payload(XAPI, EventPayload::Statement(Box::new(statement)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn as_statement(&self) -> Option<&Statement> {
        match &self.payload {
            EventPayload::Statement(statement) => Some(statement),
            EventPayload::Empty | EventPayload::Data(_) => None,
        }
    }

    /// Raw score of the carried statement, if it has a scored result.
    pub fn score(&self) -> Option<f64> {
        self.as_statement()?.result.as_ref().map(|result| result.score.raw)
    }

    /// Short verb of the carried statement (`answered`, `completed`, ...).
    pub fn verb(&self) -> Option<&str> {
        self.as_statement().map(|statement| statement.verb.short_name())
    }
}

/// Cheap, clonable handle to a listener table.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    listeners: Rc<RefCell<ListenerMap>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events called `name`.
    pub fn on<F>(&self, name: &str, handler: F)
    where
        F: Fn(&Event) + 'static,
    {
        self.listeners
            .borrow_mut()
            .entry(name.to_owned())
            .or_default()
            .push(Rc::new(handler));
    }

    /// Deliver `event` to every handler registered for its name, in
    /// registration order. Handlers added while dispatching are not called
    /// for this event.
    pub fn trigger(&self, event: &Event) {
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .get(event.name())
            .map(|listeners| listeners.iter().map(Rc::clone).collect())
            .unwrap_or_default();
        trace!(
            target: "content::events",
            "dispatching '{}' to {} listener(s)",
            event.name(),
            snapshot.len()
        );
        for listener in snapshot {
            listener(event);
        }
    }

    /// Shorthand for triggering a payload-less event.
    pub fn trigger_named(&self, name: &str) {
        self.trigger(&Event::new(name));
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.borrow().get(name).map_or(0, Vec::len)
    }

    pub fn downgrade(&self) -> WeakDispatcher {
        WeakDispatcher {
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Whether both handles refer to the same listener table.
    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.listeners, &other.listeners)
    }
}

impl Debug for EventDispatcher {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        let listeners = self.listeners.borrow();
        let mut names: Vec<&String> = listeners.keys().collect();
        names.sort();
        formatter
            .debug_struct("EventDispatcher")
            .field("events", &names)
            .finish()
    }
}

/// Non-owning handle to an [`EventDispatcher`].
#[derive(Clone, Default)]
pub struct WeakDispatcher {
    listeners: Weak<RefCell<ListenerMap>>,
}

impl WeakDispatcher {
    pub fn upgrade(&self) -> Option<EventDispatcher> {
        self.listeners
            .upgrade()
            .map(|listeners| EventDispatcher { listeners })
    }
}

impl Debug for WeakDispatcher {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter
            .debug_struct("WeakDispatcher")
            .field("alive", &(self.listeners.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;

    #[test]
    fn handlers_run_in_registration_order() {
        let dispatcher = EventDispatcher::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            dispatcher.on(RESIZE, move |_| seen.borrow_mut().push(tag));
        }
        dispatcher.trigger_named(RESIZE);
        dispatcher.trigger_named("unrelated");
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn reentrant_trigger_does_not_panic() {
        let dispatcher = EventDispatcher::new();
        let depth = Rc::new(Cell::new(0_u32));
        let weak = dispatcher.downgrade();
        let counter = Rc::clone(&depth);
        dispatcher.on(RESIZE, move |event| {
            counter.set(counter.get() + 1);
            if counter.get() < 3 {
                if let Some(inner) = weak.upgrade() {
                    inner.trigger(event);
                }
            }
        });
        dispatcher.trigger_named(RESIZE);
        assert_eq!(depth.get(), 3);
    }

    #[test]
    fn weak_handle_dies_with_dispatcher() {
        let dispatcher = EventDispatcher::new();
        let weak = dispatcher.downgrade();
        assert!(weak.upgrade().is_some());
        drop(dispatcher);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn plain_events_have_no_score() {
        assert_eq!(Event::new(XAPI).score(), None);
        assert_eq!(Event::new(XAPI).verb(), None);
    }
}
