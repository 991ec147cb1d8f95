//! Directional event forwarding between a container and its children.
//!
//! Each (container, child) pair gets a downward channel (container → child)
//! and an upward channel (child → container) for one event name. Both
//! channels of every pair wired for the same event share one [`UpwardGuard`].
//! While an event travels up, the guard is raised and the container's
//! downward channels stay quiet, so a child's event never comes back down to
//! it or to its siblings. Payloads are forwarded untouched.
//!
//! The reverse is not suppressed: an event the container emits reaches every
//! child once, and each child's upward channel hands it straight back. The
//! container's own listeners therefore see one container-originated event
//! `1 + children` times; only the downward fan-out stays quiet for the
//! echoes. Hosts nesting containers should treat these events as idempotent.

use core::cell::Cell;
use std::rc::Rc;

use content::EventDispatcher;
use log::trace;

/// Raised while an event is being forwarded from a child to the container.
#[derive(Clone, Debug, Default)]
pub struct UpwardGuard {
    active: Rc<Cell<bool>>,
}

impl UpwardGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    fn raise(&self) -> Raised {
        let previous = self.active.replace(true);
        Raised {
            active: Rc::clone(&self.active),
            previous,
        }
    }
}

/// Lowers the guard again when dropped.
struct Raised {
    active: Rc<Cell<bool>>,
    previous: bool,
}

impl Drop for Raised {
    fn drop(&mut self) {
        self.active.set(self.previous);
    }
}

/// Forward `name` events from `origin` to every target, unless `guard` is
/// raised.
pub fn bubble_down(
    origin: &EventDispatcher,
    name: &str,
    targets: Vec<EventDispatcher>,
    guard: &UpwardGuard,
) {
    let guard = guard.clone();
    origin.on(name, move |event| {
        if guard.is_active() {
            trace!(target: "chapter::bubbling", "suppressed downward '{}'", event.name());
            return;
        }
        for target in &targets {
            target.trigger(event);
        }
    });
}

/// Forward `name` events from `origin` to `target` with `guard` raised for
/// the duration of the call. `target` is held weakly.
pub fn bubble_up(
    origin: &EventDispatcher,
    name: &str,
    target: &EventDispatcher,
    guard: &UpwardGuard,
) {
    let guard = guard.clone();
    let target = target.downgrade();
    origin.on(name, move |event| {
        let Some(parent) = target.upgrade() else {
            return;
        };
        let _raised = guard.raise();
        parent.trigger(event);
    });
}
