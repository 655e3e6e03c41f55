#![forbid(unsafe_code)]

//! Top-level event target: the place global listeners hang off.
//!
//! The host owns one [`EventTarget`] (the analogue of a window) and calls
//! [`EventTarget::dispatch`] for every input event. Components register
//! listeners for a [`ListenerKind`] and keep the returned [`ListenerGuard`];
//! dropping the guard removes the listener.
//!
//! # Invariants
//!
//! 1. Listeners run in registration order.
//! 2. A listener removed before or during a dispatch is not invoked
//!    afterwards, even by the dispatch already in progress.
//! 3. No internal borrow is held while a listener runs, so listeners may add
//!    or remove listeners (or tear down their owner) re-entrantly.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use fmodal_core::event::Event;
use tracing::{debug, trace};

/// Event families a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Key pressed or auto-repeated.
    KeyDown,
    /// Primary-button click.
    Click,
}

impl ListenerKind {
    /// Classify an event; `None` for events no listener kind covers.
    #[must_use]
    pub fn of(event: &Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.is_key_down() => Some(Self::KeyDown),
            Event::Mouse(mouse) if mouse.is_primary_click() => Some(Self::Click),
            _ => None,
        }
    }
}

type ListenerRc = Rc<dyn Fn(&Event)>;
type ListenerWeak = Weak<dyn Fn(&Event)>;

struct Registered {
    id: u64,
    kind: ListenerKind,
    callback: ListenerWeak,
}

#[derive(Default)]
struct EventTargetInner {
    next_id: u64,
    listeners: Vec<Registered>,
}

/// Shared registry of global listeners.
///
/// Cloning an `EventTarget` creates a new handle to the **same** registry.
#[derive(Clone, Default)]
pub struct EventTarget {
    inner: Rc<RefCell<EventTargetInner>>,
}

impl std::fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTarget")
            .field("listeners", &self.inner.borrow().listeners.len())
            .finish()
    }
}

impl EventTarget {
    /// Create an empty target.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for events of `kind`.
    #[must_use = "dropping the guard removes the listener"]
    pub fn add_listener(
        &self,
        kind: ListenerKind,
        callback: impl Fn(&Event) + 'static,
    ) -> ListenerGuard {
        let strong: ListenerRc = Rc::new(callback);
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.listeners.push(Registered {
            id,
            kind,
            callback: Rc::downgrade(&strong),
        });
        debug!(listener_id = id, ?kind, "listener added");
        ListenerGuard {
            target: Rc::downgrade(&self.inner),
            id,
            _callback: strong,
        }
    }

    /// Deliver `event` to every live listener of its kind. Returns how many ran.
    pub fn dispatch(&self, event: &Event) -> usize {
        let Some(kind) = ListenerKind::of(event) else {
            return 0;
        };
        // Snapshot weak handles; liveness is re-checked right before each call.
        let targets: Vec<ListenerWeak> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| l.callback.clone())
            .collect();

        let mut delivered = 0;
        for weak in targets {
            if let Some(callback) = weak.upgrade() {
                callback(event);
                delivered += 1;
            }
        }
        trace!(?kind, delivered, "event dispatched");
        delivered
    }

    /// Number of listeners registered for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: ListenerKind) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.kind == kind)
            .count()
    }
}

/// RAII guard for a registered listener.
pub struct ListenerGuard {
    target: Weak<RefCell<EventTargetInner>>,
    id: u64,
    _callback: ListenerRc,
}

impl ListenerGuard {
    /// Identifier assigned at registration.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(target) = self.target.upgrade() {
            target.borrow_mut().listeners.retain(|l| l.id != self.id);
            debug!(listener_id = self.id, "listener removed");
        }
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
