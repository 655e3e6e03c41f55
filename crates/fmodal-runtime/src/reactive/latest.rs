#![forbid(unsafe_code)]

//! Holder for "the most recent value", read by long-lived callbacks.
//!
//! Event listeners and timers are registered once but must act on whatever
//! the owner supplied *last*, not what was current at registration. A
//! [`LatestRef`] is that single mutable slot: the owner replaces the value on
//! every update and callbacks dereference the slot at call time.
//!
//! Unlike [`Observable`](super::Observable) there is no change detection and
//! no `PartialEq` bound, so it can hold callbacks and other opaque values.
//!
//! # Failure Modes
//!
//! - Calling [`LatestRef::replace`] from inside [`LatestRef::with`] on the same
//!   slot panics (RefCell borrow rules). Clone the piece you need out of the
//!   slot before running foreign code.

use std::cell::RefCell;
use std::rc::Rc;

/// Shared slot that always holds the most recently stored value.
pub struct LatestRef<T> {
    slot: Rc<RefCell<T>>,
}

impl<T> Clone for LatestRef<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for LatestRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LatestRef").field(&*self.slot.borrow()).finish()
    }
}

impl<T> LatestRef<T> {
    /// Create a slot holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            slot: Rc::new(RefCell::new(value)),
        }
    }

    /// Store a new value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        self.slot.replace(value)
    }

    /// Read the current value by reference.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.slot.borrow())
    }

    /// Whether two handles share the same slot.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<T: Clone> LatestRef<T> {
    /// Clone the current value out of the slot.
    #[must_use]
    pub fn get(&self) -> T {
        self.slot.borrow().clone()
    }
}
