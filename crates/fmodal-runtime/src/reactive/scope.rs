#![forbid(unsafe_code)]

//! Collects RAII guards for a logical owner (e.g., one mounted modal).
//!
//! When the scope is dropped, every held guard is released, which detaches
//! listeners, cancels timers, and unsubscribes callbacks in one step.
//!
//! # Invariants
//!
//! 1. Guards are released in reverse registration order on drop or `clear()`.
//! 2. After release, no callback owned by this scope fires again.
//! 3. `clear()` leaves the scope empty and reusable.

use std::any::Any;

/// Owner of heterogeneous RAII guards.
#[derive(Default)]
pub struct CleanupScope {
    guards: Vec<Box<dyn Any>>,
}

impl CleanupScope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self { guards: Vec::new() }
    }

    /// Keep `guard` alive until the scope is cleared or dropped.
    pub fn hold(&mut self, guard: impl Any) {
        self.guards.push(Box::new(guard));
    }

    /// Number of held guards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Whether the scope holds no guards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Release all guards immediately, newest first.
    pub fn clear(&mut self) {
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}

impl Drop for CleanupScope {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for CleanupScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupScope")
            .field("guard_count", &self.guards.len())
            .finish()
    }
}
