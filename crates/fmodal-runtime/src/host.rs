#![forbid(unsafe_code)]

//! Host services bundle handed to components at mount.
//!
//! A [`Host`] is the pair of global touch points a UI component may use: the
//! timer queue and the top-level event target. Clones share both.

use std::time::Duration;

use fmodal_core::event::Event;

use crate::event_target::EventTarget;
use crate::timer::TimerQueue;

/// Timers plus the top-level event target of one UI thread.
#[derive(Clone, Debug)]
pub struct Host {
    timers: TimerQueue,
    events: EventTarget,
}

impl Host {
    /// Host on the wall clock, for real applications.
    #[must_use]
    pub fn system() -> Self {
        Self::new(TimerQueue::system(), EventTarget::new())
    }

    /// Host on a virtual clock, for tests and replays.
    #[must_use]
    pub fn manual() -> Self {
        Self::new(TimerQueue::manual(), EventTarget::new())
    }

    /// Assemble a host from existing services.
    #[must_use]
    pub fn new(timers: TimerQueue, events: EventTarget) -> Self {
        Self { timers, events }
    }

    /// The timer queue.
    #[must_use]
    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    /// The top-level event target.
    #[must_use]
    pub fn events(&self) -> &EventTarget {
        &self.events
    }

    /// Deliver an input event to global listeners.
    pub fn dispatch(&self, event: &Event) -> usize {
        self.events.dispatch(event)
    }

    /// Fire timers due on the wall clock (or at the current virtual time).
    pub fn run_due(&self) -> usize {
        self.timers.run_due()
    }

    /// Advance the virtual clock. See [`TimerQueue::advance`].
    pub fn advance(&self, by: Duration) -> usize {
        self.timers.advance(by)
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::system()
    }
}
